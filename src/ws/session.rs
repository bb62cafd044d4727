//! Per-connection protocol state: authenticate once, then route

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::{Command, PlayerCommand, PlayerId};
use crate::store::Collaborators;

use super::hub::{ConnectionHub, Lane, Outbox};
use super::protocol::{ClientMsg, ServerMsg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { user_id: Uuid },
}

/// Whether the reader loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct Session {
    conn_id: PlayerId,
    state: SessionState,
    commands: mpsc::Sender<Command>,
    /// Direct replies that don't involve the game loop
    outbox: Outbox,
    services: Collaborators,
}

impl Session {
    /// Register the connection with the game loop; None if the loop is gone
    pub async fn open(
        commands: mpsc::Sender<Command>,
        outbox: Outbox,
        services: Collaborators,
    ) -> Option<Self> {
        let conn_id = Uuid::new_v4();
        commands
            .send(Command::Open {
                conn_id,
                outbox: outbox.clone(),
            })
            .await
            .ok()?;

        debug!(conn_id = %conn_id, "Session opened");
        Some(Self {
            conn_id,
            state: SessionState::Unauthenticated,
            commands,
            outbox,
            services,
        })
    }

    pub fn conn_id(&self) -> PlayerId {
        self.conn_id
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle one inbound text frame
    pub async fn handle_text(&mut self, text: &str) -> Flow {
        let msg = match serde_json::from_str::<ClientMsg>(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(conn_id = %self.conn_id, error = %e, "Failed to parse client message");
                return Flow::Continue;
            }
        };

        match (self.state, msg) {
            (SessionState::Unauthenticated, ClientMsg::Connect { token }) => self.authenticate(&token).await,
            (SessionState::Unauthenticated, other) => {
                debug!(conn_id = %self.conn_id, ?other, "Dropping message before connect");
                Flow::Continue
            }
            (SessionState::Authenticated { user_id }, ClientMsg::Connect { .. }) => {
                debug!(conn_id = %self.conn_id, user_id = %user_id, "Already authenticated, ignoring connect");
                Flow::Continue
            }
            (SessionState::Authenticated { .. }, ClientMsg::ProfileRequest { user_id }) => {
                self.profile(user_id).await;
                Flow::Continue
            }
            (SessionState::Authenticated { .. }, msg) => match PlayerCommand::from_client(msg) {
                Some(command) => {
                    self.send_command(Command::Player {
                        conn_id: self.conn_id,
                        command,
                    })
                    .await
                }
                None => Flow::Continue,
            },
        }
    }

    /// Tell the game loop the connection is gone
    pub async fn close(self) {
        let _ = self
            .commands
            .send(Command::Close {
                conn_id: self.conn_id,
            })
            .await;
        debug!(conn_id = %self.conn_id, "Session closed");
    }

    async fn authenticate(&mut self, token: &str) -> Flow {
        let identity = match self.services.identity.authenticate(token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(conn_id = %self.conn_id, error = %e, "Authentication failed");
                self.reply(&ServerMsg::ConnectError {
                    error: e.to_string(),
                });
                return Flow::Continue;
            }
        };

        let wallet_balance = match self.services.ledger.balance(identity.user_id).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(user_id = %identity.user_id, error = %e, "Wallet balance unavailable");
                0
            }
        };

        info!(
            conn_id = %self.conn_id,
            user_id = %identity.user_id,
            username = %identity.display_name,
            "Player authenticated"
        );
        self.state = SessionState::Authenticated {
            user_id: identity.user_id,
        };
        self.send_command(Command::Register {
            conn_id: self.conn_id,
            user_id: identity.user_id,
            display_name: identity.display_name,
            wallet_balance,
        })
        .await
    }

    async fn profile(&self, user_id: Uuid) {
        let reply = match self.services.history.player_stats(user_id).await {
            Ok(stats) => ServerMsg::ProfileData { user_id, stats },
            Err(e) => {
                warn!(conn_id = %self.conn_id, user_id = %user_id, error = %e, "Profile lookup failed");
                ServerMsg::Error {
                    message: "Profile unavailable".to_string(),
                }
            }
        };
        self.reply(&reply);
    }

    async fn send_command(&self, command: Command) -> Flow {
        if self.commands.send(command).await.is_err() {
            debug!(conn_id = %self.conn_id, "Game loop gone");
            return Flow::Stop;
        }
        Flow::Continue
    }

    fn reply(&self, msg: &ServerMsg) {
        if let Some(frame) = ConnectionHub::encode(msg) {
            if self.outbox.push(Lane::Reliable, frame).is_err() {
                debug!(conn_id = %self.conn_id, "Writer gone, dropping direct reply");
            }
        }
    }
}
