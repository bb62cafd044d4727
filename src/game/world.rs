//! World state and the authoritative tick

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GameSettings;
use crate::matchmaking::{ActiveMatches, JoinOutcome, LobbyStatus, MatchOutcome, MatchmakingService, QueueError, QueueEvent};
use crate::payments::SettlementEvent;
use crate::util::time::unix_millis;
use crate::ws::protocol::ServerMsg;

use super::food::FoodField;
use super::leaderboard;
use super::player::{PlayerRegistry, WorldBounds, HEALTH_REGEN_PER_SEC, MAX_EMOJI_CHARS, MAX_HEALTH};
use super::snapshot::SnapshotBuilder;
use super::zone::{Zone, ZoneConfigError};
use super::{PlayerCommand, PlayerId};

/// Zone damage is applied in tenths of the per-second rate each tick
const ZONE_DAMAGE_TICK_FRACTION: f32 = 10.0;

/// Where a message should go
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Every open connection
    Broadcast(ServerMsg),
    To(PlayerId, ServerMsg),
    ToMany(Vec<PlayerId>, ServerMsg),
}

/// Side effects produced by a handler or a tick
#[derive(Debug, Default)]
pub struct Effects {
    pub messages: Vec<Outbound>,
    pub settlements: Vec<SettlementEvent>,
}

impl Effects {
    fn broadcast(&mut self, msg: ServerMsg) {
        self.messages.push(Outbound::Broadcast(msg));
    }

    fn to(&mut self, player_id: PlayerId, msg: ServerMsg) {
        self.messages.push(Outbound::To(player_id, msg));
    }

    fn error(&mut self, player_id: PlayerId, message: impl Into<String>) {
        self.to(
            player_id,
            ServerMsg::Error {
                message: message.into(),
            },
        );
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.settlements.is_empty()
    }
}

/// Everything the game loop owns: players, zone, food, queues and matches
pub struct World {
    settings: GameSettings,
    /// Game clock, advanced only by `tick`
    clock: Duration,
    ticks: u64,
    registry: PlayerRegistry,
    zone: Zone,
    food: FoodField,
    matchmaking: MatchmakingService,
    active: ActiveMatches,
    since_leaderboard: Duration,
    snapshots: SnapshotBuilder,
}

impl World {
    pub fn new(settings: GameSettings) -> Result<Self, ZoneConfigError> {
        let seed = settings.seed.unwrap_or_else(rand::random::<u64>);
        let bounds = WorldBounds::new(settings.world_width, settings.world_height);

        // Independent streams so adding players doesn't shift zone movement
        let registry = PlayerRegistry::new(bounds, ChaCha8Rng::seed_from_u64(seed));
        let zone = Zone::new(
            settings.zone.clone(),
            bounds,
            Duration::ZERO,
            ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
        )?;
        let mut food = FoodField::new(
            settings.food_target,
            bounds,
            ChaCha8Rng::seed_from_u64(seed.wrapping_add(2)),
        );
        food.fill();

        let matchmaking = MatchmakingService::new(
            &settings.tiers,
            settings.min_match_players,
            settings.max_match_players,
            settings.lobby_countdown,
        );
        let snapshots = SnapshotBuilder::new(settings.snapshot_interval_ticks);

        info!(seed, width = bounds.width, height = bounds.height, "World created");

        Ok(Self {
            settings,
            clock: Duration::ZERO,
            ticks: 0,
            registry,
            zone,
            food,
            matchmaking,
            active: ActiveMatches::new(),
            since_leaderboard: Duration::ZERO,
            snapshots,
        })
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    pub fn queued_count(&self) -> usize {
        self.matchmaking.queued_total()
    }

    pub fn active_match_count(&self) -> usize {
        self.active.len()
    }

    /// Spawn the player for a freshly authenticated connection
    pub fn register(
        &mut self,
        player_id: PlayerId,
        user_id: Uuid,
        display_name: String,
        wallet_balance: i64,
    ) -> Effects {
        let mut effects = Effects::default();
        if self.registry.contains(&player_id) {
            warn!(player_id = %player_id, "Connection already has a player");
            return effects;
        }

        let view = self.registry.create_player(player_id, user_id, display_name.clone()).view();
        info!(player_id = %player_id, user_id = %user_id, "Player spawned");

        effects.to(
            player_id,
            ServerMsg::ConnectSuccess {
                user_id,
                player_id,
                username: display_name,
                wallet_balance,
            },
        );
        effects.to(
            player_id,
            SnapshotBuilder::build(&self.registry, &self.food, &self.zone, self.clock),
        );
        for status in self.matchmaking.lobbies(self.clock) {
            effects.to(player_id, Self::lobby_update(status));
        }
        effects.broadcast(ServerMsg::PlayerUpdate { player: view });
        effects
    }

    /// Apply one routed player command
    pub fn handle(&mut self, player_id: PlayerId, command: PlayerCommand) -> Effects {
        let mut effects = Effects::default();
        if !self.registry.contains(&player_id) {
            debug!(player_id = %player_id, ?command, "Command for unknown player ignored");
            return effects;
        }

        match command {
            PlayerCommand::JoinMatch { tier } => {
                if self.active.is_playing(&player_id) {
                    effects.error(player_id, QueueError::AlreadyInMatch.to_string());
                    return effects;
                }
                match self.matchmaking.join_queue(&self.registry, player_id, tier, self.clock) {
                    Ok(JoinOutcome::Switched { from }) => {
                        info!(player_id = %player_id, from, to = tier, "Player switched lobby");
                    }
                    Ok(JoinOutcome::Queued | JoinOutcome::AlreadyQueued) => {}
                    Err(e @ QueueError::UnknownTier(_)) => {
                        warn!(player_id = %player_id, error = %e, "Dropping join request");
                    }
                    Err(QueueError::NotRegistered) => {}
                    Err(e) => effects.error(player_id, e.to_string()),
                }
            }
            PlayerCommand::CancelMatch => {
                self.matchmaking.leave_queue(&player_id);
            }
            PlayerCommand::Move { x, y } => {
                if let Some(player) = self.registry.handle_move(&player_id, x, y) {
                    effects.broadcast(ServerMsg::PlayerUpdate {
                        player: player.view(),
                    });
                }
            }
            PlayerCommand::Boost { boosting } => {
                if let Some(player) = self.registry.set_boost(&player_id, boosting) {
                    effects.broadcast(ServerMsg::PlayerUpdate {
                        player: player.view(),
                    });
                }
            }
            PlayerCommand::Emoji { emoji } => {
                let emoji = emoji.filter(|e| !e.is_empty());
                if emoji.as_ref().is_some_and(|e| e.chars().count() > MAX_EMOJI_CHARS) {
                    warn!(player_id = %player_id, "Dropping over-long emoji");
                    return effects;
                }
                if let Some(player) = self.registry.set_emoji(&player_id, emoji) {
                    effects.broadcast(ServerMsg::PlayerUpdate {
                        player: player.view(),
                    });
                }
            }
            PlayerCommand::LeaderboardRequest => {
                effects.to(player_id, self.leaderboard());
            }
        }

        effects
    }

    /// Drop everything the connection owned; safe to call repeatedly
    pub fn disconnect(&mut self, player_id: PlayerId) -> Effects {
        let mut effects = Effects::default();

        if self.registry.remove_player(&player_id).is_some() {
            info!(player_id = %player_id, "Player removed on disconnect");
        }
        self.matchmaking.leave_queue(&player_id);
        if let Some(outcome) = self.active.player_out(&player_id, unix_millis()) {
            Self::complete_match(outcome, &mut effects);
        }

        effects
    }

    /// Run one simulation step of `delta`
    pub fn tick(&mut self, delta: Duration) -> Effects {
        let mut effects = Effects::default();
        self.ticks += 1;
        self.clock += delta;

        // 1. Players move, then eat
        self.registry.tick(delta);
        self.food.consume(&mut self.registry);
        self.food.replenish();

        // 2. Zone
        if self.zone.tick(self.clock) {
            info!(
                stage = self.zone.stage(),
                radius = self.zone.radius(),
                damage_per_second = self.zone.damage_per_second(),
                "Zone advanced"
            );
            effects.broadcast(ServerMsg::ZoneUpdate {
                zone: self.zone.view(self.clock),
            });
        }

        // 3. Zone damage and eliminations
        for player_id in self.apply_zone_damage(delta) {
            self.eliminate(player_id, &mut effects);
        }

        // 4. Matchmaking
        for event in self.matchmaking.tick(self.clock, unix_millis()) {
            match event {
                QueueEvent::Lobby(status) => effects.broadcast(Self::lobby_update(status)),
                QueueEvent::Formed(record) => {
                    effects.messages.push(Outbound::ToMany(
                        record.participant_ids(),
                        ServerMsg::MatchFound {
                            match_id: record.id,
                            tier: record.tier,
                            players: record.info(),
                        },
                    ));
                    self.active.start(record.clone());
                    effects.settlements.push(SettlementEvent::MatchFormed(record));
                }
            }
        }

        // 5. Leaderboard, roughly once a second
        self.since_leaderboard += delta;
        if self.since_leaderboard >= self.settings.leaderboard_interval {
            self.since_leaderboard = Duration::ZERO;
            effects.broadcast(self.leaderboard());
        }

        if self.snapshots.should_send() {
            effects.broadcast(SnapshotBuilder::build(
                &self.registry,
                &self.food,
                &self.zone,
                self.clock,
            ));
        }

        effects
    }

    /// Damage players outside the zone and heal those inside; returns the dead
    fn apply_zone_damage(&mut self, delta: Duration) -> Vec<PlayerId> {
        let damage = self.zone.damage_per_second() / ZONE_DAMAGE_TICK_FRACTION;
        let regen = HEALTH_REGEN_PER_SEC * delta.as_secs_f32();
        let mut dead = Vec::new();

        for player_id in self.registry.ids() {
            let Some(player) = self.registry.get_mut(&player_id) else {
                continue;
            };
            if !player.is_consistent() {
                warn!(player_id = %player_id, "Skipping inconsistent player record this tick");
                continue;
            }

            if self.zone.is_outside(player.x, player.y) {
                player.health -= damage;
                if player.health <= 0.0 {
                    player.health = 0.0;
                    dead.push(player_id);
                }
            } else {
                player.health = (player.health + regen).min(MAX_HEALTH);
            }
        }

        dead
    }

    fn eliminate(&mut self, player_id: PlayerId, effects: &mut Effects) {
        if self.registry.remove_player(&player_id).is_none() {
            return;
        }
        self.matchmaking.leave_queue(&player_id);

        info!(player_id = %player_id, "Player eliminated");
        effects.broadcast(ServerMsg::PlayerDeath { player_id });
        self.snapshots.force_next();

        if let Some(outcome) = self.active.player_out(&player_id, unix_millis()) {
            Self::complete_match(outcome, effects);
        }
    }

    fn complete_match(outcome: MatchOutcome, effects: &mut Effects) {
        let winner_id = outcome.winner.as_ref().map(|w| w.player_id);
        info!(
            match_id = %outcome.record.id,
            winner = ?winner_id,
            prize_pool = outcome.record.prize_pool(),
            "Match completed"
        );

        effects.messages.push(Outbound::ToMany(
            outcome.record.participant_ids(),
            ServerMsg::MatchEnded {
                match_id: outcome.record.id,
                winner_id,
                prize_pool: outcome.record.prize_pool(),
            },
        ));
        effects.settlements.push(SettlementEvent::MatchCompleted(outcome));
    }

    fn lobby_update(status: LobbyStatus) -> ServerMsg {
        ServerMsg::LobbyUpdate {
            tier: status.tier,
            queued: status.queued,
            prize_pool: status.prize_pool,
            countdown: status.countdown,
        }
    }

    fn leaderboard(&self) -> ServerMsg {
        ServerMsg::LeaderboardUpdate {
            leaderboard: leaderboard::rank(self.registry.iter(), self.settings.leaderboard_size),
        }
    }

    #[cfg(test)]
    pub(crate) fn clock(&self) -> Duration {
        self.clock
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub(crate) fn matchmaking(&self) -> &MatchmakingService {
        &self.matchmaking
    }

    #[cfg(test)]
    pub(crate) fn zone(&self) -> &Zone {
        &self.zone
    }

    #[cfg(test)]
    pub(crate) fn registry_mut(&mut self) -> &mut PlayerRegistry {
        &mut self.registry
    }

    #[cfg(test)]
    pub(crate) fn zone_mut(&mut self) -> &mut Zone {
        &mut self.zone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::zone::ZoneConfig;

    const TICK: Duration = Duration::from_millis(50);

    fn settings() -> GameSettings {
        GameSettings {
            seed: Some(11),
            food_target: 0,
            ..GameSettings::default()
        }
    }

    fn world() -> World {
        World::new(settings()).unwrap()
    }

    fn join(world: &mut World, n: u128) -> PlayerId {
        let id = Uuid::from_u128(n);
        world.register(id, Uuid::from_u128(n + 1000), format!("p{n}"), 0);
        id
    }

    /// Pin a player at a known, motionless position
    fn place(world: &mut World, id: PlayerId, x: f32, y: f32) {
        let p = world.registry_mut().get_mut(&id).unwrap();
        p.x = x;
        p.y = y;
        p.vel_x = 0.0;
        p.vel_y = 0.0;
    }

    fn deaths(effects: &Effects) -> Vec<PlayerId> {
        effects
            .messages
            .iter()
            .filter_map(|m| match m {
                Outbound::Broadcast(ServerMsg::PlayerDeath { player_id }) => Some(*player_id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn register_replies_with_identity_and_snapshot() {
        let mut world = world();
        let id = Uuid::from_u128(1);
        let effects = world.register(id, Uuid::from_u128(2), "ace".into(), 1_250);

        assert!(matches!(
            &effects.messages[0],
            Outbound::To(to, ServerMsg::ConnectSuccess { username, wallet_balance: 1_250, .. })
                if *to == id && username == "ace"
        ));
        assert!(matches!(&effects.messages[1], Outbound::To(_, ServerMsg::GameState { .. })));
        assert_eq!(world.player_count(), 1);

        assert!(world.register(id, Uuid::from_u128(2), "ace".into(), 0).is_empty());
    }

    #[test]
    fn outside_player_loses_a_tenth_of_zone_dps_per_tick() {
        let mut world = world();
        let id = join(&mut world, 1);
        world.zone_mut().place(1000.0, 1000.0, 500.0);
        place(&mut world, id, 1600.0, 1000.0);

        let dps = world.zone().damage_per_second();
        world.tick(TICK);
        let health = world.registry().get(&id).unwrap().health;
        assert!((health - (MAX_HEALTH - dps / 10.0)).abs() < 1e-4);

        place(&mut world, id, 1000.0, 1000.0);
        world.registry_mut().get_mut(&id).unwrap().health = 50.0;
        world.tick(TICK);
        assert!(world.registry().get(&id).unwrap().health >= 50.0);
    }

    #[test]
    fn boundary_player_takes_no_damage() {
        let mut world = world();
        let id = join(&mut world, 1);
        world.zone_mut().place(1000.0, 1000.0, 500.0);
        place(&mut world, id, 1500.0, 1000.0);
        world.tick(TICK);
        assert_eq!(world.registry().get(&id).unwrap().health, MAX_HEALTH);
    }

    #[test]
    fn elimination_is_reported_exactly_once() {
        let mut world = world();
        let id = join(&mut world, 1);
        let bystander = join(&mut world, 2);
        world.zone_mut().place(1000.0, 1000.0, 500.0);
        place(&mut world, id, 2500.0, 2500.0);
        place(&mut world, bystander, 1000.0, 1000.0);
        world.registry_mut().get_mut(&id).unwrap().health = 0.05;

        let effects = world.tick(TICK);
        assert_eq!(deaths(&effects), vec![id]);
        assert!(world.registry().get(&id).is_none());
        assert!(world.registry().get(&bystander).is_some());

        let effects = world.tick(TICK);
        assert!(deaths(&effects).is_empty());
    }

    #[test]
    fn eliminated_player_leaves_its_queue() {
        let mut world = world();
        let id = join(&mut world, 1);
        world.handle(id, PlayerCommand::JoinMatch { tier: 5 });
        assert_eq!(world.matchmaking().tier_of(&id), Some(5));

        world.zone_mut().place(0.0, 0.0, 10.0);
        place(&mut world, id, 2000.0, 2000.0);
        world.registry_mut().get_mut(&id).unwrap().health = 0.01;
        world.tick(TICK);

        assert_eq!(world.matchmaking().tier_of(&id), None);
    }

    #[test]
    fn inconsistent_record_is_skipped_not_fatal() {
        let mut world = world();
        let broken = join(&mut world, 1);
        let healthy = join(&mut world, 2);
        world.zone_mut().place(0.0, 0.0, 10.0);
        place(&mut world, healthy, 2000.0, 2000.0);
        world.registry_mut().get_mut(&broken).unwrap().x = f32::NAN;

        world.tick(TICK);
        assert!(world.registry().get(&broken).is_some());
        assert!(world.registry().get(&healthy).unwrap().health < MAX_HEALTH);
    }

    #[test]
    fn scenario_three_players_match_after_countdown() {
        let mut world = world();
        let ids: Vec<PlayerId> = (1..=3).map(|n| join(&mut world, n)).collect();
        for id in &ids {
            world.handle(*id, PlayerCommand::JoinMatch { tier: 5 });
        }
        world.zone_mut().place(1500.0, 1500.0, 5000.0);
        for id in &ids {
            place(&mut world, *id, 1500.0, 1500.0);
        }

        let mut found = None;
        for _ in 0..300 {
            let effects = world.tick(TICK);
            if let Some(msg) = effects.messages.iter().find_map(|m| match m {
                Outbound::ToMany(to, ServerMsg::MatchFound { players, .. }) => Some((to.clone(), players.len())),
                _ => None,
            }) {
                found = Some((world.clock(), msg));
                assert!(effects
                    .settlements
                    .iter()
                    .any(|s| matches!(s, SettlementEvent::MatchFormed(_))));
                break;
            }
        }

        let (at, (to, count)) = found.expect("match formed");
        assert_eq!(count, 3);
        assert_eq!(to, ids);
        // All three queued at t=0, so the lobby is due exactly 10s later
        assert_eq!(at, Duration::from_secs(10));
        assert_eq!(world.matchmaking().queue_len(5), 0);
        assert_eq!(world.active_match_count(), 1);
    }

    #[test]
    fn player_in_active_match_cannot_requeue() {
        let mut world = world();
        let a = join(&mut world, 1);
        let b = join(&mut world, 2);
        for id in [a, b] {
            world.handle(id, PlayerCommand::JoinMatch { tier: 1 });
        }
        world.zone_mut().place(1500.0, 1500.0, 5000.0);
        for _ in 0..=201 {
            world.tick(TICK);
        }
        assert_eq!(world.active_match_count(), 1);

        let effects = world.handle(a, PlayerCommand::JoinMatch { tier: 5 });
        assert!(matches!(&effects.messages[0], Outbound::To(to, ServerMsg::Error { .. }) if *to == a));
        assert_eq!(world.matchmaking().tier_of(&a), None);
    }

    #[test]
    fn disconnecting_participant_completes_two_player_match() {
        let mut world = world();
        let a = join(&mut world, 1);
        let b = join(&mut world, 2);
        for id in [a, b] {
            world.handle(id, PlayerCommand::JoinMatch { tier: 20 });
        }
        world.zone_mut().place(1500.0, 1500.0, 5000.0);
        for _ in 0..=201 {
            world.tick(TICK);
        }

        let effects = world.disconnect(a);
        let ended = effects.messages.iter().find_map(|m| match m {
            Outbound::ToMany(_, ServerMsg::MatchEnded { winner_id, prize_pool, .. }) => {
                Some((*winner_id, *prize_pool))
            }
            _ => None,
        });
        assert_eq!(ended, Some((Some(b), 40)));
        assert!(matches!(
            &effects.settlements[0],
            SettlementEvent::MatchCompleted(outcome) if outcome.placements.len() == 2
        ));
        assert_eq!(world.active_match_count(), 0);

        assert!(world.disconnect(a).is_empty());
    }

    #[test]
    fn commands_from_unknown_players_are_ignored() {
        let mut world = world();
        let effects = world.handle(Uuid::new_v4(), PlayerCommand::Move { x: 1.0, y: 1.0 });
        assert!(effects.is_empty());
        assert_eq!(world.player_count(), 0);
    }

    #[test]
    fn unknown_tier_is_dropped_without_reply() {
        let mut world = world();
        let id = join(&mut world, 1);
        let effects = world.handle(id, PlayerCommand::JoinMatch { tier: 3 });
        assert!(effects.is_empty());
        assert_eq!(world.queued_count(), 0);
    }

    #[test]
    fn movement_and_emoji_broadcast_player_updates() {
        let mut world = world();
        let id = join(&mut world, 1);

        let effects = world.handle(id, PlayerCommand::Move { x: 0.0, y: 0.0 });
        assert!(matches!(&effects.messages[0], Outbound::Broadcast(ServerMsg::PlayerUpdate { .. })));

        let effects = world.handle(id, PlayerCommand::Emoji { emoji: Some("🔥".into()) });
        assert!(matches!(
            &effects.messages[0],
            Outbound::Broadcast(ServerMsg::PlayerUpdate { player }) if player.emoji.as_deref() == Some("🔥")
        ));

        let effects = world.handle(id, PlayerCommand::Emoji { emoji: Some("x".repeat(20)) });
        assert!(effects.is_empty());
    }

    #[test]
    fn leaderboard_broadcast_about_once_a_second() {
        let mut world = world();
        join(&mut world, 1);
        world.zone_mut().place(1500.0, 1500.0, 5000.0);

        let boards = (0..40)
            .map(|_| world.tick(TICK))
            .filter(|e| {
                e.messages
                    .iter()
                    .any(|m| matches!(m, Outbound::Broadcast(ServerMsg::LeaderboardUpdate { .. })))
            })
            .count();
        assert_eq!(boards, 2);

        let id = Uuid::from_u128(1);
        let effects = world.handle(id, PlayerCommand::LeaderboardRequest);
        assert!(matches!(
            &effects.messages[0],
            Outbound::To(to, ServerMsg::LeaderboardUpdate { leaderboard }) if *to == id && leaderboard.len() == 1
        ));
    }

    #[test]
    fn zone_change_is_broadcast() {
        let settings = GameSettings {
            zone: ZoneConfig {
                stages: vec![
                    crate::game::zone::ZoneStage::new(1, 1.0, 1.0),
                    crate::game::zone::ZoneStage::new(1, 2.0, 0.5),
                ],
                ..ZoneConfig::default()
            },
            ..settings()
        };
        let mut world = World::new(settings).unwrap();
        let updates = (0..20)
            .map(|_| world.tick(TICK))
            .filter(|e| {
                e.messages
                    .iter()
                    .any(|m| matches!(m, Outbound::Broadcast(ServerMsg::ZoneUpdate { .. })))
            })
            .count();
        assert_eq!(updates, 1);
        assert_eq!(world.zone().stage(), 2);
    }

    #[test]
    fn late_connector_learns_current_lobbies() {
        let mut world = world();
        world.zone_mut().place(1500.0, 1500.0, 5000.0);
        for n in [1, 2] {
            let id = join(&mut world, n);
            world.handle(id, PlayerCommand::JoinMatch { tier: 20 });
        }
        for _ in 0..20 {
            world.tick(TICK);
        }
        let solo = join(&mut world, 3);
        world.handle(solo, PlayerCommand::JoinMatch { tier: 5 });
        for _ in 0..5 {
            world.tick(TICK);
        }

        let late = Uuid::from_u128(4);
        let effects = world.register(late, Uuid::from_u128(1004), "late".into(), 0);
        let lobbies: Vec<(u32, usize, Option<u32>)> = effects
            .messages
            .iter()
            .filter_map(|m| match m {
                Outbound::To(to, ServerMsg::LobbyUpdate { tier, queued, countdown, .. }) if *to == late => {
                    Some((*tier, *queued, *countdown))
                }
                _ => None,
            })
            .collect();
        assert_eq!(lobbies, vec![(1, 0, None), (5, 1, None), (20, 2, Some(9))]);
    }
}
