//! Configuration module - environment variable parsing and game tuning

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::game::zone::ZoneConfig;
use crate::util::time::DEFAULT_TICK_RATE;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of text
    pub log_json: bool,

    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase service role key (bypasses RLS - server only!)
    pub supabase_service_role_key: String,
    /// JWT secret; when set, tokens are verified locally instead of via the auth API
    pub supabase_jwt_secret: Option<String>,

    /// Allowed client origin for CORS
    pub client_origin: String,

    /// Simulation tuning
    pub game: GameSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Render provides PORT env var, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let mut game = GameSettings::default();
        if let Ok(raw) = env::var("TICK_RATE") {
            game.tick_rate = parse_tick_rate(&raw)?;
        }
        if let Ok(raw) = env::var("ENTRY_TIERS") {
            game.tiers = parse_tiers(&raw)?;
        }
        if let Ok(raw) = env::var("WORLD_SEED") {
            game.seed = Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "WORLD_SEED",
                value: raw.clone(),
            })?);
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            supabase_url: env::var("SUPABASE_URL")
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),

            client_origin: env::var("CLIENT_ORIGIN")
                .map_err(|_| ConfigError::Missing("CLIENT_ORIGIN"))?,

            game,
        })
    }
}

/// Simulation and matchmaking tuning
#[derive(Clone, Debug)]
pub struct GameSettings {
    /// Authoritative ticks per second
    pub tick_rate: u32,
    /// Entry-fee tiers players may queue under
    pub tiers: Vec<u32>,
    /// World width in world units
    pub world_width: f32,
    /// World height in world units
    pub world_height: f32,
    /// Fewest queued players that start a countdown
    pub min_match_players: usize,
    /// Queue size that forms a match immediately
    pub max_match_players: usize,
    /// Countdown before a partially filled queue forms a match
    pub lobby_countdown: Duration,
    /// Entries in each leaderboard snapshot
    pub leaderboard_size: usize,
    /// Time between leaderboard broadcasts
    pub leaderboard_interval: Duration,
    /// Ticks between full `game_state` broadcasts
    pub snapshot_interval_ticks: u32,
    /// Pellets the food field keeps on the map
    pub food_target: usize,
    /// Seed for world randomness; random when unset
    pub seed: Option<u64>,
    /// Zone stages
    pub zone: ZoneConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            tiers: vec![1, 5, 20],
            world_width: 3000.0,
            world_height: 3000.0,
            min_match_players: 2,
            max_match_players: 100,
            lobby_countdown: Duration::from_secs(10),
            leaderboard_size: 10,
            leaderboard_interval: Duration::from_secs(1),
            snapshot_interval_ticks: 2,
            food_target: 300,
            seed: None,
            zone: ZoneConfig::default(),
        }
    }
}

/// Parse a comma-separated tier list such as `1,5,20`
pub fn parse_tiers(raw: &str) -> Result<Vec<u32>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "ENTRY_TIERS",
        value: raw.to_string(),
    };

    let mut tiers = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let tier: u32 = part.parse().map_err(|_| invalid())?;
        if tier == 0 {
            return Err(invalid());
        }
        if !tiers.contains(&tier) {
            tiers.push(tier);
        }
    }

    if tiers.is_empty() {
        return Err(invalid());
    }
    tiers.sort_unstable();
    Ok(tiers)
}

fn parse_tick_rate(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(rate) if (1..=120).contains(&rate) => Ok(rate),
        _ => Err(ConfigError::Invalid {
            key: "TICK_RATE",
            value: raw.to_string(),
        }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
