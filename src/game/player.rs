//! Authoritative per-player simulation state

use std::collections::BTreeMap;
use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::ws::protocol::PlayerView;

use super::PlayerId;

/// Cruising speed in world units per second
pub const BASE_SPEED: f32 = 200.0;
/// Speed while boosting
pub const BOOST_SPEED: f32 = 350.0;
/// Size a player spawns with
pub const INITIAL_SIZE: f32 = 20.0;
/// Boosting never shrinks a player below this
pub const MIN_SIZE: f32 = 10.0;
/// Passive growth and eating stop here
pub const MAX_SIZE: f32 = 200.0;
/// Passive growth per second while not boosting
pub const GROWTH_PER_SEC: f32 = 0.5;
/// Size burned per second while boosting
pub const BOOST_COST_PER_SEC: f32 = 2.0;
pub const MAX_HEALTH: f32 = 100.0;
/// Health regained per second inside the zone
pub const HEALTH_REGEN_PER_SEC: f32 = 2.0;
/// Longest cosmetic marker accepted, in characters
pub const MAX_EMOJI_CHARS: usize = 8;

const COLOR_PALETTE: [&str; 8] = [
    "#ff595e", "#ffca3a", "#8ac926", "#1982c4", "#6a4c93", "#f15bb5", "#00bbf9", "#00f5d4",
];

/// Rectangular world bounds anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (x.clamp(0.0, self.width), y.clamp(0.0, self.height))
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    pub fn random_point(&self, rng: &mut ChaCha8Rng) -> (f32, f32) {
        (
            rng.gen_range(0.0..=self.width),
            rng.gen_range(0.0..=self.height),
        )
    }
}

/// Player state (authoritative)
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: PlayerId,
    pub user_id: Uuid,
    pub display_name: String,

    // Position and movement
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,

    pub size: f32,
    pub health: f32,
    pub boosting: bool,

    // Cosmetics
    pub color: &'static str,
    pub emoji: Option<String>,
}

impl PlayerState {
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.display_name.clone(),
            x: self.x,
            y: self.y,
            vx: self.vel_x,
            vy: self.vel_y,
            size: self.size,
            health: self.health,
            boosting: self.boosting,
            color: self.color.to_string(),
            emoji: self.emoji.clone(),
        }
    }

    /// Current movement speed
    pub fn speed(&self) -> f32 {
        if self.boosting {
            BOOST_SPEED
        } else {
            BASE_SPEED
        }
    }

    /// NaN or infinite coordinates mark a record the tick must skip
    pub fn is_consistent(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.health.is_finite() && self.size.is_finite()
    }

    /// Re-point the current velocity at the current speed
    fn rescale_velocity(&mut self) {
        let speed = (self.vel_x * self.vel_x + self.vel_y * self.vel_y).sqrt();
        if speed > f32::EPSILON {
            let scale = self.speed() / speed;
            self.vel_x *= scale;
            self.vel_y *= scale;
        }
    }
}

/// Owner of every live player's simulation state
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, PlayerState>,
    bounds: WorldBounds,
    rng: ChaCha8Rng,
}

impl PlayerRegistry {
    pub fn new(bounds: WorldBounds, rng: ChaCha8Rng) -> Self {
        Self {
            players: BTreeMap::new(),
            bounds,
            rng,
        }
    }

    /// Spawn a player at a random in-bounds position with default stats
    pub fn create_player(&mut self, id: PlayerId, user_id: Uuid, display_name: String) -> &PlayerState {
        let (x, y) = self.bounds.random_point(&mut self.rng);
        let color = COLOR_PALETTE[self.rng.gen_range(0..COLOR_PALETTE.len())];

        let player = PlayerState {
            id,
            user_id,
            display_name,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            size: INITIAL_SIZE,
            health: MAX_HEALTH,
            boosting: false,
            color,
            emoji: None,
        };

        self.players.insert(id, player);
        &self.players[&id]
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<PlayerState> {
        self.players.remove(id)
    }

    pub fn get(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Ids in ascending order
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerState> {
        self.players.values_mut()
    }

    /// Steer towards a target point at the player's current speed
    pub fn handle_move(&mut self, id: &PlayerId, target_x: f32, target_y: f32) -> Option<&PlayerState> {
        if !target_x.is_finite() || !target_y.is_finite() {
            return None;
        }
        let player = self.players.get_mut(id)?;

        let dx = target_x - player.x;
        let dy = target_y - player.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < f32::EPSILON {
            player.vel_x = 0.0;
            player.vel_y = 0.0;
        } else {
            let speed = player.speed();
            player.vel_x = dx / dist * speed;
            player.vel_y = dy / dist * speed;
        }

        Some(player)
    }

    pub fn set_boost(&mut self, id: &PlayerId, boosting: bool) -> Option<&PlayerState> {
        let player = self.players.get_mut(id)?;
        player.boosting = boosting;
        player.rescale_velocity();
        Some(player)
    }

    pub fn set_emoji(&mut self, id: &PlayerId, emoji: Option<String>) -> Option<&PlayerState> {
        let player = self.players.get_mut(id)?;
        player.emoji = emoji;
        Some(player)
    }

    /// Advance every player by `delta`
    pub fn tick(&mut self, delta: Duration) {
        let dt = delta.as_secs_f32();
        let bounds = self.bounds;

        for player in self.players.values_mut() {
            if !player.is_consistent() {
                continue;
            }

            let (x, y) = bounds.clamp(player.x + player.vel_x * dt, player.y + player.vel_y * dt);
            player.x = x;
            player.y = y;

            if player.boosting {
                player.size = (player.size - BOOST_COST_PER_SEC * dt).max(MIN_SIZE);
            } else {
                player.size = (player.size + GROWTH_PER_SEC * dt).min(MAX_SIZE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn registry() -> PlayerRegistry {
        PlayerRegistry::new(WorldBounds::new(1000.0, 1000.0), ChaCha8Rng::seed_from_u64(7))
    }

    fn spawn(registry: &mut PlayerRegistry) -> PlayerId {
        let id = Uuid::new_v4();
        registry.create_player(id, Uuid::new_v4(), "pilot".to_string());
        id
    }

    #[test]
    fn spawns_in_bounds_with_defaults() {
        let mut registry = registry();
        for _ in 0..50 {
            let id = spawn(&mut registry);
            let p = registry.get(&id).unwrap();
            assert!((0.0..=1000.0).contains(&p.x));
            assert!((0.0..=1000.0).contains(&p.y));
            assert_eq!(p.size, INITIAL_SIZE);
            assert_eq!(p.health, MAX_HEALTH);
            assert!(COLOR_PALETTE.contains(&p.color));
        }
        assert_eq!(registry.len(), 50);
    }

    #[test]
    fn move_sets_normalized_velocity() {
        let mut registry = registry();
        let id = spawn(&mut registry);
        {
            let p = registry.get_mut(&id).unwrap();
            p.x = 100.0;
            p.y = 100.0;
        }

        let p = registry.handle_move(&id, 400.0, 500.0).unwrap();
        assert!((p.vel_x - 0.6 * BASE_SPEED).abs() < 1e-3);
        assert!((p.vel_y - 0.8 * BASE_SPEED).abs() < 1e-3);

        registry.set_boost(&id, true);
        let p = registry.handle_move(&id, 400.0, 500.0).unwrap();
        let speed = (p.vel_x * p.vel_x + p.vel_y * p.vel_y).sqrt();
        assert!((speed - BOOST_SPEED).abs() < 1e-2);
    }

    #[test]
    fn boost_rescales_existing_velocity() {
        let mut registry = registry();
        let id = spawn(&mut registry);
        let (x, y) = {
            let p = registry.get(&id).unwrap();
            (p.x, p.y)
        };
        registry.handle_move(&id, x + 10.0, y);
        let p = registry.set_boost(&id, true).unwrap();
        assert!((p.vel_x - BOOST_SPEED).abs() < 1e-3);
        let p = registry.set_boost(&id, false).unwrap();
        assert!((p.vel_x - BASE_SPEED).abs() < 1e-3);
    }

    #[test]
    fn move_to_own_position_stops() {
        let mut registry = registry();
        let id = spawn(&mut registry);
        let (x, y) = {
            let p = registry.get(&id).unwrap();
            (p.x, p.y)
        };
        let p = registry.handle_move(&id, x, y).unwrap();
        assert_eq!((p.vel_x, p.vel_y), (0.0, 0.0));
    }

    #[test]
    fn operations_on_missing_ids_are_noops() {
        let mut registry = registry();
        let ghost = Uuid::new_v4();
        assert!(registry.handle_move(&ghost, 1.0, 1.0).is_none());
        assert!(registry.set_boost(&ghost, true).is_none());
        assert!(registry.set_emoji(&ghost, Some("x".into())).is_none());
        assert!(registry.remove_player(&ghost).is_none());
    }

    #[test]
    fn tick_clamps_to_world_bounds() {
        let mut registry = registry();
        let id = spawn(&mut registry);
        registry.handle_move(&id, 5000.0, -5000.0);
        for _ in 0..200 {
            registry.tick(Duration::from_millis(50));
        }
        let p = registry.get(&id).unwrap();
        assert_eq!(p.x, 1000.0);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn boosting_burns_size_and_cruising_grows_it() {
        let mut registry = registry();
        let id = spawn(&mut registry);

        registry.tick(Duration::from_secs(2));
        assert!((registry.get(&id).unwrap().size - (INITIAL_SIZE + 2.0 * GROWTH_PER_SEC)).abs() < 1e-4);

        registry.set_boost(&id, true);
        registry.tick(Duration::from_secs(1));
        assert!((registry.get(&id).unwrap().size - (INITIAL_SIZE + 1.0 - BOOST_COST_PER_SEC)).abs() < 1e-4);

        registry.tick(Duration::from_secs(60));
        assert_eq!(registry.get(&id).unwrap().size, MIN_SIZE);

        registry.set_boost(&id, false);
        registry.tick(Duration::from_secs(10_000));
        assert_eq!(registry.get(&id).unwrap().size, MAX_SIZE);
    }

    #[test]
    fn inconsistent_records_are_left_alone() {
        let mut registry = registry();
        let id = spawn(&mut registry);
        registry.get_mut(&id).unwrap().x = f32::NAN;
        registry.tick(Duration::from_millis(50));
        assert!(registry.get(&id).unwrap().x.is_nan());
        assert_eq!(registry.get(&id).unwrap().size, INITIAL_SIZE);
    }
}
