//! Food pellets scattered over the world

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ws::protocol::FoodView;

use super::player::{PlayerRegistry, WorldBounds, MAX_SIZE};

/// Pellets added per tick while below target
pub const FOOD_SPAWN_PER_TICK: usize = 5;
pub const FOOD_MIN_VALUE: f32 = 0.5;
pub const FOOD_MAX_VALUE: f32 = 1.5;

#[derive(Debug, Clone)]
pub struct Food {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// Size gained by the eater
    pub value: f32,
}

pub struct FoodField {
    foods: Vec<Food>,
    next_id: u64,
    target: usize,
    bounds: WorldBounds,
    rng: ChaCha8Rng,
}

impl FoodField {
    pub fn new(target: usize, bounds: WorldBounds, rng: ChaCha8Rng) -> Self {
        Self {
            foods: Vec::with_capacity(target),
            next_id: 1,
            target,
            bounds,
            rng,
        }
    }

    /// Fill the field to its target in one go (used at startup)
    pub fn fill(&mut self) {
        while self.foods.len() < self.target {
            self.spawn_one();
        }
    }

    /// Top the field up by at most `FOOD_SPAWN_PER_TICK` pellets
    pub fn replenish(&mut self) {
        for _ in 0..FOOD_SPAWN_PER_TICK {
            if self.foods.len() >= self.target {
                break;
            }
            self.spawn_one();
        }
    }

    fn spawn_one(&mut self) {
        let (x, y) = self.bounds.random_point(&mut self.rng);
        let value = self.rng.gen_range(FOOD_MIN_VALUE..=FOOD_MAX_VALUE);
        self.foods.push(Food {
            id: self.next_id,
            x,
            y,
            value,
        });
        self.next_id += 1;
    }

    /// Let every player eat the pellets under it; returns pellets eaten
    pub fn consume(&mut self, registry: &mut PlayerRegistry) -> usize {
        let before = self.foods.len();

        for player in registry.iter_mut() {
            if !player.is_consistent() {
                continue;
            }
            let reach_sq = player.size * player.size;
            let (px, py) = (player.x, player.y);
            let mut gained = 0.0;

            self.foods.retain(|food| {
                let dx = food.x - px;
                let dy = food.y - py;
                if dx * dx + dy * dy <= reach_sq {
                    gained += food.value;
                    false
                } else {
                    true
                }
            });

            if gained > 0.0 {
                player.size = (player.size + gained).min(MAX_SIZE);
            }
        }

        before - self.foods.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn views(&self) -> Vec<FoodView> {
        self.foods
            .iter()
            .map(|f| FoodView {
                id: f.id,
                x: f.x,
                y: f.y,
                size: f.value,
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, x: f32, y: f32, value: f32) {
        self.foods.push(Food {
            id: self.next_id,
            x,
            y,
            value,
        });
        self.next_id += 1;
    }
}
