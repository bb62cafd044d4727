//! Shrinking safe zone state machine

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ws::protocol::ZoneView;

use super::player::WorldBounds;

/// One zone stage
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStage {
    /// How long the stage lasts before the next transition
    pub duration: Duration,
    /// Damage per second outside zone
    pub damage_per_second: f32,
    /// Radius multiplier applied on entering this stage
    pub shrink_factor: f32,
}

impl ZoneStage {
    pub fn new(duration_secs: u64, damage_per_second: f32, shrink_factor: f32) -> Self {
        Self {
            duration: Duration::from_secs(duration_secs),
            damage_per_second,
            shrink_factor,
        }
    }
}

/// Zone configuration for battle royale shrinking
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    /// Radius at stage 1, as a fraction of the shorter world side
    pub initial_radius_ratio: f32,
    /// Shrinking never goes below this
    pub min_radius: f32,
    pub stages: Vec<ZoneStage>,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            initial_radius_ratio: 0.5,
            min_radius: 150.0,
            stages: vec![
                ZoneStage::new(60, 2.0, 1.0),
                ZoneStage::new(45, 5.0, 0.75),
                ZoneStage::new(40, 10.0, 0.7),
                ZoneStage::new(30, 20.0, 0.6),
                ZoneStage::new(20, 35.0, 0.5),
            ],
        }
    }
}

impl ZoneConfig {
    /// Reject stage tables that would grow the zone or soften its damage
    pub fn validate(&self) -> Result<(), ZoneConfigError> {
        if self.stages.is_empty() {
            return Err(ZoneConfigError::NoStages);
        }
        if !(self.min_radius >= 0.0) {
            return Err(ZoneConfigError::InvalidMinRadius(self.min_radius));
        }

        let mut last_damage = 0.0_f32;
        for (idx, stage) in self.stages.iter().enumerate() {
            let number = idx + 1;
            if !(stage.shrink_factor > 0.0 && stage.shrink_factor <= 1.0) {
                return Err(ZoneConfigError::ShrinkFactor {
                    stage: number,
                    factor: stage.shrink_factor,
                });
            }
            if stage.duration.is_zero() {
                return Err(ZoneConfigError::ZeroDuration { stage: number });
            }
            if !(stage.damage_per_second >= last_damage) {
                return Err(ZoneConfigError::DecreasingDamage { stage: number });
            }
            last_damage = stage.damage_per_second;
        }
        Ok(())
    }
}

/// Zone configuration errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ZoneConfigError {
    #[error("Zone needs at least one stage")]
    NoStages,

    #[error("Invalid minimum radius {0}")]
    InvalidMinRadius(f32),

    #[error("Stage {stage} shrink factor {factor} must be in (0, 1]")]
    ShrinkFactor { stage: usize, factor: f32 },

    #[error("Stage {stage} has zero duration")]
    ZeroDuration { stage: usize },

    #[error("Stage {stage} deals less damage than the stage before it")]
    DecreasingDamage { stage: usize },
}

/// Live zone state, advanced only by the game loop
pub struct Zone {
    config: ZoneConfig,
    bounds: WorldBounds,
    center_x: f32,
    center_y: f32,
    radius: f32,
    /// Index into `config.stages`
    stage: usize,
    deadline: Duration,
    rng: ChaCha8Rng,
}

impl Zone {
    /// Create the stage-1 zone centered in the world, starting at `now`
    pub fn new(
        config: ZoneConfig,
        bounds: WorldBounds,
        now: Duration,
        rng: ChaCha8Rng,
    ) -> Result<Self, ZoneConfigError> {
        config.validate()?;

        let (center_x, center_y) = bounds.center();
        let radius = (bounds.width.min(bounds.height) * config.initial_radius_ratio)
            .max(config.min_radius);
        let deadline = now + config.stages[0].duration;

        Ok(Self {
            config,
            bounds,
            center_x,
            center_y,
            radius,
            stage: 0,
            deadline,
            rng,
        })
    }

    /// Advance the state machine; returns true when the zone changed
    pub fn tick(&mut self, now: Duration) -> bool {
        if now < self.deadline {
            return false;
        }

        self.stage = (self.stage + 1).min(self.config.stages.len() - 1);
        let stage = &self.config.stages[self.stage];

        let old_radius = self.radius;
        self.radius = (old_radius * stage.shrink_factor).max(self.config.min_radius).min(old_radius);

        // Keep the new circle inside the old one
        let max_offset = old_radius - self.radius;
        if max_offset > 0.0 {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let offset = self.rng.gen_range(0.0..max_offset);
            let (x, y) = self.bounds.clamp(
                self.center_x + angle.cos() * offset,
                self.center_y + angle.sin() * offset,
            );
            self.center_x = x;
            self.center_y = y;
        }

        self.deadline = now + stage.duration;
        true
    }

    /// Strictly outside the circle; the boundary itself is safe
    pub fn is_outside(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        (dx * dx + dy * dy).sqrt() > self.radius
    }

    pub fn damage_per_second(&self) -> f32 {
        self.config.stages[self.stage].damage_per_second
    }

    /// 1-based stage index
    pub fn stage(&self) -> u32 {
        self.stage as u32 + 1
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[cfg(test)]
    pub fn center(&self) -> (f32, f32) {
        (self.center_x, self.center_y)
    }

    #[cfg(test)]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn view(&self, now: Duration) -> ZoneView {
        ZoneView {
            center_x: self.center_x,
            center_y: self.center_y,
            radius: self.radius,
            stage: self.stage(),
            damage_per_second: self.damage_per_second(),
            next_stage_in: self.deadline.saturating_sub(now).as_secs_f32(),
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, center_x: f32, center_y: f32, radius: f32) {
        self.center_x = center_x;
        self.center_y = center_y;
        self.radius = radius;
    }
}
