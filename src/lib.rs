//! Gorefield - a turret arcade shooter with gore physics
//!
//! Core modules:
//! - `sim`: Simulation core (entity pools, motion, collisions, gore, allies)
//! - `renderer`: Immediate-mode draw commands and the canvas backend
//! - `platform`: Browser input reduced to aim/fire/select commands
//! - `audio`: Sound hook (Web Audio on wasm, no-op elsewhere)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod audio;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::{SimError, SimResult};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Default surface size used before the host reports a real one
    pub const DEFAULT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_HEIGHT: f32 = 720.0;

    /// Turret body (centered horizontally, hanging from the top edge)
    pub const TURRET_Y: f32 = 50.0;
    pub const TURRET_WIDTH: f32 = 40.0;
    pub const TURRET_HEIGHT: f32 = 60.0;
    pub const GUN_LENGTH: f32 = 30.0;
    pub const GUN_WIDTH: f32 = 8.0;

    /// Number of selectable weapon slots
    pub const WEAPON_SLOTS: u8 = 6;

    /// Explosions always start at this radius and grow toward their max
    pub const EXPLOSION_START_RADIUS: f32 = 10.0;
    /// Radius used for the hit-twice upgrade explosion
    pub const UPGRADE_EXPLOSION_RADIUS: f32 = 50.0;

    /// Particle physics (per frame)
    pub const PARTICLE_GRAVITY: f32 = 0.15;
    pub const PARTICLE_DRAG: f32 = 0.98;

    /// Detached part physics (per frame)
    pub const PART_GRAVITY: f32 = 0.3;
    pub const PART_DRAG: f32 = 0.99;
    pub const PART_GROUND_BOUNCE: f32 = 0.2;
    /// Parts further than this outside the play area are culled
    pub const PART_CULL_MARGIN: f32 = 100.0;

    /// Enemy horizontal wobble
    pub const DRIFT_TIME_SCALE: f64 = 0.002;

    /// Floating speech lifetime in frames
    pub const FLOATING_SPEECH_LIFE: f32 = 60.0;
}

/// Uniform sample in `[lo, hi)`; returns `lo` for an empty or inverted span
#[inline]
pub fn rand_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    lo + rng.random::<f32>() * (hi - lo)
}

/// Uniform integer sample in `[lo, hi]`
#[inline]
pub fn rand_count<R: Rng + ?Sized>(rng: &mut R, lo: usize, hi: usize) -> usize {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..=hi)
}

/// Symmetric jitter in `[-half, half)`
#[inline]
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * 2.0 * half
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rand_between_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = rand_between(&mut rng, 18.0, 48.0);
            assert!((18.0..48.0).contains(&v));
        }
    }

    #[test]
    fn test_rand_between_empty_span() {
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(rand_between(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(rand_between(&mut rng, 5.0, -3.0), 5.0);
    }

    #[test]
    fn test_jitter_symmetric_bounds() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..1000 {
            let v = jitter(&mut rng, 2.5);
            assert!((-2.5..2.5).contains(&v));
        }
    }
}
