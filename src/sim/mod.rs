//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches the
//! browser or the renderer:
//! - Wall-clock time is passed in explicitly
//! - Seeded RNG only
//! - Pools are iterated newest-first wherever removal can happen

pub mod ally;
pub mod combat;
pub mod geometry;
pub mod gore;
pub mod motion;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapon;

pub use geometry::{Rect, aabb_overlap, within_radius};
pub use schedule::{Deferred, DeferredQueue};
pub use state::{
    AllyState, AlliedUnit, DamageSource, DetachedPart, Enemy, Explosion, GameEvent, GameState,
    GroundDecal, Particle, ParticleKind, PartShape, Projectile, ProjectileKind, ShatterWave, Tint,
};
pub use tick::{Command, FrameInput, FrameReport, tick};
pub use weapon::{Arsenal, WeaponSlot};
