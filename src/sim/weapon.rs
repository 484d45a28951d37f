//! Weapon selection and firing
//!
//! The selected slot decides what `fire` appends to the projectile pool and
//! how the turret's gun is drawn. The kill counter is statistics only.

use glam::Vec2;

use super::state::{GameEvent, GameState, Projectile, ProjectileKind};
use crate::audio::SoundEffect;
use crate::consts::WEAPON_SLOTS;
use crate::rand_between;

/// Selectable weapons, numbered as on the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeaponSlot {
    #[default]
    Rifle = 1,
    Rocket = 2,
    Barrage = 3,
    Knives = 4,
    WreckingBall = 5,
    Converter = 6,
}

impl WeaponSlot {
    pub const ALL: [WeaponSlot; WEAPON_SLOTS as usize] = [
        WeaponSlot::Rifle,
        WeaponSlot::Rocket,
        WeaponSlot::Barrage,
        WeaponSlot::Knives,
        WeaponSlot::WreckingBall,
        WeaponSlot::Converter,
    ];

    pub fn from_index(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(WeaponSlot::Rifle),
            2 => Some(WeaponSlot::Rocket),
            3 => Some(WeaponSlot::Barrage),
            4 => Some(WeaponSlot::Knives),
            5 => Some(WeaponSlot::WreckingBall),
            6 => Some(WeaponSlot::Converter),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Anything past the starting rifle counts as an upgraded weapon
    pub fn is_upgraded(self) -> bool {
        self != WeaponSlot::Rifle
    }
}

/// Gun styling for the selected slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponRig {
    /// Barrel length relative to the turret's gun length
    pub length_scale: f32,
    /// Barrel width relative to the turret's gun width
    pub width_scale: f32,
    pub barrels: u8,
    /// Barrel color (RGB)
    pub color: [u8; 3],
    /// Muzzle cap radius (0 = none)
    pub cap_radius: f32,
}

/// Weapon selection state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arsenal {
    pub slot: WeaponSlot,
    /// Cumulative kills (display only)
    pub kills: u64,
}

impl Arsenal {
    /// Select a slot; out-of-range slots are ignored. Returns true on change.
    pub fn select(&mut self, slot: u8) -> bool {
        match WeaponSlot::from_index(slot) {
            Some(next) if next != self.slot => {
                self.slot = next;
                true
            }
            _ => false,
        }
    }

    pub fn record_kill(&mut self) {
        self.kills += 1;
    }

    pub fn rig(&self) -> WeaponRig {
        match self.slot {
            WeaponSlot::Rifle => WeaponRig {
                length_scale: 1.0,
                width_scale: 1.0,
                barrels: 1,
                color: [51, 51, 51],
                cap_radius: 0.0,
            },
            WeaponSlot::Rocket => WeaponRig {
                length_scale: 1.0,
                width_scale: 3.0,
                barrels: 1,
                color: [68, 68, 68],
                cap_radius: 1.5,
            },
            WeaponSlot::Barrage => WeaponRig {
                length_scale: 1.0,
                width_scale: 4.0,
                barrels: 3,
                color: [102, 0, 0],
                cap_radius: 0.0,
            },
            WeaponSlot::Knives => WeaponRig {
                length_scale: 0.7,
                width_scale: 2.0,
                barrels: 1,
                color: [34, 34, 34],
                cap_radius: 0.0,
            },
            WeaponSlot::WreckingBall => WeaponRig {
                length_scale: 0.9,
                width_scale: 3.5,
                barrels: 1,
                color: [90, 90, 90],
                cap_radius: 2.0,
            },
            WeaponSlot::Converter => WeaponRig {
                length_scale: 1.1,
                width_scale: 1.5,
                barrels: 1,
                color: [58, 143, 106],
                cap_radius: 1.2,
            },
        }
    }
}

/// Select a weapon slot (1..=6); anything else is a silent no-op
pub fn select_weapon(state: &mut GameState, slot: u8) -> bool {
    if !state.arsenal.select(slot) {
        log::debug!("Ignoring weapon selection {}", slot);
        return false;
    }
    log::info!(
        "Weapon {} selected: {}",
        slot,
        state.tuning.weapon_name(slot)
    );
    state.events.push(GameEvent::WeaponSelected { slot });
    state.sound(SoundEffect::WeaponSwitch);
    true
}

/// Fire the selected weapon toward `aim`; returns the number of projectiles
pub fn fire(state: &mut GameState, aim: Vec2) -> usize {
    let angle = state.turret.angle_to(aim);
    if !angle.is_finite() {
        return 0;
    }
    state.turret.aim_angle = angle;
    let muzzle = state.turret.muzzle(angle);

    let mut shots: Vec<(f32, f32, Vec2, ProjectileKind)> = Vec::new();
    match state.arsenal.slot {
        WeaponSlot::Rifle => {
            shots.push((angle, 12.0, Vec2::new(4.0, 4.0), ProjectileKind::Basic));
        }
        WeaponSlot::Rocket => {
            shots.push((
                angle,
                8.0,
                Vec2::new(8.0, 12.0),
                ProjectileKind::AreaExplosive {
                    explosion_radius: 80.0,
                },
            ));
        }
        WeaponSlot::Barrage => {
            for i in -1..=1 {
                shots.push((
                    angle + i as f32 * 0.1,
                    7.0,
                    Vec2::new(10.0, 14.0),
                    ProjectileKind::MultiExplosive {
                        explosion_radius: 100.0,
                    },
                ));
            }
        }
        WeaponSlot::Knives => {
            for i in -1..=1 {
                let rotation_speed = rand_between(&mut state.rng, 0.5, 0.8);
                shots.push((
                    angle + i as f32 * 0.15,
                    15.0,
                    Vec2::new(20.0, 5.0),
                    ProjectileKind::Piercing {
                        hits: 0,
                        max_hits: 3,
                        rotation: 0.0,
                        rotation_speed,
                    },
                ));
            }
        }
        WeaponSlot::WreckingBall => {
            shots.push((
                angle,
                10.0,
                Vec2::new(24.0, 24.0),
                ProjectileKind::BouncingHeavy {
                    bounces: 0,
                    max_bounces: state.tuning.heavy_max_bounces,
                    damage_stage: 0,
                    gravity: state.tuning.heavy_gravity,
                    bounce_damping: state.tuning.heavy_bounce_damping,
                },
            ));
        }
        WeaponSlot::Converter => {
            shots.push((
                angle,
                5.0,
                Vec2::new(14.0, 14.0),
                ProjectileKind::Transforming { pulse: 0.0 },
            ));
        }
    }

    let count = shots.len();
    for (heading, speed, size, kind) in shots {
        let id = state.next_entity_id();
        // Projectile hit boxes are anchored at their top-left corner
        state
            .projectiles
            .push(Projectile::new(id, muzzle, heading, speed, size, kind));
    }
    state.sound(SoundEffect::Fire);
    count
}
