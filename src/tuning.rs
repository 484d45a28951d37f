//! Data-driven game balance
//!
//! Every gameplay number the simulation reads lives in [`Tuning`]. The host
//! may hand over a partial JSON document; missing keys keep their defaults.
//! Values are per frame unless the name says otherwise.

use serde::{Deserialize, Serialize};

use crate::consts::WEAPON_SLOTS;
use crate::error::{SimError, SimResult};

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Enemies ===
    /// Downward acceleration applied to enemies and allies
    pub gravity: f32,
    /// Milliseconds between enemy spawns
    pub spawn_interval_ms: f64,
    pub enemy_min_size: f32,
    pub enemy_max_size: f32,
    pub enemy_hp: f32,
    /// Maximum upward impulse of a floor hop
    pub enemy_jump_impulse: f32,
    /// Frames an enemy rests on the floor between hops
    pub enemy_jump_cooldown: i32,
    /// Amplitude of the sinusoidal horizontal wobble
    pub enemy_drift: f32,

    // === Speech ===
    /// Chance that a freshly spawned enemy carries a speech line
    pub speech_chance: f64,
    /// Blink period of speech bubbles
    pub speech_toggle_ms: f64,
    /// Phrase set speech lines are drawn from (host content)
    pub phrases: Vec<String>,

    // === Damage ===
    pub basic_damage: f32,
    pub explosive_damage: f32,
    pub heavy_damage: f32,
    /// Area damage an explosion deals to each enemy inside it, per frame
    pub explosion_tick_damage: f32,
    pub explosion_growth: f32,
    pub explosion_fade: f32,

    // === Wrecking ball ===
    pub heavy_gravity: f32,
    pub heavy_bounce_damping: f32,
    pub heavy_max_bounces: u32,
    pub heavy_debris_count: usize,
    pub wave_max_radius: f32,
    pub wave_growth: f32,
    pub wave_fade: f32,
    /// Wave power above which an enemy is killed outright
    pub wave_kill_power: f32,

    // === Population caps ===
    pub max_detached_parts: usize,
    pub detached_part_evict: usize,
    pub max_ground_decals: usize,
    pub ground_decal_evict: usize,
    /// Frames a detached part lives
    pub part_life: f32,

    // === Allies ===
    pub ally_hp: f32,
    pub ally_lifespan_ms: f64,
    pub ally_speed: f32,
    pub ally_attack_range: f32,
    pub ally_attack_cooldown: i32,
    pub ally_attack_frames: i32,
    pub ally_damage: f32,
    pub ally_jump_impulse: f32,
    pub ally_jump_cooldown: i32,

    // === Text ===
    /// Display names for weapon slots 1..=6
    pub weapon_names: Vec<String>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            spawn_interval_ms: 800.0,
            enemy_min_size: 18.0,
            enemy_max_size: 48.0,
            enemy_hp: 2.0,
            enemy_jump_impulse: 12.0,
            enemy_jump_cooldown: 60,
            enemy_drift: 1.5,

            speech_chance: 0.25,
            speech_toggle_ms: 2000.0,
            phrases: vec![
                "You missed!".to_string(),
                "Is that all?".to_string(),
                "Catch me if you can!".to_string(),
                "Not the face!".to_string(),
            ],

            basic_damage: 1.0,
            explosive_damage: 10.0,
            heavy_damage: 20.0,
            explosion_tick_damage: 1.0,
            explosion_growth: 5.0,
            explosion_fade: 0.05,

            heavy_gravity: 0.4,
            heavy_bounce_damping: 0.7,
            heavy_max_bounces: 4,
            heavy_debris_count: 50,
            wave_max_radius: 180.0,
            wave_growth: 8.0,
            wave_fade: 0.08,
            wave_kill_power: 0.7,

            max_detached_parts: 100,
            detached_part_evict: 20,
            max_ground_decals: 200,
            ground_decal_evict: 50,
            part_life: 300.0,

            ally_hp: 10.0,
            ally_lifespan_ms: 15_000.0,
            ally_speed: 3.0,
            ally_attack_range: 40.0,
            ally_attack_cooldown: 45,
            ally_attack_frames: 20,
            ally_damage: 1.0,
            ally_jump_impulse: 8.0,
            ally_jump_cooldown: 45,

            weapon_names: vec![
                "Rifle".to_string(),
                "Rocket".to_string(),
                "Barrage".to_string(),
                "Knives".to_string(),
                "Wrecking Ball".to_string(),
                "Converter".to_string(),
            ],
        }
    }
}

impl Tuning {
    /// Overlay a (possibly partial) JSON document on the defaults
    pub fn from_json(json: &str) -> SimResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> SimResult<()> {
        if !(self.enemy_min_size > 0.0 && self.enemy_min_size <= self.enemy_max_size) {
            return Err(SimError::InvalidTuning(format!(
                "enemy size range [{}, {}] is empty",
                self.enemy_min_size, self.enemy_max_size
            )));
        }
        if self.enemy_hp <= 0.0 || self.ally_hp <= 0.0 {
            return Err(SimError::InvalidTuning("hit points must be positive".into()));
        }
        if self.spawn_interval_ms < 0.0 || !self.spawn_interval_ms.is_finite() {
            return Err(SimError::InvalidTuning(format!(
                "spawn interval {}ms",
                self.spawn_interval_ms
            )));
        }
        for (name, growth) in [
            ("explosion_growth", self.explosion_growth),
            ("wave_growth", self.wave_growth),
        ] {
            if !(growth.is_finite() && growth > 0.0) {
                return Err(SimError::InvalidTuning(format!("{} must be positive, got {}", name, growth)));
            }
        }
        if self.explosion_fade <= 0.0 || self.wave_fade <= 0.0 {
            return Err(SimError::InvalidTuning("fade steps must be positive".into()));
        }
        if self.max_detached_parts == 0 || self.max_ground_decals == 0 {
            return Err(SimError::InvalidTuning("population caps must be non-zero".into()));
        }
        if self.heavy_max_bounces == 0 {
            return Err(SimError::InvalidTuning("heavy_max_bounces must be at least 1".into()));
        }
        Ok(())
    }

    /// Display name for a weapon slot, falling back to the slot number
    pub fn weapon_name(&self, slot: u8) -> String {
        if slot == 0 || slot > WEAPON_SLOTS {
            return String::new();
        }
        self.weapon_names
            .get(slot as usize - 1)
            .cloned()
            .unwrap_or_else(|| format!("Weapon {}", slot))
    }
}
