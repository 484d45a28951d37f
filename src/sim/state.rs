//! Game state and entity records
//!
//! Entities are plain data. All mutation happens in the step functions of
//! the sibling modules, which receive the whole [`GameState`] explicitly.
//! Pools own their entities; cross references are entity ids.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::geometry::Rect;
use super::schedule::DeferredQueue;
use super::weapon::Arsenal;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Shared finiteness check for entity pools
pub trait Validate {
    /// Pool name used in fault logs
    const POOL: &'static str;

    /// Identifier for logs (entity id, or pool index for id-less entities)
    fn key(&self, index: usize) -> u32;

    /// True when every kinematic field is finite
    fn is_well_formed(&self) -> bool;

    fn check(&self, index: usize) -> SimResult<()> {
        if self.is_well_formed() {
            Ok(())
        } else {
            Err(SimError::MalformedEntity {
                pool: Self::POOL,
                id: self.key(index),
            })
        }
    }
}

/// Palette index for cosmetic entities (resolved to a color by the renderer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Blood,
    DarkBlood,
    Feather,
    FeatherDark,
    Debris,
    Glow,
}

/// What dealt the final blow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Bullet,
    Rocket,
    WreckingBall,
    Knife,
    Explosion,
    ShatterWave,
    Ally,
}

impl DamageSource {
    /// Area-capable sources finish enemies with a large explosion
    pub fn is_area_capable(&self) -> bool {
        matches!(self, DamageSource::Rocket | DamageSource::WreckingBall)
    }
}

/// Outbound notifications for the host (audio, HUD)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemyKilled { id: u32, source: DamageSource },
    EnemyConverted { enemy_id: u32, ally_id: u32 },
    WeaponSelected { slot: u8 },
    Sound(SoundEffect),
}

// === Enemies ===

/// Cosmetic wound drawn on an enemy body (offset relative to its size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodMark {
    pub offset: Vec2,
    pub size: f32,
}

/// Speech bubble attached to an enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Speech {
    pub text: String,
    /// Frames the bubble stays up
    pub timer: i32,
    /// Timestamp of the last blink toggle
    pub toggled_at_ms: f64,
    pub visible: bool,
}

impl Speech {
    pub fn is_showing(&self) -> bool {
        self.visible && self.timer > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vy: f32,
    pub jump_cooldown: i32,
    pub hp: f32,
    pub hit_count: u32,
    pub blood_marks: Vec<BloodMark>,
    pub speech: Option<Speech>,
    /// Terminal markers - a flagged enemy is never damaged or targeted again
    pub dead: bool,
    pub slashed: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, size: Vec2, vy: f32, hp: f32) -> Self {
        Self {
            id,
            pos,
            size,
            vy,
            jump_cooldown: 0,
            hp,
            hit_count: 0,
            blood_marks: Vec::new(),
            speech: None,
            dead: false,
            slashed: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.dead && !self.slashed
    }

    /// Deduct damage; hit points never increase here
    pub fn take_damage(&mut self, amount: f32) {
        self.hp -= amount.max(0.0);
    }
}

impl Validate for Enemy {
    const POOL: &'static str = "enemy";

    fn key(&self, _index: usize) -> u32 {
        self.id
    }

    fn is_well_formed(&self) -> bool {
        self.pos.is_finite() && self.size.is_finite() && self.vy.is_finite() && self.hp.is_finite()
    }
}

// === Projectiles ===

/// Per-kind projectile data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileKind {
    Basic,
    AreaExplosive {
        explosion_radius: f32,
    },
    MultiExplosive {
        explosion_radius: f32,
    },
    Piercing {
        hits: u32,
        max_hits: u32,
        rotation: f32,
        rotation_speed: f32,
    },
    BouncingHeavy {
        bounces: u32,
        max_bounces: u32,
        /// Visual wear 0..=3, driven by bounces
        damage_stage: u8,
        gravity: f32,
        bounce_damping: f32,
    },
    Transforming {
        pulse: f32,
    },
}

impl ProjectileKind {
    /// Direct-hit damage for this kind
    pub fn damage(&self, tuning: &Tuning) -> f32 {
        match self {
            ProjectileKind::Basic => tuning.basic_damage,
            ProjectileKind::AreaExplosive { .. } | ProjectileKind::MultiExplosive { .. } => {
                tuning.explosive_damage
            }
            ProjectileKind::BouncingHeavy { .. } => tuning.heavy_damage,
            ProjectileKind::Piercing { .. } | ProjectileKind::Transforming { .. } => 0.0,
        }
    }

    /// Explosion radius for kinds that detonate on impact
    pub fn explosion_radius(&self) -> Option<f32> {
        match self {
            ProjectileKind::AreaExplosive { explosion_radius }
            | ProjectileKind::MultiExplosive { explosion_radius } => Some(*explosion_radius),
            _ => None,
        }
    }

    pub fn damage_source(&self) -> DamageSource {
        match self {
            ProjectileKind::Basic | ProjectileKind::Transforming { .. } => DamageSource::Bullet,
            ProjectileKind::AreaExplosive { .. } | ProjectileKind::MultiExplosive { .. } => {
                DamageSource::Rocket
            }
            ProjectileKind::Piercing { .. } => DamageSource::Knife,
            ProjectileKind::BouncingHeavy { .. } => DamageSource::WreckingBall,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub id: u32,
    /// Top-left corner of the hit box
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Heading at launch (drawing orientation)
    pub angle: f32,
    pub speed: f32,
    pub kind: ProjectileKind,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, angle: f32, speed: f32, size: Vec2, kind: ProjectileKind) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            size,
            angle,
            speed,
            kind,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

impl Validate for Projectile {
    const POOL: &'static str = "projectile";

    fn key(&self, _index: usize) -> u32 {
        self.id
    }

    fn is_well_formed(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

// === Area effects ===

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    pub alpha: f32,
    /// Area damage per frame to every enemy inside the radius
    pub damage: f32,
}

impl Explosion {
    pub fn new(center: Vec2, max_radius: f32, tuning: &Tuning) -> Self {
        Self {
            center,
            radius: EXPLOSION_START_RADIUS,
            max_radius,
            growth: tuning.explosion_growth,
            alpha: 1.0,
            damage: tuning.explosion_tick_damage,
        }
    }

    pub fn is_growing(&self) -> bool {
        self.radius < self.max_radius
    }
}

impl Validate for Explosion {
    const POOL: &'static str = "explosion";

    fn key(&self, index: usize) -> u32 {
        index as u32
    }

    fn is_well_formed(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.alpha.is_finite()
    }
}

/// Expanding ring from a wrecking-ball floor impact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShatterWave {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    pub alpha: f32,
}

impl ShatterWave {
    pub fn new(center: Vec2, tuning: &Tuning) -> Self {
        Self {
            center,
            radius: tuning.wave_growth,
            max_radius: tuning.wave_max_radius,
            growth: tuning.wave_growth,
            alpha: 1.0,
        }
    }

    pub fn is_expanding(&self) -> bool {
        self.radius < self.max_radius
    }
}

impl Validate for ShatterWave {
    const POOL: &'static str = "shatter wave";

    fn key(&self, index: usize) -> u32 {
        index as u32
    }

    fn is_well_formed(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite()
    }
}

/// One-shot ring shown when an enemy is converted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    pub alpha: f32,
}

impl Flash {
    pub fn is_spent(&self) -> bool {
        self.radius >= self.max_radius || self.alpha <= 0.0
    }
}

impl Validate for Flash {
    const POOL: &'static str = "flash";

    fn key(&self, index: usize) -> u32 {
        index as u32
    }

    fn is_well_formed(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite()
    }
}

// === Cosmetic particles ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Square speck
    Plain,
    /// Blood droplet, may stain the floor
    Blood,
    /// Spinning ellipse
    Feather,
    /// Always leaves a decal where it lands
    Splat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Remaining life in frames
    pub life: f32,
    pub tint: Tint,
    pub rotation: f32,
    pub rot_speed: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, size: f32, life: f32, tint: Tint, kind: ParticleKind) -> Self {
        Self {
            pos,
            vel,
            size,
            life,
            tint,
            rotation: 0.0,
            rot_speed: 0.0,
            kind,
        }
    }
}

impl Validate for Particle {
    const POOL: &'static str = "particle";

    fn key(&self, index: usize) -> u32 {
        index as u32
    }

    fn is_well_formed(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

// === Dismemberment ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganKind {
    Heart,
    Lung,
    Liver,
    Eye,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfKind {
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartShape {
    MeatChunk,
    Organ(OrganKind),
    /// Long organic part drawn as a bezier chain
    Entrail { segments: u8 },
    HalfBody(HalfKind),
}

/// Decorative drip hanging from a detached part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodDrip {
    pub offset: Vec2,
    pub length: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetachedPart {
    pub id: u32,
    /// Center of the part
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub rot_speed: f32,
    pub shape: PartShape,
    pub on_ground: bool,
    /// Remaining life in frames
    pub life: f32,
    pub drips: Vec<BloodDrip>,
}

impl Validate for DetachedPart {
    const POOL: &'static str = "detached part";

    fn key(&self, _index: usize) -> u32 {
        self.id
    }

    fn is_well_formed(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.rotation.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecalShape {
    Pool,
    Splatter,
    Smear,
}

/// Permanent floor stain; `pos.y` is always the floor line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundDecal {
    pub pos: Vec2,
    pub size: Vec2,
    pub alpha: f32,
    pub tint: Tint,
    pub shape: DecalShape,
}

// === Allies ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllyState {
    Seeking,
    Attacking { frames_left: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlliedUnit {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    /// Weak reference: enemy id, re-resolved every frame
    pub target: Option<u32>,
    pub state: AllyState,
    pub attack_cooldown: i32,
    pub jump_cooldown: i32,
    pub created_at_ms: f64,
    pub lifespan_ms: f64,
}

impl AlliedUnit {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_at_ms > self.lifespan_ms
    }
}

impl Validate for AlliedUnit {
    const POOL: &'static str = "ally";

    fn key(&self, _index: usize) -> u32 {
        self.id
    }

    fn is_well_formed(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite()
    }
}

// === Short-lived overlays ===

/// White cut line left by a knife
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlashLine {
    pub from: Vec2,
    pub to: Vec2,
    pub life: f32,
    pub alpha: f32,
}

/// Speech text that floats away from a sliced enemy
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingSpeech {
    pub text: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub alpha: f32,
}

// === Player ===

/// The player's turret, hanging from the top edge
#[derive(Debug, Clone, PartialEq)]
pub struct Turret {
    /// Center of the top edge
    pub pos: Vec2,
    pub size: Vec2,
    pub gun_length: f32,
    pub gun_width: f32,
    pub aim_angle: f32,
}

impl Turret {
    pub fn new(width: f32) -> Self {
        Self {
            pos: Vec2::new(width / 2.0, TURRET_Y),
            size: Vec2::new(TURRET_WIDTH, TURRET_HEIGHT),
            gun_length: GUN_LENGTH,
            gun_width: GUN_WIDTH,
            aim_angle: std::f32::consts::FRAC_PI_2,
        }
    }

    /// Point the gun rotates around
    pub fn pivot(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y + self.size.y / 3.0)
    }

    /// Angle from the pivot to `target`
    pub fn angle_to(&self, target: Vec2) -> f32 {
        let d = target - self.pivot();
        d.y.atan2(d.x)
    }

    /// Barrel tip for a given heading
    pub fn muzzle(&self, angle: f32) -> Vec2 {
        self.pivot() + Vec2::new(angle.cos(), angle.sin()) * self.gun_length
    }

    pub fn aim_at(&mut self, target: Vec2) {
        let angle = self.angle_to(target);
        if angle.is_finite() {
            self.aim_angle = angle;
        }
    }
}

/// Spawner bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnClock {
    pub last_spawn_ms: f64,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Play-area size in surface pixels
    pub width: f32,
    pub height: f32,
    pub tuning: Tuning,
    pub turret: Turret,
    pub arsenal: Arsenal,
    pub spawn_clock: SpawnClock,

    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub explosions: Vec<Explosion>,
    pub waves: Vec<ShatterWave>,
    pub flashes: Vec<Flash>,
    pub particles: Vec<Particle>,
    pub parts: Vec<DetachedPart>,
    pub allies: Vec<AlliedUnit>,
    pub decals: Vec<GroundDecal>,
    pub slashes: Vec<SlashLine>,
    pub floating_speech: Vec<FloatingSpeech>,

    /// Staggered cosmetic spawns
    pub deferred: DeferredQueue,
    /// Events for the host, drained once per frame
    pub events: Vec<GameEvent>,
    /// Live particle cap (from settings)
    pub particle_cap: usize,
    /// Frames simulated so far
    pub frame: u64,
    pub rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with default tuning
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        Self::with_tuning(seed, width, height, Tuning::default())
    }

    pub fn with_tuning(seed: u64, width: f32, height: f32, tuning: Tuning) -> Self {
        Self {
            width,
            height,
            tuning,
            turret: Turret::new(width),
            arsenal: Arsenal::default(),
            spawn_clock: SpawnClock::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            explosions: Vec::new(),
            waves: Vec::new(),
            flashes: Vec::new(),
            particles: Vec::new(),
            parts: Vec::new(),
            allies: Vec::new(),
            decals: Vec::new(),
            slashes: Vec::new(),
            floating_speech: Vec::new(),
            deferred: DeferredQueue::default(),
            events: Vec::new(),
            particle_cap: Settings::default().max_particles(),
            frame: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Surface resized: bounds change, existing entities stay where they are
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.turret.pos.x = width / 2.0;
        log::info!("Play area resized to {}x{}", width, height);
    }

    /// Floor line (y of the bottom edge)
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.height
    }

    pub fn bounds_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Index of a live enemy by id
    pub fn live_enemy_index(&self, id: u32) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id && e.is_live())
    }

    /// Add a spawned enemy, returning its id
    pub fn insert_enemy(&mut self, pos: Vec2, size: f32, vy: f32) -> u32 {
        let id = self.next_entity_id();
        let hp = self.tuning.enemy_hp;
        self.enemies
            .push(Enemy::new(id, pos, Vec2::splat(size), vy, hp));
        id
    }

    /// Pick up preference changes that affect the simulation
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.particle_cap = settings.max_particles();
        if self.particles.len() > self.particle_cap {
            let excess = self.particles.len() - self.particle_cap;
            self.particles.drain(..excess);
        }
    }

    pub fn sound(&mut self, effect: SoundEffect) {
        self.events.push(GameEvent::Sound(effect));
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
