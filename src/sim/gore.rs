//! Gore and effect creation
//!
//! Pure creators: each takes a center/size/intensity and appends particles,
//! detached parts, decals or flashes. They never look at enemies or
//! projectiles, only at the play-area bounds and population caps, so any
//! damage site can call them.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;

use super::state::{
    BloodDrip, DecalShape, DetachedPart, Enemy, FloatingSpeech, Flash, GameState, GroundDecal,
    HalfKind, OrganKind, PartShape, Particle, ParticleKind, SlashLine, Tint,
};
use crate::audio::SoundEffect;
use crate::consts::FLOATING_SPEECH_LIFE;
use crate::{jitter, rand_between, rand_count};

/// Append a particle, evicting the oldest tenth of the pool when full
pub fn push_particle(state: &mut GameState, particle: Particle) {
    let cap = state.particle_cap;
    if cap == 0 {
        return;
    }
    if state.particles.len() >= cap {
        let evict = (cap / 10).max(1).min(state.particles.len());
        state.particles.drain(..evict);
    }
    state.particles.push(particle);
}

/// Keep detached parts at or under the cap (oldest evicted in one batch)
pub fn enforce_part_cap(state: &mut GameState) {
    let cap = state.tuning.max_detached_parts;
    let len = state.parts.len();
    if len > cap {
        let evict = state.tuning.detached_part_evict.max(len - cap).min(len);
        state.parts.drain(..evict);
    }
}

/// Keep ground decals at or under the cap (oldest evicted in one batch)
pub fn enforce_decal_cap(state: &mut GameState) {
    let cap = state.tuning.max_ground_decals;
    let len = state.decals.len();
    if len > cap {
        let evict = state.tuning.ground_decal_evict.max(len - cap).min(len);
        state.decals.drain(..evict);
    }
}

/// Small spray of blood droplets; droplet count scales with `size`
pub fn blood_burst(state: &mut GameState, center: Vec2, size: f32) {
    let count = (size.max(0.0) * 1.5) as usize;
    for _ in 0..count {
        let mut p = Particle::new(
            center,
            Vec2::new(
                jitter(&mut state.rng, 2.5),
                jitter(&mut state.rng, 2.5) - 1.0,
            ),
            rand_between(&mut state.rng, 2.0, 5.0),
            rand_between(&mut state.rng, 30.0, 50.0),
            Tint::Blood,
            ParticleKind::Blood,
        );
        p.rotation = rand_between(&mut state.rng, 0.0, TAU);
        p.rot_speed = jitter(&mut state.rng, 0.05);
        push_particle(state, p);
    }
}

/// Big radial gush used on kills
pub fn juice(state: &mut GameState, center: Vec2) {
    let count = rand_count(&mut state.rng, 60, 99);
    for _ in 0..count {
        let p = Particle::new(
            center,
            Vec2::new(jitter(&mut state.rng, 5.0), jitter(&mut state.rng, 5.0)),
            rand_between(&mut state.rng, 2.0, 6.0),
            rand_between(&mut state.rng, 40.0, 80.0),
            Tint::Blood,
            ParticleKind::Plain,
        );
        push_particle(state, p);
    }
}

/// Feathers drifting out of an exploded enemy
pub fn feathers(state: &mut GameState, center: Vec2) {
    let count = rand_count(&mut state.rng, 20, 39);
    for _ in 0..count {
        let tint = if state.rng.random::<f32>() > 0.3 {
            Tint::Feather
        } else {
            Tint::FeatherDark
        };
        let mut p = Particle::new(
            center,
            Vec2::new(
                jitter(&mut state.rng, 3.0),
                jitter(&mut state.rng, 3.0) - 2.0,
            ),
            rand_between(&mut state.rng, 3.0, 6.0),
            rand_between(&mut state.rng, 60.0, 120.0),
            tint,
            ParticleKind::Feather,
        );
        p.rotation = rand_between(&mut state.rng, 0.0, TAU);
        p.rot_speed = jitter(&mut state.rng, 0.1);
        push_particle(state, p);
    }
}

fn random_drips(state: &mut GameState, size: Vec2) -> Vec<BloodDrip> {
    let count = rand_count(&mut state.rng, 1, 3);
    (0..count)
        .map(|_| BloodDrip {
            offset: Vec2::new(
                jitter(&mut state.rng, size.x * 0.4),
                size.y * 0.5,
            ),
            length: rand_between(&mut state.rng, 2.0, 6.0),
        })
        .collect()
}

fn launch_part(state: &mut GameState, center: Vec2, size: Vec2, shape: PartShape, spread: f32) {
    let id = state.next_entity_id();
    let vel = Vec2::new(
        jitter(&mut state.rng, spread),
        -rand_between(&mut state.rng, 3.0, 3.0 + spread * 1.5),
    );
    let life = state.tuning.part_life * rand_between(&mut state.rng, 0.8, 1.2);
    let drips = random_drips(state, size);
    let part = DetachedPart {
        id,
        pos: center,
        vel,
        size,
        rotation: rand_between(&mut state.rng, 0.0, TAU),
        rot_speed: jitter(&mut state.rng, 0.3),
        shape,
        on_ground: false,
        life,
        drips,
    };
    state.parts.push(part);
}

/// Blow an enemy-sized body apart: chunks, organs, maybe entrails, splats
///
/// `intensity` (0..=1) scales part count and launch speed.
pub fn dismember(state: &mut GameState, center: Vec2, size: f32, intensity: f32) {
    let intensity = intensity.clamp(0.0, 1.0);
    let spread = 2.0 + intensity * 4.0;

    let chunks = rand_count(&mut state.rng, 2, 4) + (intensity * 3.0) as usize;
    for _ in 0..chunks {
        let s = size * rand_between(&mut state.rng, 0.15, 0.3);
        let chunk_size = Vec2::new(s, s * rand_between(&mut state.rng, 0.6, 1.0));
        launch_part(state, center, chunk_size, PartShape::MeatChunk, spread);
    }

    let organs = rand_count(&mut state.rng, 1, 2);
    for _ in 0..organs {
        let organ = match state.rng.random_range(0..4) {
            0 => OrganKind::Heart,
            1 => OrganKind::Lung,
            2 => OrganKind::Liver,
            _ => OrganKind::Eye,
        };
        let s = size * if organ == OrganKind::Eye { 0.12 } else { 0.25 };
        launch_part(state, center, Vec2::splat(s), PartShape::Organ(organ), spread);
    }

    if state.rng.random::<f32>() < 0.5 * intensity {
        let segments = rand_count(&mut state.rng, 3, 6) as u8;
        launch_part(
            state,
            center,
            Vec2::new(size * 0.8, size * 0.12),
            PartShape::Entrail { segments },
            spread,
        );
    }
    enforce_part_cap(state);

    let splats = rand_count(&mut state.rng, 6, 10);
    for _ in 0..splats {
        let p = Particle::new(
            center,
            Vec2::new(
                jitter(&mut state.rng, spread),
                -rand_between(&mut state.rng, 1.0, 5.0),
            ),
            rand_between(&mut state.rng, 3.0, 6.0),
            rand_between(&mut state.rng, 60.0, 120.0),
            Tint::DarkBlood,
            ParticleKind::Splat,
        );
        push_particle(state, p);
    }

    ground_splat(state, center.x, size);
    state.sound(SoundEffect::Splat);
}

/// Knife cut: cut line, directional spray, two halves, floating speech
pub fn slash(state: &mut GameState, enemy: &Enemy, angle: f32) {
    let (x, y) = (enemy.pos.x, enemy.pos.y);
    let (w, h) = (enemy.size.x, enemy.size.y);

    state.slashes.push(SlashLine {
        from: Vec2::new(x, y + h / 2.0 + angle.sin() * h),
        to: Vec2::new(x + w, y + h / 2.0 - angle.sin() * h),
        life: 10.0,
        alpha: 1.0,
    });

    // Spray perpendicular to the cut
    let perp = angle + PI / 2.0;
    let spray = (w * 2.0) as usize;
    for i in 0..spray {
        let t = i as f32 / spray as f32;
        let pos = Vec2::new(x + t * w, y + h / 2.0 + (angle + i as f32).sin() * (h / 2.0));
        let speed = rand_between(&mut state.rng, 1.0, 4.0);
        let vel = Vec2::new(perp.cos(), perp.sin()) * speed
            + Vec2::new(jitter(&mut state.rng, 1.0), jitter(&mut state.rng, 1.0));
        let mut p = Particle::new(
            pos,
            vel,
            rand_between(&mut state.rng, 2.0, 5.0),
            rand_between(&mut state.rng, 40.0, 100.0),
            Tint::DarkBlood,
            ParticleKind::Blood,
        );
        p.rotation = rand_between(&mut state.rng, 0.0, TAU);
        p.rot_speed = jitter(&mut state.rng, 0.05);
        push_particle(state, p);
    }

    if let Some(speech) = &enemy.speech {
        if speech.visible {
            let vel = Vec2::new(
                rand_between(&mut state.rng, -1.0, 1.0),
                -rand_between(&mut state.rng, 2.0, 4.0),
            );
            state.floating_speech.push(FloatingSpeech {
                text: speech.text.clone(),
                pos: Vec2::new(x + w / 2.0, y - 30.0),
                vel,
                life: FLOATING_SPEECH_LIFE,
                alpha: 1.0,
            });
        }
    }

    let half = Vec2::new(w, h / 2.0);
    for (kind, offset, vel) in [
        (
            HalfKind::Upper,
            h * 0.25,
            Vec2::new(
                rand_between(&mut state.rng, -1.0, 1.0),
                -rand_between(&mut state.rng, 4.0, 6.0),
            ),
        ),
        (
            HalfKind::Lower,
            h * 0.75,
            Vec2::new(
                rand_between(&mut state.rng, 1.0, 3.0),
                rand_between(&mut state.rng, 2.0, 5.0),
            ),
        ),
    ] {
        let id = state.next_entity_id();
        let drips = random_drips(state, half);
        let spin = rand_between(&mut state.rng, 0.05, 0.15);
        let life = state.tuning.part_life;
        state.parts.push(DetachedPart {
            id,
            pos: Vec2::new(x + w / 2.0, y + offset),
            vel,
            size: half,
            rotation: if kind == HalfKind::Upper { -0.1 } else { 0.1 },
            rot_speed: if kind == HalfKind::Upper { -spin } else { spin },
            shape: PartShape::HalfBody(kind),
            on_ground: false,
            life,
            drips,
        });
    }
    enforce_part_cap(state);
    state.sound(SoundEffect::Slash);
}

/// A few stains on the floor around `x`; always anchored at the floor line
pub fn ground_splat(state: &mut GameState, x: f32, size: f32) {
    let count = rand_count(&mut state.rng, 2, 4);
    for _ in 0..count {
        let shape = if state.rng.random_bool(0.6) {
            DecalShape::Pool
        } else {
            DecalShape::Splatter
        };
        let dx = jitter(&mut state.rng, size);
        let w = size * rand_between(&mut state.rng, 0.6, 1.4);
        let h = w * rand_between(&mut state.rng, 0.25, 0.4);
        stain(state, x + dx, Vec2::new(w, h), shape);
    }
}

/// Single decal at the floor line
pub fn stain(state: &mut GameState, x: f32, size: Vec2, shape: DecalShape) {
    let tint = if state.rng.random_bool(0.5) {
        Tint::Blood
    } else {
        Tint::DarkBlood
    };
    let alpha = rand_between(&mut state.rng, 0.6, 0.9);
    let decal = GroundDecal {
        pos: Vec2::new(x.clamp(0.0, state.width), state.floor_y()),
        size,
        alpha,
        tint,
        shape,
    };
    state.decals.push(decal);
    enforce_decal_cap(state);
}

/// Radial shower of debris particles
pub fn debris_burst(state: &mut GameState, center: Vec2, count: usize) {
    for _ in 0..count {
        let dir = rand_between(&mut state.rng, 0.0, TAU);
        let speed = rand_between(&mut state.rng, 2.0, 8.0);
        let mut p = Particle::new(
            center,
            Vec2::new(dir.cos(), dir.sin()) * speed,
            rand_between(&mut state.rng, 2.0, 5.0),
            rand_between(&mut state.rng, 40.0, 80.0),
            Tint::Debris,
            ParticleKind::Plain,
        );
        p.rot_speed = jitter(&mut state.rng, 0.2);
        push_particle(state, p);
    }
}

/// Glowing ring of particles plus a flash where an enemy was converted
pub fn conversion_burst(state: &mut GameState, center: Vec2) {
    const RAYS: usize = 30;
    for i in 0..RAYS {
        let dir = i as f32 / RAYS as f32 * TAU;
        let speed = rand_between(&mut state.rng, 3.0, 6.0);
        let p = Particle::new(
            center,
            Vec2::new(dir.cos(), dir.sin()) * speed,
            rand_between(&mut state.rng, 2.0, 4.0),
            rand_between(&mut state.rng, 30.0, 50.0),
            Tint::Glow,
            ParticleKind::Plain,
        );
        push_particle(state, p);
    }
    state.flashes.push(Flash {
        center,
        radius: 10.0,
        max_radius: 80.0,
        growth: 6.0,
        alpha: 1.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(42, 800.0, 600.0)
    }

    #[test]
    fn test_blood_burst_count_scales_with_size() {
        let mut s = state();
        blood_burst(&mut s, Vec2::new(100.0, 100.0), 10.0);
        assert_eq!(s.particles.len(), 15);
        assert!(s.particles.iter().all(|p| p.kind == ParticleKind::Blood));
    }

    #[test]
    fn test_particle_cap_evicts_oldest() {
        let mut s = state();
        s.particle_cap = 50;
        debris_burst(&mut s, Vec2::ZERO, 200);
        assert!(s.particles.len() <= 50);

        s.particle_cap = 0;
        s.particles.clear();
        juice(&mut s, Vec2::ZERO);
        assert!(s.particles.is_empty());
    }

    #[test]
    fn test_ground_decals_anchor_to_floor() {
        let mut s = state();
        ground_splat(&mut s, 200.0, 30.0);
        assert!(!s.decals.is_empty());
        assert!(s.decals.iter().all(|d| d.pos.y == 600.0));
    }

    #[test]
    fn test_decal_cap() {
        let mut s = state();
        for i in 0..150 {
            ground_splat(&mut s, i as f32, 10.0);
            assert!(s.decals.len() <= s.tuning.max_ground_decals);
        }
    }

    #[test]
    fn test_dismember_respects_part_cap() {
        let mut s = state();
        for _ in 0..60 {
            dismember(&mut s, Vec2::new(400.0, 300.0), 40.0, 1.0);
            assert!(s.parts.len() <= s.tuning.max_detached_parts);
        }
        assert!(s.parts.iter().any(|p| matches!(p.shape, PartShape::Organ(_))));
    }

    #[test]
    fn test_slash_creates_two_halves_and_speech() {
        let mut s = state();
        let mut enemy = Enemy::new(9, Vec2::new(100.0, 400.0), Vec2::splat(30.0), 0.0, 2.0);
        enemy.speech = Some(crate::sim::state::Speech {
            text: "hi".into(),
            timer: 100,
            toggled_at_ms: 0.0,
            visible: true,
        });
        slash(&mut s, &enemy, 0.3);
        let halves = s
            .parts
            .iter()
            .filter(|p| matches!(p.shape, PartShape::HalfBody(_)))
            .count();
        assert_eq!(halves, 2);
        assert_eq!(s.slashes.len(), 1);
        assert_eq!(s.floating_speech.len(), 1);
        assert_eq!(s.particles.len(), 60);
    }

    #[test]
    fn test_conversion_burst_adds_flash() {
        let mut s = state();
        conversion_burst(&mut s, Vec2::new(50.0, 50.0));
        assert_eq!(s.flashes.len(), 1);
        assert_eq!(s.particles.len(), 30);
    }
}
