//! Per-frame integration for every moving population
//!
//! All quantities are per frame: gravity is added to velocity once per
//! call, velocity to position once per call.

use glam::Vec2;
use rand::Rng;

use super::geometry::out_of_bounds;
use super::gore;
use super::state::{
    DecalShape, GameState, Particle, ParticleKind, Projectile, ProjectileKind, Tint,
};
use crate::consts::*;
use crate::error::SimResult;
use crate::rand_between;

/// Outcome of advancing one projectile by a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Still travelling inside the play area
    Flying,
    /// Left the play area; remove it
    OutOfBounds,
    /// Wrecking ball touched a wall and/or the floor this frame
    Bounced {
        /// Contact point on the floor, if the floor was hit
        floor_contact: Option<Vec2>,
        /// Bounce budget used up; remove it
        spent: bool,
    },
}

/// Advance a projectile's own motion
pub fn advance_projectile(p: &mut Projectile, width: f32, height: f32) -> Advance {
    match &mut p.kind {
        ProjectileKind::BouncingHeavy {
            bounces,
            max_bounces,
            damage_stage,
            gravity,
            bounce_damping,
        } => {
            p.vel.y += *gravity;
            p.pos += p.vel;

            let mut contact = false;
            let mut floor_contact = None;

            if p.pos.x < 0.0 && p.vel.x < 0.0 {
                p.pos.x = 0.0;
                p.vel.x = -p.vel.x * *bounce_damping;
                *bounces += 1;
                contact = true;
            } else if p.pos.x + p.size.x > width && p.vel.x > 0.0 {
                p.pos.x = width - p.size.x;
                p.vel.x = -p.vel.x * *bounce_damping;
                *bounces += 1;
                contact = true;
            }

            if p.pos.y + p.size.y >= height && p.vel.y > 0.0 {
                p.pos.y = height - p.size.y;
                p.vel.y = -p.vel.y * *bounce_damping;
                p.vel.x *= 0.9;
                *bounces += 1;
                contact = true;
                floor_contact = Some(Vec2::new(p.pos.x + p.size.x * 0.5, height));
            }

            // Visual wear only; physics ignores it
            *damage_stage = (*bounces).min(3) as u8;

            if contact {
                Advance::Bounced {
                    floor_contact,
                    spent: *bounces >= *max_bounces,
                }
            } else {
                Advance::Flying
            }
        }
        kind => {
            p.pos += p.vel;
            match kind {
                ProjectileKind::Piercing {
                    rotation,
                    rotation_speed,
                    ..
                } => *rotation += *rotation_speed,
                ProjectileKind::Transforming { pulse } => *pulse += 0.15,
                _ => {}
            }
            if out_of_bounds(p.pos, width, height) {
                Advance::OutOfBounds
            } else {
                Advance::Flying
            }
        }
    }
}

/// Gravity, floor hops, wobble and speech timers for every enemy
pub fn step_enemies(state: &mut GameState, now_ms: f64) -> SimResult<()> {
    let GameState {
        enemies,
        rng,
        tuning,
        width,
        height,
        ..
    } = state;
    let floor = *height;

    for e in enemies.iter_mut() {
        e.vy += tuning.gravity;
        e.pos.y += e.vy;

        let rest_y = floor - e.size.y;
        if e.pos.y >= rest_y {
            e.pos.y = rest_y;
            if e.jump_cooldown <= 0 {
                e.vy = -rng.random::<f32>() * tuning.enemy_jump_impulse;
                e.jump_cooldown = tuning.enemy_jump_cooldown;
            } else {
                e.vy = 0.0;
                e.jump_cooldown -= 1;
            }
        }

        let phase = now_ms * DRIFT_TIME_SCALE + e.pos.y as f64;
        e.pos.x += phase.sin() as f32 * tuning.enemy_drift;
        e.pos.x = e.pos.x.clamp(0.0, (*width - e.size.x).max(0.0));

        if let Some(speech) = &mut e.speech {
            speech.timer -= 1;
            if now_ms - speech.toggled_at_ms > tuning.speech_toggle_ms {
                speech.visible = !speech.visible;
                speech.toggled_at_ms = now_ms;
            }
            if speech.timer <= 0 && rng.random::<f32>() < 0.01 {
                speech.timer = rng.random_range(200..500);
            }
        }
    }
    Ok(())
}

/// Gravity and drag for particles; blood that lands stains the floor
pub fn step_particles(state: &mut GameState) -> SimResult<()> {
    let floor = state.floor_y();
    let mut stains: Vec<(f32, f32)> = Vec::new();

    let GameState { particles, rng, .. } = state;
    particles.retain_mut(|p| {
        p.vel.y += PARTICLE_GRAVITY;
        p.vel *= PARTICLE_DRAG;
        p.pos += p.vel;
        p.rotation += p.rot_speed;
        p.life -= 1.0;

        if p.pos.y >= floor {
            match p.kind {
                ParticleKind::Splat => {
                    stains.push((p.pos.x, p.size * 3.0));
                    return false;
                }
                ParticleKind::Blood => {
                    if rng.random::<f32>() < 0.2 {
                        stains.push((p.pos.x, p.size * 2.0));
                    }
                    return false;
                }
                ParticleKind::Plain | ParticleKind::Feather => {}
            }
        }
        p.life > 0.0
    });

    for (x, w) in stains {
        gore::stain(state, x, Vec2::new(w, w * 0.35), DecalShape::Splatter);
    }
    Ok(())
}

/// Detached parts: airborne drips, one-shot landing, resting friction, expiry
pub fn step_parts(state: &mut GameState) -> SimResult<()> {
    let (width, height) = (state.width, state.height);
    let floor = state.floor_y();
    let mut drips: Vec<Particle> = Vec::new();
    let mut smears: Vec<(f32, f32)> = Vec::new();

    let GameState { parts, rng, .. } = state;
    parts.retain_mut(|part| {
        part.vel.y += PART_GRAVITY;
        part.vel *= PART_DRAG;
        part.pos += part.vel;
        part.rotation += part.rot_speed;

        let half_h = part.size.y * 0.5;
        let touching = part.pos.y + half_h >= floor;

        if !part.on_ground {
            if touching {
                part.on_ground = true;
                part.pos.y = floor - half_h;
                part.vel.y = -part.vel.y * PART_GROUND_BOUNCE;
                part.vel.x *= 0.5;
                part.rot_speed *= 0.3;
                smears.push((part.pos.x, part.size.x));
            } else if rng.random::<f32>() < 0.3 {
                drips.push(Particle::new(
                    part.pos,
                    Vec2::new(part.vel.x * 0.5, rand_between(rng, 1.0, 3.0)),
                    rand_between(rng, 2.0, 4.0),
                    rand_between(rng, 20.0, 40.0),
                    Tint::Blood,
                    ParticleKind::Blood,
                ));
            }
        } else {
            if touching {
                part.pos.y = floor - half_h;
                if part.vel.y > 0.0 {
                    part.vel.y = -part.vel.y * PART_GROUND_BOUNCE;
                }
            }
            part.vel.x *= 0.9;
            part.rot_speed *= 0.9;
        }

        part.life -= 1.0;
        let off_screen = part.pos.x < -PART_CULL_MARGIN
            || part.pos.x > width + PART_CULL_MARGIN
            || part.pos.y > height + PART_CULL_MARGIN;
        part.life > 0.0 && !off_screen
    });

    for drip in drips {
        gore::push_particle(state, drip);
    }
    for (x, w) in smears {
        gore::stain(state, x, Vec2::new(w * 1.2, w * 0.2), DecalShape::Smear);
    }
    gore::enforce_part_cap(state);
    Ok(())
}

/// Slash lines, floating speech and conversion flashes
pub fn step_overlays(state: &mut GameState) -> SimResult<()> {
    state.slashes.retain_mut(|slash| {
        slash.life -= 1.0;
        slash.alpha -= 0.1;
        slash.life > 0.0
    });

    state.floating_speech.retain_mut(|speech| {
        speech.pos += speech.vel;
        speech.life -= 1.0;
        speech.alpha = (speech.life / FLOATING_SPEECH_LIFE).max(0.0);
        speech.life > 0.0
    });

    state.flashes.retain_mut(|flash| {
        flash.radius += flash.growth;
        flash.alpha -= 0.05;
        !flash.is_spent()
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{DetachedPart, PartShape};

    fn heavy(pos: Vec2, vel: Vec2, max_bounces: u32) -> Projectile {
        let mut p = Projectile::new(
            1,
            pos,
            0.0,
            0.0,
            Vec2::splat(24.0),
            ProjectileKind::BouncingHeavy {
                bounces: 0,
                max_bounces,
                damage_stage: 0,
                gravity: 0.4,
                bounce_damping: 0.7,
            },
        );
        p.vel = vel;
        p
    }

    #[test]
    fn test_basic_projectile_leaves_bounds() {
        let mut p = Projectile::new(1, Vec2::new(795.0, 100.0), 0.0, 12.0, Vec2::splat(4.0), ProjectileKind::Basic);
        assert_eq!(advance_projectile(&mut p, 800.0, 600.0), Advance::OutOfBounds);

        let mut p = Projectile::new(2, Vec2::new(100.0, 100.0), 0.0, 12.0, Vec2::splat(4.0), ProjectileKind::Basic);
        assert_eq!(advance_projectile(&mut p, 800.0, 600.0), Advance::Flying);
        assert!((p.pos.x - 112.0).abs() < 1e-4);
    }

    #[test]
    fn test_knife_spins() {
        let mut p = Projectile::new(
            1,
            Vec2::new(100.0, 100.0),
            0.0,
            15.0,
            Vec2::new(20.0, 5.0),
            ProjectileKind::Piercing {
                hits: 0,
                max_hits: 3,
                rotation: 0.0,
                rotation_speed: 0.5,
            },
        );
        advance_projectile(&mut p, 800.0, 600.0);
        advance_projectile(&mut p, 800.0, 600.0);
        match p.kind {
            ProjectileKind::Piercing { rotation, .. } => assert!((rotation - 1.0).abs() < 1e-5),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_heavy_wall_bounce_reflects_and_damps() {
        let mut p = heavy(Vec2::new(790.0, 100.0), Vec2::new(10.0, 0.0), 4);
        let result = advance_projectile(&mut p, 800.0, 600.0);
        assert_eq!(
            result,
            Advance::Bounced {
                floor_contact: None,
                spent: false
            }
        );
        assert!((p.vel.x + 7.0).abs() < 1e-4);
        assert_eq!(p.pos.x, 776.0);
        match p.kind {
            ProjectileKind::BouncingHeavy {
                bounces,
                damage_stage,
                ..
            } => {
                assert_eq!(bounces, 1);
                assert_eq!(damage_stage, 1);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_heavy_floor_bounce_reports_contact() {
        let mut p = heavy(Vec2::new(400.0, 570.0), Vec2::new(2.0, 10.0), 4);
        match advance_projectile(&mut p, 800.0, 600.0) {
            Advance::Bounced {
                floor_contact: Some(at),
                spent: false,
            } => assert_eq!(at.y, 600.0),
            other => panic!("unexpected {:?}", other),
        }
        assert!(p.vel.y < 0.0);
        assert_eq!(p.pos.y, 576.0);
    }

    #[test]
    fn test_heavy_spent_at_max_bounces() {
        let mut p = heavy(Vec2::new(400.0, 570.0), Vec2::new(0.0, 10.0), 1);
        assert!(matches!(
            advance_projectile(&mut p, 800.0, 600.0),
            Advance::Bounced { spent: true, .. }
        ));
    }

    #[test]
    fn test_enemy_hops_from_floor() {
        let mut state = GameState::new(3, 800.0, 600.0);
        state.insert_enemy(Vec2::new(100.0, 600.0), 20.0, 0.0);
        step_enemies(&mut state, 0.0).unwrap();
        let e = &state.enemies[0];
        assert_eq!(e.pos.y, 580.0);
        assert!(e.vy <= 0.0);
        assert_eq!(e.jump_cooldown, state.tuning.enemy_jump_cooldown);
    }

    #[test]
    fn test_enemy_clamped_horizontally() {
        let mut state = GameState::new(3, 800.0, 600.0);
        state.insert_enemy(Vec2::new(2000.0, 100.0), 20.0, 0.0);
        step_enemies(&mut state, 1234.0).unwrap();
        assert!(state.enemies[0].pos.x <= 780.0);
    }

    #[test]
    fn test_particles_expire() {
        let mut state = GameState::new(3, 800.0, 600.0);
        state.particles.push(Particle::new(
            Vec2::new(100.0, 100.0),
            Vec2::ZERO,
            2.0,
            3.0,
            Tint::Debris,
            ParticleKind::Plain,
        ));
        for _ in 0..3 {
            step_particles(&mut state).unwrap();
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_splat_particle_becomes_decal() {
        let mut state = GameState::new(3, 800.0, 600.0);
        state.particles.push(Particle::new(
            Vec2::new(100.0, 599.0),
            Vec2::new(0.0, 5.0),
            4.0,
            100.0,
            Tint::DarkBlood,
            ParticleKind::Splat,
        ));
        step_particles(&mut state).unwrap();
        assert!(state.particles.is_empty());
        assert_eq!(state.decals.len(), 1);
        assert_eq!(state.decals[0].pos.y, 600.0);
    }

    #[test]
    fn test_part_lands_exactly_once() {
        let mut state = GameState::new(3, 800.0, 600.0);
        state.parts.push(DetachedPart {
            id: 1,
            pos: Vec2::new(400.0, 590.0),
            vel: Vec2::new(1.0, 8.0),
            size: Vec2::splat(10.0),
            rotation: 0.0,
            rot_speed: 0.2,
            shape: PartShape::MeatChunk,
            on_ground: false,
            life: 500.0,
            drips: Vec::new(),
        });
        step_parts(&mut state).unwrap();
        assert!(state.parts[0].on_ground);
        let smears = state.decals.len();
        assert_eq!(smears, 1);
        for _ in 0..50 {
            step_parts(&mut state).unwrap();
        }
        assert!(state.parts[0].on_ground);
        assert_eq!(state.decals.len(), smears);
        assert!(state.parts[0].pos.y <= 595.0 + 1e-3);
    }

    #[test]
    fn test_overlays_fade_out() {
        let mut state = GameState::new(3, 800.0, 600.0);
        gore::conversion_burst(&mut state, Vec2::new(10.0, 10.0));
        for _ in 0..20 {
            step_overlays(&mut state).unwrap();
        }
        assert!(state.flashes.is_empty());
    }
}
