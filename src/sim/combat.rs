//! Collision and damage resolution
//!
//! Projectiles are resolved newest-first against enemies newest-first, and a
//! projectile affects at most one enemy per frame. Area effects (explosions,
//! shatter waves) damage everything in range and may stack on top.

use glam::Vec2;

use super::ally;
use super::geometry::{aabb_overlap, within_radius};
use super::gore;
use super::motion::{self, Advance};
use super::schedule::Deferred;
use super::state::{BloodMark, DamageSource, Explosion, GameEvent, GameState, ProjectileKind, ShatterWave};
use crate::audio::SoundEffect;
use crate::consts::UPGRADE_EXPLOSION_RADIUS;
use crate::error::SimResult;
use crate::rand_between;

/// Wounds drawn per enemy are capped
const MAX_BLOOD_MARKS: usize = 8;

/// Add an explosion at `center`
pub fn spawn_explosion(state: &mut GameState, center: Vec2, max_radius: f32) {
    let explosion = Explosion::new(center, max_radius, &state.tuning);
    state.explosions.push(explosion);
    state.sound(SoundEffect::Explosion);
}

/// Death sequence for the enemy at `index`; returns its id
///
/// Area-capable sources finish the body with a large explosion and
/// feathers, everything else with a blood burst and a gush. Dismemberment,
/// decals, two delayed blood bursts and a late floor splat follow in every
/// case.
pub fn kill_enemy(state: &mut GameState, index: usize, source: DamageSource, now_ms: f64) -> Option<u32> {
    if index >= state.enemies.len() {
        return None;
    }
    let mut enemy = state.enemies.remove(index);
    enemy.dead = true;

    let center = enemy.center();
    let size = enemy.size.x;
    let area = source.is_area_capable();

    if area {
        spawn_explosion(state, center, size * 2.5);
        gore::feathers(state, center);
    } else {
        gore::blood_burst(state, center, size * 1.5);
        gore::juice(state, center);
    }
    gore::dismember(state, center, size, if area { 1.0 } else { 0.6 });

    state.deferred.push(
        now_ms + 120.0,
        Deferred::BloodBurst {
            center,
            size: size * 0.6,
        },
    );
    state.deferred.push(
        now_ms + 240.0,
        Deferred::BloodBurst {
            center: center + Vec2::new(0.0, size * 0.25),
            size: size * 0.4,
        },
    );
    // Late drip reaching the floor under the body
    state.deferred.push(
        now_ms + 360.0,
        Deferred::GroundSplat {
            x: center.x,
            size: size * 0.5,
        },
    );

    state.arsenal.record_kill();
    state.events.push(GameEvent::EnemyKilled {
        id: enemy.id,
        source,
    });
    log::debug!(
        "Enemy {} killed by {:?} (kills: {})",
        enemy.id,
        source,
        state.arsenal.kills
    );
    Some(enemy.id)
}

/// Move every projectile and resolve its hit, newest first
pub fn step_projectiles(state: &mut GameState, now_ms: f64) -> SimResult<()> {
    let (width, height) = (state.width, state.height);

    let mut i = state.projectiles.len();
    while i > 0 {
        i -= 1;
        let mut projectile = state.projectiles[i];

        match motion::advance_projectile(&mut projectile, width, height) {
            Advance::OutOfBounds => {
                state.projectiles.remove(i);
                continue;
            }
            Advance::Bounced {
                floor_contact,
                spent,
            } => {
                if let Some(at) = floor_contact {
                    let wave = ShatterWave::new(at, &state.tuning);
                    state.waves.push(wave);
                    state.sound(SoundEffect::Shatter);
                }
                if spent {
                    let count = state.tuning.heavy_debris_count;
                    gore::debris_burst(state, projectile.center(), count);
                    state.projectiles.remove(i);
                    continue;
                }
            }
            Advance::Flying => {}
        }

        state.projectiles[i] = projectile;
        if resolve_hit(state, i, now_ms) {
            state.projectiles.remove(i);
        }
    }
    Ok(())
}

/// Apply the projectile at `index` to the first overlapping live enemy.
/// Returns true when the projectile is used up.
fn resolve_hit(state: &mut GameState, index: usize, now_ms: f64) -> bool {
    let projectile = state.projectiles[index];
    let hit_box = projectile.rect();
    let Some(target) = state
        .enemies
        .iter()
        .rposition(|e| e.is_live() && aabb_overlap(&hit_box, &e.rect()))
    else {
        return false;
    };

    match projectile.kind {
        ProjectileKind::Transforming { .. } => {
            ally::convert_enemy(state, target, now_ms);
            true
        }
        ProjectileKind::Piercing { max_hits, .. } => {
            let mut enemy = state.enemies.remove(target);
            enemy.slashed = true;
            gore::slash(state, &enemy, projectile.angle);
            state.arsenal.record_kill();
            state.events.push(GameEvent::EnemyKilled {
                id: enemy.id,
                source: DamageSource::Knife,
            });
            log::debug!("Enemy {} sliced", enemy.id);

            match &mut state.projectiles[index].kind {
                ProjectileKind::Piercing { hits, .. } => {
                    *hits += 1;
                    *hits >= max_hits
                }
                _ => true,
            }
        }
        kind => {
            let damage = kind.damage(&state.tuning);
            let mark = BloodMark {
                offset: Vec2::new(
                    rand_between(&mut state.rng, 0.2, 0.8),
                    rand_between(&mut state.rng, 0.2, 0.8),
                ),
                size: rand_between(&mut state.rng, 2.0, 4.0),
            };

            let enemy = &mut state.enemies[target];
            enemy.take_damage(damage);
            enemy.hit_count += 1;
            if enemy.blood_marks.len() < MAX_BLOOD_MARKS {
                enemy.blood_marks.push(mark);
            }
            let (center, hit_count, hp) = (enemy.center(), enemy.hit_count, enemy.hp);

            if matches!(kind, ProjectileKind::Basic) {
                let size = rand_between(&mut state.rng, 5.0, 10.0);
                gore::blood_burst(state, center, size);
            }

            if let Some(radius) = kind.explosion_radius() {
                spawn_explosion(state, center, radius);
            } else if hit_count >= 2 && state.arsenal.slot.is_upgraded() {
                spawn_explosion(state, center, UPGRADE_EXPLOSION_RADIUS);
            }

            if hp <= 0.0 {
                kill_enemy(state, target, kind.damage_source(), now_ms);
            }
            true
        }
    }
}

/// Grow or fade every explosion, then apply its area damage
pub fn step_explosions(state: &mut GameState, now_ms: f64) -> SimResult<()> {
    let fade = state.tuning.explosion_fade;

    let mut i = state.explosions.len();
    while i > 0 {
        i -= 1;
        let explosion = &mut state.explosions[i];
        if explosion.is_growing() {
            explosion.radius = (explosion.radius + explosion.growth).min(explosion.max_radius);
        } else {
            explosion.alpha -= fade;
        }
        if explosion.alpha <= 0.0 {
            state.explosions.remove(i);
            continue;
        }

        let (center, radius, damage) = (explosion.center, explosion.radius, explosion.damage);
        let mut j = state.enemies.len();
        while j > 0 {
            j -= 1;
            let enemy = &mut state.enemies[j];
            if !enemy.is_live() || !within_radius(center, radius, enemy.center()) {
                continue;
            }
            enemy.take_damage(damage);
            if enemy.hp <= 0.0 {
                // Blood-burst variant, so this never queues another explosion
                kill_enemy(state, j, DamageSource::Explosion, now_ms);
            }
        }
    }
    Ok(())
}

/// Expand shatter waves, knocking back or killing enemies inside them
pub fn step_shatter_waves(state: &mut GameState, now_ms: f64) -> SimResult<()> {
    let fade = state.tuning.wave_fade;
    let kill_power = state.tuning.wave_kill_power;
    let width = state.width;

    let mut i = state.waves.len();
    while i > 0 {
        i -= 1;
        let wave = &mut state.waves[i];
        if !wave.is_expanding() {
            wave.alpha -= fade;
            if wave.alpha <= 0.0 {
                state.waves.remove(i);
            }
            continue;
        }
        wave.radius = (wave.radius + wave.growth).min(wave.max_radius);
        let (center, radius) = (wave.center, wave.radius);

        let mut j = state.enemies.len();
        while j > 0 {
            j -= 1;
            let enemy = &mut state.enemies[j];
            if !enemy.is_live() {
                continue;
            }
            let distance = enemy.center().distance(center);
            if distance >= radius {
                continue;
            }
            let power = 1.0 - distance / radius;
            if power > kill_power || enemy.hp <= 1.0 {
                kill_enemy(state, j, DamageSource::ShatterWave, now_ms);
            } else {
                let side = if enemy.center().x < center.x { -1.0 } else { 1.0 };
                enemy.vy -= power * 1.5;
                enemy.pos.x = (enemy.pos.x + side * power * 2.0).clamp(0.0, (width - enemy.size.x).max(0.0));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Projectile;
    use crate::sim::weapon::WeaponSlot;

    fn state() -> GameState {
        GameState::new(21, 800.0, 600.0)
    }

    /// Enemy hovering mid-screen, out of reach of the floor
    fn enemy_at(state: &mut GameState, x: f32, y: f32, size: f32) -> u32 {
        state.insert_enemy(Vec2::new(x, y), size, 0.0)
    }

    fn shoot(state: &mut GameState, pos: Vec2, kind: ProjectileKind) {
        let id = state.next_entity_id();
        // Zero speed keeps the projectile where it was placed
        state
            .projectiles
            .push(Projectile::new(id, pos, 0.0, 0.0, Vec2::splat(6.0), kind));
    }

    #[test]
    fn test_basic_hit_damages_without_explosion() {
        let mut s = state();
        enemy_at(&mut s, 100.0, 100.0, 30.0);
        shoot(&mut s, Vec2::new(110.0, 110.0), ProjectileKind::Basic);
        step_projectiles(&mut s, 0.0).unwrap();
        assert!(s.projectiles.is_empty());
        assert_eq!(s.enemies[0].hp, 1.0);
        assert_eq!(s.enemies[0].hit_count, 1);
        assert_eq!(s.enemies[0].blood_marks.len(), 1);
        assert!(s.explosions.is_empty());
    }

    #[test]
    fn test_second_hit_with_upgraded_weapon_explodes() {
        let mut s = state();
        s.arsenal.slot = WeaponSlot::Knives;
        s.tuning.enemy_hp = 5.0;
        enemy_at(&mut s, 100.0, 100.0, 30.0);
        shoot(&mut s, Vec2::new(110.0, 110.0), ProjectileKind::Basic);
        step_projectiles(&mut s, 0.0).unwrap();
        assert!(s.explosions.is_empty());
        shoot(&mut s, Vec2::new(110.0, 110.0), ProjectileKind::Basic);
        step_projectiles(&mut s, 0.0).unwrap();
        assert_eq!(s.explosions.len(), 1);
        assert_eq!(s.explosions[0].max_radius, UPGRADE_EXPLOSION_RADIUS);
    }

    #[test]
    fn test_one_enemy_per_projectile() {
        let mut s = state();
        enemy_at(&mut s, 100.0, 100.0, 30.0);
        enemy_at(&mut s, 100.0, 100.0, 30.0);
        shoot(&mut s, Vec2::new(110.0, 110.0), ProjectileKind::Basic);
        step_projectiles(&mut s, 0.0).unwrap();
        let damaged = s.enemies.iter().filter(|e| e.hp < 2.0).count();
        assert_eq!(damaged, 1);
        // Newest enemy is hit first
        assert_eq!(s.enemies[1].hp, 1.0);
    }

    #[test]
    fn test_rocket_kill_uses_area_death() {
        let mut s = state();
        enemy_at(&mut s, 100.0, 100.0, 30.0);
        shoot(
            &mut s,
            Vec2::new(110.0, 110.0),
            ProjectileKind::AreaExplosive {
                explosion_radius: 80.0,
            },
        );
        step_projectiles(&mut s, 0.0).unwrap();
        assert!(s.enemies.is_empty());
        assert_eq!(s.arsenal.kills, 1);
        // Impact explosion plus the death explosion
        assert_eq!(s.explosions.len(), 2);
        assert!(s.particles.iter().any(|p| p.kind == crate::sim::state::ParticleKind::Feather));
        assert_eq!(s.deferred.len(), 3);
        assert!(s.events.iter().any(|e| matches!(
            e,
            GameEvent::EnemyKilled {
                source: DamageSource::Rocket,
                ..
            }
        )));
    }

    #[test]
    fn test_knife_slashes_up_to_max_hits() {
        let mut s = state();
        for _ in 0..4 {
            enemy_at(&mut s, 100.0, 100.0, 30.0);
        }
        shoot(
            &mut s,
            Vec2::new(110.0, 110.0),
            ProjectileKind::Piercing {
                hits: 0,
                max_hits: 3,
                rotation: 0.0,
                rotation_speed: 0.5,
            },
        );
        step_projectiles(&mut s, 0.0).unwrap();
        assert_eq!(s.enemies.len(), 3);
        assert_eq!(s.projectiles.len(), 1);
        step_projectiles(&mut s, 0.0).unwrap();
        step_projectiles(&mut s, 0.0).unwrap();
        assert_eq!(s.enemies.len(), 1);
        assert!(s.projectiles.is_empty());
        assert_eq!(s.arsenal.kills, 3);
    }

    #[test]
    fn test_converter_never_damages() {
        let mut s = state();
        enemy_at(&mut s, 100.0, 100.0, 30.0);
        shoot(&mut s, Vec2::new(110.0, 110.0), ProjectileKind::Transforming { pulse: 0.0 });
        step_projectiles(&mut s, 1000.0).unwrap();
        assert!(s.enemies.is_empty());
        assert_eq!(s.allies.len(), 1);
        assert_eq!(s.arsenal.kills, 0);
        assert!(s.projectiles.is_empty());
    }

    #[test]
    fn test_explosion_grows_then_fades() {
        let mut s = state();
        spawn_explosion(&mut s, Vec2::new(400.0, 300.0), 30.0);
        let mut last_radius = s.explosions[0].radius;
        let mut last_alpha = s.explosions[0].alpha;
        let mut frames = 0;
        while !s.explosions.is_empty() {
            step_explosions(&mut s, 0.0).unwrap();
            if let Some(ex) = s.explosions.first() {
                let grew = ex.radius > last_radius;
                let faded = ex.alpha < last_alpha;
                assert!(!(grew && faded));
                assert!(ex.radius >= last_radius);
                last_radius = ex.radius;
                last_alpha = ex.alpha;
            }
            frames += 1;
            assert!(frames < 100);
        }
    }

    #[test]
    fn test_explosion_kill_does_not_chain() {
        let mut s = state();
        enemy_at(&mut s, 385.0, 285.0, 30.0);
        s.enemies[0].hp = 1.0;
        spawn_explosion(&mut s, Vec2::new(400.0, 300.0), 30.0);
        step_explosions(&mut s, 0.0).unwrap();
        assert!(s.enemies.is_empty());
        assert_eq!(s.explosions.len(), 1);
    }

    #[test]
    fn test_shatter_wave_kills_close_and_pushes_far() {
        let mut s = state();
        let center = Vec2::new(400.0, 600.0);
        // Centered on the impact point
        let near = enemy_at(&mut s, 390.0, 588.0, 20.0);
        s.enemies[0].hp = 10.0;
        // Near the edge of the first ring
        let far = enemy_at(&mut s, 400.0, 585.0, 20.0);
        s.enemies[1].hp = 10.0;
        s.waves.push(ShatterWave::new(center, &s.tuning));
        step_shatter_waves(&mut s, 0.0).unwrap();
        assert!(s.live_enemy_index(near).is_none());
        let idx = s.live_enemy_index(far).unwrap();
        assert!(s.enemies[idx].vy < 0.0);
    }

    #[test]
    fn test_shatter_wave_finishes_weak_enemy_at_low_power() {
        let mut s = state();
        let center = Vec2::new(400.0, 600.0);
        // Center ~11px from impact: power ~0.3 on the first ring
        let weak = enemy_at(&mut s, 400.0, 585.0, 20.0);
        s.enemies[0].hp = 1.0;
        s.waves.push(ShatterWave::new(center, &s.tuning));
        step_shatter_waves(&mut s, 0.0).unwrap();
        assert!(s.live_enemy_index(weak).is_none());
        assert_eq!(s.arsenal.kills, 1);
        assert!(s.events.iter().any(|e| matches!(
            e,
            GameEvent::EnemyKilled {
                source: DamageSource::ShatterWave,
                ..
            }
        )));
    }

    #[test]
    fn test_second_hit_after_switching_to_rifle_does_not_explode() {
        let mut s = state();
        s.tuning.enemy_hp = 5.0;
        enemy_at(&mut s, 100.0, 100.0, 30.0);
        s.arsenal.slot = WeaponSlot::Knives;
        shoot(&mut s, Vec2::new(110.0, 110.0), ProjectileKind::Basic);
        step_projectiles(&mut s, 0.0).unwrap();

        // Upgrade is judged when the hit lands, not when it was fired
        crate::sim::weapon::select_weapon(&mut s, 1);
        shoot(&mut s, Vec2::new(110.0, 110.0), ProjectileKind::Basic);
        step_projectiles(&mut s, 0.0).unwrap();
        assert_eq!(s.enemies[0].hit_count, 2);
        assert!(s.explosions.is_empty());
    }

    #[test]
    fn test_shatter_wave_fades_after_growth() {
        let mut s = state();
        s.waves.push(ShatterWave::new(Vec2::new(100.0, 600.0), &s.tuning));
        for _ in 0..200 {
            step_shatter_waves(&mut s, 0.0).unwrap();
        }
        assert!(s.waves.is_empty());
    }

    #[test]
    fn test_heavy_floor_bounce_spawns_wave() {
        let mut s = state();
        let id = s.next_entity_id();
        let mut p = Projectile::new(
            id,
            Vec2::new(400.0, 570.0),
            0.0,
            0.0,
            Vec2::splat(24.0),
            ProjectileKind::BouncingHeavy {
                bounces: 0,
                max_bounces: 4,
                damage_stage: 0,
                gravity: 0.4,
                bounce_damping: 0.7,
            },
        );
        p.vel = Vec2::new(0.0, 10.0);
        s.projectiles.push(p);
        step_projectiles(&mut s, 0.0).unwrap();
        assert_eq!(s.waves.len(), 1);
        assert_eq!(s.projectiles.len(), 1);
    }
}
