//! Converted enemies fighting for the player
//!
//! Allies hold their target as an enemy id and re-resolve it every frame,
//! so a target that died, was sliced or was converted is simply replaced.

use glam::Vec2;
use rand::Rng;

use super::combat;
use super::gore;
use super::state::{AllyState, AlliedUnit, DamageSource, Enemy, GameEvent, GameState};
use crate::audio::SoundEffect;
use crate::error::SimResult;
use crate::rand_between;

/// Turn the enemy at `index` into an ally; returns the ally id
///
/// The enemy leaves the pool without a death sequence and does not count
/// as a kill.
pub fn convert_enemy(state: &mut GameState, index: usize, now_ms: f64) -> Option<u32> {
    if index >= state.enemies.len() {
        return None;
    }
    let enemy = state.enemies.remove(index);
    let id = state.next_entity_id();
    state.allies.push(AlliedUnit {
        id,
        pos: enemy.pos,
        size: enemy.size,
        vel: Vec2::ZERO,
        hp: state.tuning.ally_hp,
        target: None,
        state: AllyState::Seeking,
        attack_cooldown: 0,
        jump_cooldown: 0,
        created_at_ms: now_ms,
        lifespan_ms: state.tuning.ally_lifespan_ms,
    });

    gore::conversion_burst(state, enemy.center());
    state.events.push(GameEvent::EnemyConverted {
        enemy_id: enemy.id,
        ally_id: id,
    });
    state.sound(SoundEffect::Convert);
    log::debug!("Enemy {} converted into ally {}", enemy.id, id);
    Some(id)
}

/// Index of the live enemy whose center is closest to `from`
pub fn find_nearest_enemy(enemies: &[Enemy], from: Vec2) -> Option<usize> {
    let mut min_dist = f32::MAX;
    let mut nearest = None;
    for (i, enemy) in enemies.iter().enumerate() {
        if !enemy.is_live() {
            continue;
        }
        let dist = enemy.center().distance_squared(from);
        if dist < min_dist {
            min_dist = dist;
            nearest = Some(i);
        }
    }
    nearest
}

/// Expire, steer, move and attack with every ally
pub fn step_allies(state: &mut GameState, now_ms: f64) -> SimResult<()> {
    let before = state.allies.len();
    state.allies.retain(|a| !a.is_expired(now_ms));
    if state.allies.len() < before {
        log::debug!("{} allies expired", before - state.allies.len());
    }

    let gravity = state.tuning.gravity;
    let floor = state.floor_y();
    let width = state.width;

    for i in 0..state.allies.len() {
        let mut ally = state.allies[i];

        let target = ally
            .target
            .and_then(|id| state.live_enemy_index(id))
            .or_else(|| find_nearest_enemy(&state.enemies, ally.center()));
        ally.target = target.map(|t| state.enemies[t].id);

        // Steering
        match (ally.state, target) {
            (AllyState::Attacking { .. }, _) => ally.vel.x = 0.0,
            (AllyState::Seeking, Some(t)) => {
                let dx = state.enemies[t].center().x - ally.center().x;
                ally.vel.x = if dx.abs() < 1.0 {
                    0.0
                } else {
                    dx.signum() * state.tuning.ally_speed
                };
            }
            (AllyState::Seeking, None) => {
                if state.rng.random::<f32>() < 0.02 {
                    ally.vel.x = rand_between(&mut state.rng, -0.5, 0.5);
                }
            }
        }

        // Same gravity and hopping as enemies
        ally.vel.y += gravity;
        ally.pos += ally.vel;
        let rest_y = floor - ally.size.y;
        if ally.pos.y >= rest_y {
            ally.pos.y = rest_y;
            if ally.jump_cooldown <= 0 {
                ally.vel.y = -state.rng.random::<f32>() * state.tuning.ally_jump_impulse;
                ally.jump_cooldown = state.tuning.ally_jump_cooldown;
            } else {
                ally.vel.y = 0.0;
                ally.jump_cooldown -= 1;
            }
        }
        ally.pos.x = ally.pos.x.clamp(0.0, (width - ally.size.x).max(0.0));

        if ally.attack_cooldown > 0 {
            ally.attack_cooldown -= 1;
        }

        let mut strike = None;
        match ally.state {
            AllyState::Attacking { frames_left } => {
                ally.state = if frames_left <= 1 {
                    AllyState::Seeking
                } else {
                    AllyState::Attacking {
                        frames_left: frames_left - 1,
                    }
                };
            }
            AllyState::Seeking => {
                if let Some(t) = target {
                    let d = state.enemies[t].center() - ally.center();
                    if d.x.abs() + d.y.abs() < state.tuning.ally_attack_range
                        && ally.attack_cooldown <= 0
                    {
                        ally.state = AllyState::Attacking {
                            frames_left: state.tuning.ally_attack_frames,
                        };
                        ally.attack_cooldown = state.tuning.ally_attack_cooldown;
                        strike = Some(t);
                    }
                }
            }
        }

        state.allies[i] = ally;

        if let Some(t) = strike {
            let damage = state.tuning.ally_damage;
            let enemy = &mut state.enemies[t];
            enemy.take_damage(damage);
            if enemy.hp <= 0.0 {
                combat::kill_enemy(state, t, DamageSource::Ally, now_ms);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(77, 800.0, 600.0)
    }

    #[test]
    fn test_convert_creates_one_ally() {
        let mut s = state();
        s.insert_enemy(Vec2::new(100.0, 580.0), 20.0, 0.0);
        let enemy_id = s.enemies[0].id;
        let ally_id = convert_enemy(&mut s, 0, 500.0).unwrap();
        assert!(s.enemies.is_empty());
        assert_eq!(s.allies.len(), 1);
        let ally = &s.allies[0];
        assert_eq!(ally.created_at_ms, 500.0);
        assert_eq!(ally.lifespan_ms, s.tuning.ally_lifespan_ms);
        assert_eq!(ally.hp, s.tuning.ally_hp);
        assert_eq!(s.arsenal.kills, 0);
        assert!(s.events.contains(&GameEvent::EnemyConverted { enemy_id, ally_id }));
        assert_eq!(s.flashes.len(), 1);
    }

    #[test]
    fn test_nearest_enemy_skips_terminal() {
        let mut s = state();
        s.insert_enemy(Vec2::new(10.0, 10.0), 20.0, 0.0);
        s.insert_enemy(Vec2::new(500.0, 10.0), 20.0, 0.0);
        assert_eq!(find_nearest_enemy(&s.enemies, Vec2::new(0.0, 0.0)), Some(0));
        s.enemies[0].slashed = true;
        assert_eq!(find_nearest_enemy(&s.enemies, Vec2::new(0.0, 0.0)), Some(1));
        s.enemies[1].dead = true;
        assert_eq!(find_nearest_enemy(&s.enemies, Vec2::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_allies_expire() {
        let mut s = state();
        s.insert_enemy(Vec2::new(100.0, 580.0), 20.0, 0.0);
        convert_enemy(&mut s, 0, 0.0);
        step_allies(&mut s, 10_000.0).unwrap();
        assert_eq!(s.allies.len(), 1);
        step_allies(&mut s, 15_001.0).unwrap();
        assert!(s.allies.is_empty());
    }

    #[test]
    fn test_ally_seeks_target() {
        let mut s = state();
        s.insert_enemy(Vec2::new(100.0, 580.0), 20.0, 0.0);
        convert_enemy(&mut s, 0, 0.0);
        let target = s.insert_enemy(Vec2::new(600.0, 580.0), 20.0, 0.0);
        step_allies(&mut s, 1.0).unwrap();
        assert_eq!(s.allies[0].target, Some(target));
        assert!(s.allies[0].vel.x > 0.0);
    }

    #[test]
    fn test_ally_attack_kills_with_cooldown() {
        let mut s = state();
        s.insert_enemy(Vec2::new(100.0, 580.0), 20.0, 0.0);
        convert_enemy(&mut s, 0, 0.0);
        s.insert_enemy(Vec2::new(110.0, 580.0), 20.0, 0.0);
        s.enemies[0].hp = 2.0;

        step_allies(&mut s, 1.0).unwrap();
        assert_eq!(s.enemies[0].hp, 1.0);
        assert!(matches!(s.allies[0].state, AllyState::Attacking { .. }));

        // Still cooling down on the next frame
        step_allies(&mut s, 2.0).unwrap();
        assert_eq!(s.enemies[0].hp, 1.0);

        s.allies[0].attack_cooldown = 0;
        s.allies[0].state = AllyState::Seeking;
        s.allies[0].pos = s.enemies[0].pos;
        step_allies(&mut s, 3.0).unwrap();
        assert!(s.enemies.is_empty());
        assert_eq!(s.arsenal.kills, 1);
        assert!(s.events.iter().any(|e| matches!(
            e,
            GameEvent::EnemyKilled {
                source: DamageSource::Ally,
                ..
            }
        )));
    }
}
