//! Timed enemy spawning
//!
//! Enemies are launched upward from the floor at a random position once
//! per spawn interval of wall-clock time.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::{GameState, Speech};
use crate::rand_between;

/// Spawn an enemy once a full interval has elapsed; returns the new id
pub fn step_spawner(state: &mut GameState, now_ms: f64) -> Option<u32> {
    if now_ms - state.spawn_clock.last_spawn_ms < state.tuning.spawn_interval_ms {
        return None;
    }
    state.spawn_clock.last_spawn_ms = now_ms;
    Some(spawn_enemy(state, now_ms))
}

/// Launch one enemy from the floor
pub fn spawn_enemy(state: &mut GameState, now_ms: f64) -> u32 {
    let size = rand_between(
        &mut state.rng,
        state.tuning.enemy_min_size,
        state.tuning.enemy_max_size,
    );
    let x = rand_between(&mut state.rng, 0.0, (state.width - size).max(0.0));
    let y = state.floor_y() - size;
    let vy = -(state.rng.random::<f32>() * 8.0 + 5.0);

    let speech = if state.rng.random_bool(state.tuning.speech_chance.clamp(0.0, 1.0)) {
        state
            .tuning
            .phrases
            .choose(&mut state.rng)
            .cloned()
            .map(|text| Speech {
                text,
                timer: state.rng.random_range(200..500),
                toggled_at_ms: now_ms,
                visible: true,
            })
    } else {
        None
    };

    let id = state.insert_enemy(Vec2::new(x, y), size, vy);
    if let Some(enemy) = state.enemies.last_mut() {
        enemy.speech = speech;
    }
    log::trace!("Spawned enemy {} (size {:.1}) at x={:.1}", id, size, x);
    id
}
