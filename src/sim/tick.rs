//! Frame orchestration
//!
//! One call per animation frame runs the whole pipeline in a fixed order.
//! A failing stage is logged and skipped; malformed entities are dropped
//! from their pools at the end of the frame.

use glam::Vec2;

use super::state::{GameState, Validate};
use super::{ally, combat, motion, schedule, spawner, weapon};
use crate::error::{SimError, SimResult};

/// Player intent delivered to the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Fire the selected weapon toward a point
    Fire(Vec2),
    /// Select weapon slot 1..=6 (anything else is ignored)
    SelectWeapon(u8),
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Latest pointer position, if it moved
    pub aim: Option<Vec2>,
    pub commands: Vec<Command>,
}

impl FrameInput {
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Hand the accumulated input to a frame, leaving this one empty
    pub fn take(&mut self) -> FrameInput {
        std::mem::take(self)
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Stages that returned an error and were skipped
    pub failed_stages: Vec<&'static str>,
    /// Entities dropped for carrying non-finite state
    pub culled: usize,
    /// Kills recorded this frame
    pub kills: u64,
}

/// Advance the game by one frame at wall-clock time `now_ms`
pub fn tick(state: &mut GameState, input: &FrameInput, now_ms: f64) -> Result<FrameReport, SimError> {
    if !state.bounds_valid() {
        return Err(SimError::InvalidBounds {
            width: state.width,
            height: state.height,
        });
    }

    let mut report = FrameReport {
        frame: state.frame,
        ..Default::default()
    };
    let kills_before = state.arsenal.kills;

    for command in &input.commands {
        match *command {
            Command::Fire(at) => {
                weapon::fire(state, at);
            }
            Command::SelectWeapon(slot) => {
                weapon::select_weapon(state, slot);
            }
        }
    }

    schedule::run_deferred(state, now_ms);

    run_stage(state, &mut report, "explosions", |s| combat::step_explosions(s, now_ms));
    run_stage(state, &mut report, "shatter waves", |s| {
        combat::step_shatter_waves(s, now_ms)
    });
    run_stage(state, &mut report, "detached parts", motion::step_parts);
    run_stage(state, &mut report, "overlays", motion::step_overlays);
    run_stage(state, &mut report, "particles", motion::step_particles);
    run_stage(state, &mut report, "enemies", |s| motion::step_enemies(s, now_ms));
    run_stage(state, &mut report, "allies", |s| ally::step_allies(s, now_ms));
    run_stage(state, &mut report, "spawner", |s| {
        spawner::step_spawner(s, now_ms);
        Ok(())
    });
    run_stage(state, &mut report, "projectiles", |s| {
        combat::step_projectiles(s, now_ms)
    });

    if let Some(aim) = input.aim {
        state.turret.aim_at(aim);
    }

    report.culled = sanitize(state);
    report.kills = state.arsenal.kills - kills_before;
    state.frame += 1;
    Ok(report)
}

/// Run one pipeline stage, logging and recording a failure
fn run_stage<F>(state: &mut GameState, report: &mut FrameReport, name: &'static str, stage: F)
where
    F: FnOnce(&mut GameState) -> SimResult<()>,
{
    if let Err(err) = stage(state) {
        log::warn!("Stage '{}' failed on frame {}: {}", name, state.frame, err);
        report.failed_stages.push(name);
    }
}

/// Drop malformed entities from every kinematic pool
fn sanitize(state: &mut GameState) -> usize {
    cull(&mut state.enemies)
        + cull(&mut state.projectiles)
        + cull(&mut state.explosions)
        + cull(&mut state.waves)
        + cull(&mut state.flashes)
        + cull(&mut state.particles)
        + cull(&mut state.parts)
        + cull(&mut state.allies)
}

fn cull<T: Validate>(pool: &mut Vec<T>) -> usize {
    let before = pool.len();
    let mut index = 0;
    pool.retain(|entity| {
        let result = entity.check(index);
        index += 1;
        match result {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{}", err);
                false
            }
        }
    });
    before - pool.len()
}
