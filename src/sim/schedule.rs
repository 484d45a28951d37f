//! Staggered cosmetic spawns
//!
//! Effects queued here fire on the first frame where `now >= due`. By then
//! the state may have moved on (resize, caps reached), so firing re-checks
//! bounds and goes through the capped gore creators.

use glam::Vec2;

use super::gore;
use super::state::GameState;

/// A cosmetic effect waiting for its due time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deferred {
    BloodBurst { center: Vec2, size: f32 },
    GroundSplat { x: f32, size: f32 },
}

#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    entries: Vec<(f64, Deferred)>,
}

impl DeferredQueue {
    pub fn push(&mut self, due_ms: f64, effect: Deferred) {
        self.entries.push((due_ms, effect));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every effect due at `now_ms`, in due order
    pub fn take_due(&mut self, now_ms: f64) -> Vec<Deferred> {
        let mut due: Vec<(f64, Deferred)> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].0 <= now_ms {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, effect)| effect).collect()
    }
}

/// Fire everything that is due
pub fn run_deferred(state: &mut GameState, now_ms: f64) {
    for effect in state.deferred.take_due(now_ms) {
        match effect {
            Deferred::BloodBurst { center, size } => {
                // The play area may have shrunk since this was queued
                if center.x < 0.0 || center.x > state.width || center.y > state.height {
                    continue;
                }
                gore::blood_burst(state, center, size);
            }
            Deferred::GroundSplat { x, size } => {
                if x < 0.0 || x > state.width {
                    continue;
                }
                gore::ground_splat(state, x, size);
            }
        }
    }
}
