//! On-canvas HUD: weapon buttons, kill counter, FPS
//!
//! Button geometry is a pure function of the surface size, so the input
//! layer and the renderer always agree on where the buttons are.

use glam::Vec2;

use crate::consts::WEAPON_SLOTS;
use crate::renderer::{DrawCommand, Rgba, Surface, TextAlign, palette};
use crate::sim::GameState;
use crate::sim::geometry::Rect;

const BUTTON_MAX_WIDTH: f32 = 56.0;
const BUTTON_MIN_WIDTH: f32 = 24.0;
const BUTTON_HEIGHT: f32 = 40.0;
const BUTTON_GAP: f32 = 6.0;
const MARGIN: f32 = 10.0;

/// Clickable area that selects a weapon slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub slot: u8,
    pub rect: Rect,
}

/// Weapon buttons along the top-left edge, shrinking on narrow surfaces
pub fn weapon_buttons(width: f32, _height: f32) -> Vec<HitRegion> {
    let slots = WEAPON_SLOTS as f32;
    // Keep clear of the turret in the middle
    let budget = (width * 0.45 - MARGIN) / slots - BUTTON_GAP;
    let button_w = budget.clamp(BUTTON_MIN_WIDTH, BUTTON_MAX_WIDTH);

    (1..=WEAPON_SLOTS)
        .map(|slot| {
            let x = MARGIN + (slot - 1) as f32 * (button_w + BUTTON_GAP);
            HitRegion {
                slot,
                rect: Rect::new(x, MARGIN, button_w, BUTTON_HEIGHT),
            }
        })
        .collect()
}

/// Slot under `point`, if any
pub fn hit_test(regions: &[HitRegion], point: Vec2) -> Option<u8> {
    regions
        .iter()
        .find(|region| region.rect.contains(point))
        .map(|region| region.slot)
}

/// Buttons, the selected weapon's name and the kill counter
pub fn draw_hud(state: &GameState, surface: &mut dyn Surface) {
    let (width, height) = surface.size();
    let selected = state.arsenal.slot.index();

    for region in weapon_buttons(width, height) {
        let active = region.slot == selected;
        surface.draw(&DrawCommand::FillRect {
            rect: region.rect,
            color: palette::HUD_PANEL,
        });
        surface.draw(&DrawCommand::StrokeRect {
            rect: region.rect,
            color: if active {
                palette::HUD_ACTIVE
            } else {
                palette::WHITE.with_alpha(0.4)
            },
            width: if active { 3.0 } else { 1.0 },
        });
        surface.draw(&DrawCommand::Text {
            text: region.slot.to_string(),
            pos: region.rect.center(),
            size: 18.0,
            color: if active { palette::HUD_ACTIVE } else { palette::WHITE },
            align: TextAlign::Center,
        });
    }

    surface.draw(&DrawCommand::Text {
        text: state.tuning.weapon_name(selected),
        pos: Vec2::new(MARGIN, MARGIN + BUTTON_HEIGHT + 20.0),
        size: 16.0,
        color: palette::WHITE,
        align: TextAlign::Left,
    });

    surface.draw(&DrawCommand::Text {
        text: format!("Kills: {}", state.arsenal.kills),
        pos: Vec2::new(width - MARGIN, MARGIN + 16.0),
        size: 20.0,
        color: palette::WHITE,
        align: TextAlign::Right,
    });
}

pub fn draw_fps(surface: &mut dyn Surface, fps: u32) {
    let (width, _) = surface.size();
    surface.draw(&DrawCommand::Text {
        text: format!("{} fps", fps),
        pos: Vec2::new(width - MARGIN, MARGIN + 40.0),
        size: 12.0,
        color: Rgba::rgb(200, 200, 200),
        align: TextAlign::Right,
    });
}
