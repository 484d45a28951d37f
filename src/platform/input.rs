//! Pointer and keyboard mapping

use glam::Vec2;

use crate::consts::WEAPON_SLOTS;
use crate::sim::Command;
use crate::ui::{HitRegion, hit_test};

/// Tracks the pointer and turns raw events into commands
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    /// Last pointer position, in canvas pixels
    pub aim: Vec2,
    /// True once the pointer has moved over the canvas
    pub has_aim: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.aim = Vec2::new(x, y);
            self.has_aim = true;
        }
    }

    /// Current aim point, if the pointer has been seen
    pub fn aim(&self) -> Option<Vec2> {
        self.has_aim.then_some(self.aim)
    }

    /// A click on a weapon button selects it; anywhere else fires
    pub fn pointer_click(&mut self, x: f32, y: f32, buttons: &[HitRegion]) -> Option<Command> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let point = Vec2::new(x, y);
        self.pointer_move(x, y);
        match hit_test(buttons, point) {
            Some(slot) => Some(Command::SelectWeapon(slot)),
            None => Some(Command::Fire(point)),
        }
    }

    /// Digit keys select weapon slots
    pub fn key(&self, key: &str) -> Option<Command> {
        match key.parse::<u8>() {
            Ok(slot) if (1..=WEAPON_SLOTS).contains(&slot) => Some(Command::SelectWeapon(slot)),
            _ => {
                log::debug!("Ignoring key {:?}", key);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::weapon_buttons;

    #[test]
    fn test_click_on_button_selects() {
        let buttons = weapon_buttons(800.0, 600.0);
        let mut input = InputMapper::new();
        let c = buttons[3].rect.center();
        assert_eq!(
            input.pointer_click(c.x, c.y, &buttons),
            Some(Command::SelectWeapon(4))
        );
    }

    #[test]
    fn test_click_elsewhere_fires() {
        let buttons = weapon_buttons(800.0, 600.0);
        let mut input = InputMapper::new();
        assert_eq!(
            input.pointer_click(400.0, 500.0, &buttons),
            Some(Command::Fire(Vec2::new(400.0, 500.0)))
        );
        assert_eq!(input.aim(), Some(Vec2::new(400.0, 500.0)));
    }

    #[test]
    fn test_digit_keys() {
        let input = InputMapper::new();
        assert_eq!(input.key("1"), Some(Command::SelectWeapon(1)));
        assert_eq!(input.key("6"), Some(Command::SelectWeapon(6)));
        assert_eq!(input.key("7"), None);
        assert_eq!(input.key("0"), None);
        assert_eq!(input.key("a"), None);
    }

    #[test]
    fn test_no_aim_until_pointer_seen() {
        let mut input = InputMapper::new();
        assert_eq!(input.aim(), None);
        input.pointer_move(f32::NAN, 3.0);
        assert_eq!(input.aim(), None);
        input.pointer_move(10.0, 20.0);
        assert_eq!(input.aim(), Some(Vec2::new(10.0, 20.0)));
    }
}
