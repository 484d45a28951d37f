//! Immediate-mode 2D rendering
//!
//! The scene is described as a flat list of [`DrawCommand`]s handed to a
//! [`Surface`]. The browser backend forwards them to a canvas 2D context;
//! tests record them.

pub mod recording;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use glam::Vec2;

use crate::sim::geometry::Rect;
use crate::sim::state::Tint;

pub use recording::RecordingSurface;
pub use scene::draw_frame;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

/// 8-bit RGB plus float alpha (canvas style)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS color string
    pub fn css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }
}

pub mod palette {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::rgb(135, 206, 235);
    pub const GROUND: Rgba = Rgba::rgb(96, 72, 48);
    pub const BLOOD: Rgba = Rgba::rgb(200, 0, 0);
    pub const DARK_BLOOD: Rgba = Rgba::rgb(139, 0, 0);
    pub const FLESH: Rgba = Rgba::rgb(196, 90, 90);
    pub const FEATHER: Rgba = Rgba::rgb(144, 238, 144);
    pub const FEATHER_DARK: Rgba = Rgba::rgb(0, 128, 0);
    pub const DEBRIS: Rgba = Rgba::rgb(110, 110, 110);
    pub const GLOW: Rgba = Rgba::rgb(120, 255, 200);
    pub const ENEMY_BODY: Rgba = Rgba::rgb(50, 205, 50);
    pub const ENEMY_WING: Rgba = Rgba::rgb(0, 128, 0);
    pub const ALLY_BODY: Rgba = Rgba::rgb(80, 160, 255);
    pub const ALLY_WING: Rgba = Rgba::rgb(30, 90, 200);
    pub const BEAK: Rgba = Rgba::rgb(255, 215, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TURRET_BODY: Rgba = Rgba::rgb(51, 102, 204);
    pub const TURRET_HEAD: Rgba = Rgba::rgb(255, 204, 153);
    pub const BULLET: Rgba = Rgba::rgb(255, 255, 0);
    pub const ROCKET: Rgba = Rgba::rgb(51, 51, 51);
    pub const ROCKET_TIP: Rgba = Rgba::rgb(255, 0, 0);
    pub const FLAME: Rgba = Rgba::rgb(255, 165, 0);
    pub const BLADE: Rgba = Rgba::rgb(192, 192, 192);
    pub const HANDLE: Rgba = Rgba::rgb(139, 69, 19);
    pub const BALL: Rgba = Rgba::rgb(90, 90, 90);
    pub const CONVERTER: Rgba = Rgba::rgb(58, 143, 106);
    pub const HUD_PANEL: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.5,
    };
    pub const HUD_ACTIVE: Rgba = Rgba::rgb(255, 215, 0);
}

/// Color for a cosmetic tint
pub fn tint_color(tint: Tint) -> Rgba {
    match tint {
        Tint::Blood => palette::BLOOD,
        Tint::DarkBlood => palette::DARK_BLOOD,
        Tint::Feather => palette::FEATHER,
        Tint::FeatherDark => palette::FEATHER_DARK,
        Tint::Debris => palette::DEBRIS,
        Tint::Glow => palette::GLOW,
    }
}

/// One segment of a path, in the current transform's coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Vec2),
    LineTo(Vec2),
    BezierTo { c1: Vec2, c2: Vec2, to: Vec2 },
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathStyle {
    Fill(Rgba),
    Stroke { color: Rgba, width: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgba,
    },
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    StrokeRect {
        rect: Rect,
        color: Rgba,
        width: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        width: f32,
    },
    FillEllipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    },
    Path {
        segments: Vec<PathSegment>,
        style: PathStyle,
    },
    /// Filled circle shaded from `inner` at the center to `outer` at the rim
    RadialGradientCircle {
        center: Vec2,
        radius: f32,
        inner: Rgba,
        outer: Rgba,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Rgba,
        align: TextAlign,
    },
    /// Translate then rotate; must be balanced by `PopTransform`
    PushTransform {
        translate: Vec2,
        rotate: f32,
    },
    PopTransform,
}

/// Anything that can execute draw commands
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> (f32, f32);

    fn draw(&mut self, command: &DrawCommand);
}
