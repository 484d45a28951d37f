//! Canvas 2D backend

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::{DrawCommand, PathSegment, PathStyle, Rgba, Surface, TextAlign};

/// Executes draw commands on a browser canvas
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, width: f32, height: f32) -> Self {
        Self { ctx, width, height }
    }

    /// Track a canvas resize
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn fill(&self, color: &Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill();
    }

    fn stroke(&self, color: &Rgba, width: f32) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn circle_path(&self, x: f32, y: f32, radius: f32) {
        self.ctx.begin_path();
        // Canvas rejects negative radii
        let _ = self
            .ctx
            .arc(x as f64, y as f64, radius.max(0.0) as f64, 0.0, TAU);
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn draw(&mut self, command: &DrawCommand) {
        let ctx = &self.ctx;
        match command {
            DrawCommand::Clear { color } => {
                ctx.set_fill_style_str(&color.css());
                ctx.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
            }
            DrawCommand::FillRect { rect, color } => {
                ctx.set_fill_style_str(&color.css());
                ctx.fill_rect(
                    rect.pos.x as f64,
                    rect.pos.y as f64,
                    rect.size.x as f64,
                    rect.size.y as f64,
                );
            }
            DrawCommand::StrokeRect { rect, color, width } => {
                ctx.set_stroke_style_str(&color.css());
                ctx.set_line_width(*width as f64);
                ctx.stroke_rect(
                    rect.pos.x as f64,
                    rect.pos.y as f64,
                    rect.size.x as f64,
                    rect.size.y as f64,
                );
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                self.circle_path(center.x, center.y, *radius);
                self.fill(color);
            }
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => {
                self.circle_path(center.x, center.y, *radius);
                self.stroke(color, *width);
            }
            DrawCommand::FillEllipse {
                center,
                radii,
                rotation,
                color,
            } => {
                ctx.begin_path();
                let _ = ctx.ellipse(
                    center.x as f64,
                    center.y as f64,
                    radii.x.max(0.0) as f64,
                    radii.y.max(0.0) as f64,
                    *rotation as f64,
                    0.0,
                    TAU,
                );
                self.fill(color);
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                self.stroke(color, *width);
            }
            DrawCommand::Path { segments, style } => {
                ctx.begin_path();
                for segment in segments {
                    match segment {
                        PathSegment::MoveTo(p) => ctx.move_to(p.x as f64, p.y as f64),
                        PathSegment::LineTo(p) => ctx.line_to(p.x as f64, p.y as f64),
                        PathSegment::BezierTo { c1, c2, to } => ctx.bezier_curve_to(
                            c1.x as f64,
                            c1.y as f64,
                            c2.x as f64,
                            c2.y as f64,
                            to.x as f64,
                            to.y as f64,
                        ),
                        PathSegment::Close => ctx.close_path(),
                    }
                }
                match style {
                    PathStyle::Fill(color) => self.fill(color),
                    PathStyle::Stroke { color, width } => self.stroke(color, *width),
                }
            }
            DrawCommand::RadialGradientCircle {
                center,
                radius,
                inner,
                outer,
            } => {
                let (x, y, r) = (center.x as f64, center.y as f64, radius.max(0.0) as f64);
                let gradient = match ctx.create_radial_gradient(x, y, 0.0, x, y, r) {
                    Ok(gradient) => gradient,
                    Err(err) => {
                        log::warn!("Radial gradient failed: {:?}", err);
                        return;
                    }
                };
                let _ = gradient.add_color_stop(0.0, &inner.css());
                let _ = gradient.add_color_stop(1.0, &outer.css());
                ctx.set_fill_style_canvas_gradient(&gradient);
                self.circle_path(center.x, center.y, *radius);
                ctx.fill();
            }
            DrawCommand::Text {
                text,
                pos,
                size,
                color,
                align,
            } => {
                ctx.set_font(&format!("{}px Arial", size.round()));
                ctx.set_text_align(match align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                    TextAlign::Right => "right",
                });
                ctx.set_text_baseline("middle");
                ctx.set_fill_style_str(&color.css());
                let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
            }
            DrawCommand::PushTransform { translate, rotate } => {
                ctx.save();
                let _ = ctx.translate(translate.x as f64, translate.y as f64);
                let _ = ctx.rotate(*rotate as f64);
            }
            DrawCommand::PopTransform => ctx.restore(),
        }
    }
}
