//! Frame composition
//!
//! Draws the simulation pools back to front: decals, bodies, projectiles,
//! area effects, remains, particles, overlays, then the turret and HUD.

use glam::Vec2;

use super::{DrawCommand, PathSegment, PathStyle, Rgba, Surface, TextAlign, palette, tint_color};
use crate::settings::Settings;
use crate::sim::geometry::Rect;
use crate::sim::state::{
    AlliedUnit, DecalShape, DetachedPart, Enemy, GameState, HalfKind, OrganKind, ParticleKind,
    PartShape, Projectile, ProjectileKind,
};
use crate::ui;

const SPEECH_FONT: f32 = 14.0;

/// Emit the whole frame to `surface`
pub fn draw_frame(state: &GameState, settings: &Settings, surface: &mut dyn Surface) {
    let (width, height) = surface.size();
    surface.draw(&DrawCommand::Clear {
        color: palette::BACKGROUND,
    });

    if settings.decals {
        draw_decals(state, surface);
    }

    for enemy in &state.enemies {
        draw_enemy(enemy, surface);
    }
    for ally in &state.allies {
        draw_ally(ally, surface);
    }
    for enemy in &state.enemies {
        draw_speech_bubble(enemy, width, surface);
    }

    for projectile in &state.projectiles {
        draw_projectile(projectile, surface);
    }

    for explosion in &state.explosions {
        surface.draw(&DrawCommand::RadialGradientCircle {
            center: explosion.center,
            radius: explosion.radius,
            inner: Rgba::rgb(255, 255, 0).with_alpha(explosion.alpha),
            outer: Rgba::rgb(255, 0, 0).with_alpha(explosion.alpha * 0.5),
        });
    }

    if settings.effective_flashes() {
        for wave in &state.waves {
            surface.draw(&DrawCommand::StrokeCircle {
                center: wave.center,
                radius: wave.radius,
                color: palette::WHITE.with_alpha(wave.alpha * 0.8),
                width: 4.0,
            });
        }
        for flash in &state.flashes {
            surface.draw(&DrawCommand::RadialGradientCircle {
                center: flash.center,
                radius: flash.radius,
                inner: palette::GLOW.with_alpha(flash.alpha),
                outer: palette::GLOW.with_alpha(0.0),
            });
        }
    }

    let drips = settings.quality.draw_drips();
    for part in &state.parts {
        draw_part(part, drips, surface);
    }

    for p in &state.particles {
        let color = tint_color(p.tint).with_alpha((p.life / 30.0).min(1.0));
        match p.kind {
            ParticleKind::Feather => surface.draw(&DrawCommand::FillEllipse {
                center: p.pos,
                radii: Vec2::new(p.size, p.size * 0.5),
                rotation: p.rotation,
                color,
            }),
            ParticleKind::Splat => surface.draw(&DrawCommand::FillCircle {
                center: p.pos,
                radius: p.size * 0.5,
                color,
            }),
            ParticleKind::Plain | ParticleKind::Blood => surface.draw(&DrawCommand::FillRect {
                rect: Rect::from_pos_size(p.pos, Vec2::splat(p.size)),
                color,
            }),
        }
    }

    for slash in &state.slashes {
        surface.draw(&DrawCommand::Line {
            from: slash.from,
            to: slash.to,
            color: palette::WHITE.with_alpha(slash.alpha),
            width: 3.0,
        });
    }

    for speech in &state.floating_speech {
        let w = text_width(&speech.text) + 20.0;
        surface.draw(&DrawCommand::FillRect {
            rect: Rect::new(speech.pos.x - w / 2.0, speech.pos.y - 15.0, w, 30.0),
            color: palette::WHITE.with_alpha(speech.alpha),
        });
        surface.draw(&DrawCommand::Text {
            text: speech.text.clone(),
            pos: speech.pos,
            size: SPEECH_FONT,
            color: palette::BLACK.with_alpha(speech.alpha),
            align: TextAlign::Center,
        });
    }

    // Floor line
    surface.draw(&DrawCommand::Line {
        from: Vec2::new(0.0, height - 1.0),
        to: Vec2::new(width, height - 1.0),
        color: palette::GROUND,
        width: 2.0,
    });

    draw_turret(state, surface);
    ui::draw_hud(state, surface);
}

/// Rough text width for bubble sizing (no font metrics off-canvas)
fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * SPEECH_FONT * 0.55
}

fn draw_decals(state: &GameState, surface: &mut dyn Surface) {
    for decal in &state.decals {
        let color = tint_color(decal.tint).with_alpha(decal.alpha);
        let half = decal.size * 0.5;
        match decal.shape {
            DecalShape::Pool => surface.draw(&DrawCommand::FillEllipse {
                center: Vec2::new(decal.pos.x, decal.pos.y - half.y * 0.5),
                radii: half,
                rotation: 0.0,
                color,
            }),
            DecalShape::Splatter => {
                surface.draw(&DrawCommand::FillEllipse {
                    center: Vec2::new(decal.pos.x, decal.pos.y - half.y * 0.5),
                    radii: half * 0.7,
                    rotation: 0.0,
                    color,
                });
                // Satellite droplets at fixed offsets
                for k in [-1.0, 1.0] {
                    surface.draw(&DrawCommand::FillCircle {
                        center: Vec2::new(decal.pos.x + k * half.x, decal.pos.y - 1.0),
                        radius: (half.y * 0.4).max(1.0),
                        color,
                    });
                }
            }
            DecalShape::Smear => surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(decal.pos.x - half.x, decal.pos.y - decal.size.y, decal.size.x, decal.size.y),
                color,
            }),
        }
    }
}

fn draw_bird(pos: Vec2, size: Vec2, body: Rgba, wing: Rgba, surface: &mut dyn Surface) {
    let (x, y, w, h) = (pos.x, pos.y, size.x, size.y);
    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(x + w * 0.2, y + h * 0.2, w * 0.6, h * 0.6),
        color: body,
    });
    for wx in [0.05, 0.75] {
        surface.draw(&DrawCommand::FillRect {
            rect: Rect::new(x + w * wx, y + h * 0.4, w * 0.2, h * 0.2),
            color: wing,
        });
    }
    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(x + w * 0.35, y + h * 0.35, 2.0, 2.0),
        color: palette::BLACK,
    });
    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(x + w * 0.55, y + h * 0.45, 3.0, 2.0),
        color: palette::BEAK,
    });
}

fn draw_enemy(enemy: &Enemy, surface: &mut dyn Surface) {
    draw_bird(enemy.pos, enemy.size, palette::ENEMY_BODY, palette::ENEMY_WING, surface);
    for mark in &enemy.blood_marks {
        surface.draw(&DrawCommand::FillRect {
            rect: Rect::from_pos_size(enemy.pos + mark.offset * enemy.size, Vec2::splat(mark.size)),
            color: palette::DARK_BLOOD,
        });
    }
}

fn draw_ally(ally: &AlliedUnit, surface: &mut dyn Surface) {
    draw_bird(ally.pos, ally.size, palette::ALLY_BODY, palette::ALLY_WING, surface);
    surface.draw(&DrawCommand::StrokeCircle {
        center: ally.center(),
        radius: ally.size.x * 0.6,
        color: palette::GLOW.with_alpha(0.6),
        width: 2.0,
    });
}

fn draw_speech_bubble(enemy: &Enemy, surface_width: f32, surface: &mut dyn Surface) {
    let Some(speech) = &enemy.speech else { return };
    if !speech.is_showing() {
        return;
    }
    let bubble_w = text_width(&speech.text) + 20.0;
    let bubble_h = 30.0;
    let anchor_x = enemy.pos.x + enemy.size.x / 2.0;
    let bubble = Rect::new(anchor_x - bubble_w / 2.0, enemy.pos.y - bubble_h - 10.0, bubble_w, bubble_h);

    // Skip bubbles that would be clipped
    if bubble.pos.y <= 0.0 || bubble.pos.x <= 0.0 || bubble.right() >= surface_width {
        return;
    }

    surface.draw(&DrawCommand::FillRect {
        rect: bubble,
        color: palette::WHITE,
    });
    surface.draw(&DrawCommand::StrokeRect {
        rect: bubble,
        color: palette::BLACK,
        width: 1.0,
    });
    surface.draw(&DrawCommand::Path {
        segments: vec![
            PathSegment::MoveTo(Vec2::new(anchor_x - 10.0, bubble.bottom())),
            PathSegment::LineTo(Vec2::new(anchor_x, enemy.pos.y)),
            PathSegment::LineTo(Vec2::new(anchor_x + 10.0, bubble.bottom())),
            PathSegment::Close,
        ],
        style: PathStyle::Fill(palette::WHITE),
    });
    surface.draw(&DrawCommand::Text {
        text: speech.text.clone(),
        pos: bubble.center(),
        size: SPEECH_FONT,
        color: palette::BLACK,
        align: TextAlign::Center,
    });
}

fn draw_projectile(p: &Projectile, surface: &mut dyn Surface) {
    let (w, h) = (p.size.x, p.size.y);
    match p.kind {
        ProjectileKind::Basic => {
            surface.draw(&DrawCommand::PushTransform {
                translate: p.pos,
                rotate: p.angle,
            });
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(0.0, -h / 2.0, w * 2.0, h),
                color: palette::BULLET,
            });
            surface.draw(&DrawCommand::PopTransform);
        }
        ProjectileKind::AreaExplosive { .. } | ProjectileKind::MultiExplosive { .. } => {
            // Rockets are drawn lengthwise along their heading
            let (len, girth) = (h * 2.0, w);
            surface.draw(&DrawCommand::PushTransform {
                translate: p.pos,
                rotate: p.angle,
            });
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(0.0, -girth / 2.0, len, girth),
                color: palette::ROCKET,
            });
            surface.draw(&DrawCommand::Path {
                segments: vec![
                    PathSegment::MoveTo(Vec2::new(len + 5.0, 0.0)),
                    PathSegment::LineTo(Vec2::new(len, -girth / 2.0)),
                    PathSegment::LineTo(Vec2::new(len, girth / 2.0)),
                    PathSegment::Close,
                ],
                style: PathStyle::Fill(palette::ROCKET_TIP),
            });
            let flame = 10.0 + (p.pos.x * 0.7 + p.pos.y).sin().abs() * 10.0;
            surface.draw(&DrawCommand::Path {
                segments: vec![
                    PathSegment::MoveTo(Vec2::ZERO),
                    PathSegment::LineTo(Vec2::new(-flame, -girth / 3.0)),
                    PathSegment::LineTo(Vec2::new(-flame / 2.0, 0.0)),
                    PathSegment::LineTo(Vec2::new(-flame, girth / 3.0)),
                    PathSegment::Close,
                ],
                style: PathStyle::Fill(palette::FLAME),
            });
            surface.draw(&DrawCommand::PopTransform);
        }
        ProjectileKind::Piercing { rotation, .. } => {
            surface.draw(&DrawCommand::PushTransform {
                translate: p.center(),
                rotate: p.angle + rotation,
            });
            surface.draw(&DrawCommand::Path {
                segments: vec![
                    PathSegment::MoveTo(Vec2::new(w * 0.5, 0.0)),
                    PathSegment::LineTo(Vec2::new(0.0, h)),
                    PathSegment::LineTo(Vec2::new(-w * 0.15, 0.0)),
                    PathSegment::LineTo(Vec2::new(0.0, -h)),
                    PathSegment::Close,
                ],
                style: PathStyle::Fill(palette::BLADE),
            });
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(-w * 0.4, -h * 0.6, w * 0.25, h * 1.2),
                color: palette::HANDLE,
            });
            surface.draw(&DrawCommand::PopTransform);
        }
        ProjectileKind::BouncingHeavy { damage_stage, .. } => {
            let center = p.center();
            let radius = w / 2.0;
            surface.draw(&DrawCommand::FillCircle {
                center,
                radius,
                color: palette::BALL,
            });
            surface.draw(&DrawCommand::FillCircle {
                center: center - Vec2::splat(radius * 0.3),
                radius: radius * 0.3,
                color: palette::WHITE.with_alpha(0.3),
            });
            for crack in 0..damage_stage {
                let a = crack as f32 * 2.1 + 0.4;
                let dir = Vec2::new(a.cos(), a.sin());
                surface.draw(&DrawCommand::Line {
                    from: center + dir * radius * 0.2,
                    to: center + dir * radius * 0.9,
                    color: palette::BLACK.with_alpha(0.7),
                    width: 1.5,
                });
            }
        }
        ProjectileKind::Transforming { pulse } => {
            let center = p.center();
            let radius = w / 2.0 * (1.0 + 0.2 * pulse.sin());
            surface.draw(&DrawCommand::RadialGradientCircle {
                center,
                radius: radius * 1.8,
                inner: palette::GLOW.with_alpha(0.6),
                outer: palette::GLOW.with_alpha(0.0),
            });
            surface.draw(&DrawCommand::FillCircle {
                center,
                radius,
                color: palette::CONVERTER,
            });
        }
    }
}

fn draw_part(part: &DetachedPart, drips: bool, surface: &mut dyn Surface) {
    let (w, h) = (part.size.x, part.size.y);
    surface.draw(&DrawCommand::PushTransform {
        translate: part.pos,
        rotate: part.rotation,
    });

    match part.shape {
        PartShape::MeatChunk => {
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(-w / 2.0, -h / 2.0, w, h),
                color: palette::FLESH,
            });
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(-w / 4.0, -h / 4.0, w / 2.0, h / 2.0),
                color: palette::DARK_BLOOD,
            });
        }
        PartShape::Organ(OrganKind::Heart) => {
            for side in [-1.0, 1.0] {
                surface.draw(&DrawCommand::FillCircle {
                    center: Vec2::new(side * w * 0.2, -h * 0.1),
                    radius: w * 0.3,
                    color: palette::DARK_BLOOD,
                });
            }
            surface.draw(&DrawCommand::Path {
                segments: vec![
                    PathSegment::MoveTo(Vec2::new(-w * 0.5, 0.0)),
                    PathSegment::LineTo(Vec2::new(0.0, h * 0.5)),
                    PathSegment::LineTo(Vec2::new(w * 0.5, 0.0)),
                    PathSegment::Close,
                ],
                style: PathStyle::Fill(palette::DARK_BLOOD),
            });
        }
        PartShape::Organ(OrganKind::Lung) => surface.draw(&DrawCommand::FillEllipse {
            center: Vec2::ZERO,
            radii: Vec2::new(w * 0.35, h * 0.5),
            rotation: 0.0,
            color: Rgba::rgb(230, 140, 150),
        }),
        PartShape::Organ(OrganKind::Liver) => surface.draw(&DrawCommand::FillEllipse {
            center: Vec2::ZERO,
            radii: Vec2::new(w * 0.5, h * 0.3),
            rotation: 0.0,
            color: Rgba::rgb(110, 40, 30),
        }),
        PartShape::Organ(OrganKind::Eye) => {
            surface.draw(&DrawCommand::FillCircle {
                center: Vec2::ZERO,
                radius: w * 0.5,
                color: palette::WHITE,
            });
            surface.draw(&DrawCommand::FillCircle {
                center: Vec2::new(w * 0.15, 0.0),
                radius: w * 0.2,
                color: palette::BLACK,
            });
        }
        PartShape::Entrail { segments } => {
            let step = w / segments.max(1) as f32;
            let mut path = vec![PathSegment::MoveTo(Vec2::new(-w / 2.0, 0.0))];
            for i in 0..segments {
                let x0 = -w / 2.0 + i as f32 * step;
                let sway = if i % 2 == 0 { h * 2.0 } else { -h * 2.0 };
                path.push(PathSegment::BezierTo {
                    c1: Vec2::new(x0 + step * 0.3, sway),
                    c2: Vec2::new(x0 + step * 0.7, -sway),
                    to: Vec2::new(x0 + step, 0.0),
                });
            }
            surface.draw(&DrawCommand::Path {
                segments: path,
                style: PathStyle::Stroke {
                    color: palette::FLESH,
                    width: h.max(2.0),
                },
            });
        }
        PartShape::HalfBody(half) => {
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(-w / 2.0, -h / 2.0, w, h),
                color: palette::ENEMY_BODY,
            });
            // Raw edge along the cut
            let edge_y = match half {
                HalfKind::Upper => h / 2.0 - 2.0,
                HalfKind::Lower => -h / 2.0,
            };
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(-w / 2.0, edge_y, w, 2.0),
                color: palette::BLOOD,
            });
            if half == HalfKind::Upper {
                surface.draw(&DrawCommand::FillRect {
                    rect: Rect::new(w * 0.1, -h * 0.1, 3.0, 2.0),
                    color: palette::BEAK,
                });
            }
        }
    }

    if drips {
        for drip in &part.drips {
            surface.draw(&DrawCommand::Line {
                from: drip.offset,
                to: drip.offset + Vec2::new(0.0, drip.length),
                color: palette::DARK_BLOOD,
                width: 2.0,
            });
        }
    }

    surface.draw(&DrawCommand::PopTransform);
}

fn draw_turret(state: &GameState, surface: &mut dyn Surface) {
    let turret = &state.turret;
    let (w, h) = (turret.size.x, turret.size.y);

    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(turret.pos.x - w / 2.0, turret.pos.y, w, h),
        color: palette::TURRET_BODY,
    });
    surface.draw(&DrawCommand::FillCircle {
        center: Vec2::new(turret.pos.x, turret.pos.y - 5.0),
        radius: 15.0,
        color: palette::TURRET_HEAD,
    });

    let rig = state.arsenal.rig();
    let [r, g, b] = rig.color;
    let length = turret.gun_length * rig.length_scale;
    let girth = turret.gun_width * rig.width_scale;

    surface.draw(&DrawCommand::PushTransform {
        translate: turret.pivot(),
        rotate: turret.aim_angle,
    });
    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(0.0, -girth / 2.0, length, girth),
        color: Rgba::rgb(r, g, b),
    });
    if rig.barrels > 1 {
        let spacing = girth / rig.barrels as f32;
        for i in 0..rig.barrels {
            let y = -girth / 2.0 + spacing * (i as f32 + 0.2);
            surface.draw(&DrawCommand::FillRect {
                rect: Rect::new(length - 5.0, y, 10.0, spacing * 0.6),
                color: palette::BLACK,
            });
        }
    }
    if rig.cap_radius > 0.0 {
        surface.draw(&DrawCommand::FillCircle {
            center: Vec2::new(length, 0.0),
            radius: turret.gun_width * rig.cap_radius,
            color: Rgba::rgb(r / 2, g / 2, b / 2),
        });
    }
    surface.draw(&DrawCommand::PopTransform);
}
