//! Canvas2D backend: replay a display list onto a 2D context.
//!
//! The display list is built platform-free in `eg-render`; this module is
//! the only place that touches the DOM drawing API.

use eg_render::{Dash, DrawOp, Scene, StrokeStyle, TextAlign};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Replay a scene onto `ctx`. `width`/`height` are CSS pixels (the context
/// is already scaled for device-pixel-ratio).
pub fn replay(ctx: &CanvasRenderingContext2d, scene: &Scene, width: f64, height: f64) {
    for op in scene {
        match op {
            DrawOp::Clear { color } => {
                ctx.clear_rect(0.0, 0.0, width, height);
                ctx.set_fill_style_str(color);
                ctx.fill_rect(0.0, 0.0, width, height);
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => {
                ctx.save();
                apply_stroke(ctx, stroke);
                ctx.begin_path();
                ctx.move_to(*x1 as f64, *y1 as f64);
                ctx.line_to(*x2 as f64, *y2 as f64);
                ctx.stroke();
                ctx.restore();
            }
            DrawOp::Polyline { points, stroke } => {
                ctx.save();
                apply_stroke(ctx, stroke);
                trace_path(ctx, points);
                ctx.stroke();
                ctx.restore();
            }
            DrawOp::Polygon {
                points,
                color,
                alpha,
            } => {
                ctx.save();
                ctx.set_global_alpha(*alpha as f64);
                ctx.set_fill_style_str(color);
                trace_path(ctx, points);
                ctx.close_path();
                ctx.fill();
                ctx.restore();
            }
            DrawOp::Circle {
                x,
                y,
                radius,
                fill,
                stroke,
            } => {
                ctx.begin_path();
                let _ = ctx.arc(
                    *x as f64,
                    *y as f64,
                    *radius as f64,
                    0.0,
                    std::f64::consts::TAU,
                );
                if let Some(fill) = fill {
                    ctx.set_fill_style_str(fill);
                    ctx.fill();
                }
                if let Some((color, width)) = stroke {
                    ctx.set_stroke_style_str(color);
                    ctx.set_line_width(*width as f64);
                    ctx.stroke();
                }
            }
            DrawOp::Text {
                x,
                y,
                text,
                color,
                font,
                align,
            } => {
                ctx.save();
                ctx.set_font(font);
                ctx.set_fill_style_str(color);
                ctx.set_text_align(match align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                    TextAlign::Right => "right",
                });
                let _ = ctx.fill_text(text, *x as f64, *y as f64);
                ctx.restore();
            }
            DrawOp::Wash { color } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(0.0, 0.0, width, height);
            }
        }
    }
}

fn trace_path(ctx: &CanvasRenderingContext2d, points: &[(f32, f32)]) {
    ctx.begin_path();
    for (i, (px, py)) in points.iter().enumerate() {
        if i == 0 {
            ctx.move_to(*px as f64, *py as f64);
        } else {
            ctx.line_to(*px as f64, *py as f64);
        }
    }
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &StrokeStyle) {
    ctx.set_stroke_style_str(&stroke.color);
    ctx.set_line_width(stroke.width as f64);
    ctx.set_global_alpha(stroke.alpha as f64);
    match stroke.dash {
        Dash::Solid => {
            let _ = ctx.set_line_dash(&js_sys::Array::new());
        }
        Dash::Dashed(on, off) => {
            let _ = ctx.set_line_dash(&js_sys::Array::of2(
                &JsValue::from_f64(on as f64),
                &JsValue::from_f64(off as f64),
            ));
        }
    }
}
