//! Drive the engine headlessly: build a small supply/demand-style sketch,
//! drag an endpoint, and print the exported state.
//!
//! Run with `RUST_LOG=debug cargo run -p eg-editor --example sketch_session`.

use eg_core::{CurveSpec, Mode, Point, Viewport};
use eg_editor::{EngineConfig, GraphEngine};
use eg_render::hit::PixelPos;

fn pix(engine: &GraphEngine, x: f32, y: f32) -> PixelPos {
    let (px, py) = engine.space().to_pix(Point::new(x, y));
    PixelPos::new(px, py)
}

fn main() {
    env_logger::init();

    let mut engine = GraphEngine::new(
        Viewport {
            width: 800.0,
            height: 600.0,
        },
        None,
        EngineConfig::default(),
    );
    engine.set_on_change(Some(Box::new(|state| {
        log::info!("state changed: {} curves", state.curves.len());
    })));

    // Two crossing curves, user-labeled.
    let falling = engine.add_curve(&CurveSpec {
        p1: Some(Point::new(15.0, 85.0)),
        p2: Some(Point::new(85.0, 15.0)),
        ..CurveSpec::default()
    });
    engine.add_curve(&CurveSpec {
        p1: Some(Point::new(15.0, 15.0)),
        p2: Some(Point::new(85.0, 85.0)),
        ..CurveSpec::default()
    });

    // Attach a reference line to the first curve's upper endpoint, then
    // drag that endpoint and watch the guides follow.
    engine.set_mode(Mode::Reference);
    engine.pointer_down(pix(&engine, 15.0, 85.0));

    engine.set_mode(Mode::Curve);
    engine.pointer_down(pix(&engine, 15.0, 85.0));
    engine.pointer_move(pix(&engine, 20.0, 75.0));
    engine.pointer_move(pix(&engine, 25.0, 70.0));
    engine.pointer_up();

    let state = engine.state();
    let guide = &state.reference_lines[0];
    println!(
        "endpoint of {falling} now at ({}, {}); guide tracks ({}, {})",
        state.curve(falling).unwrap().p1.x,
        state.curve(falling).unwrap().p1.y,
        guide.point_x,
        guide.point_y,
    );
    println!("{}", serde_json::to_string_pretty(&engine.to_json()).unwrap());
}
