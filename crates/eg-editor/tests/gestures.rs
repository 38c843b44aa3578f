//! Mode gestures through the public engine API: multi-click construction,
//! placement tools, the label flow, and the eraser.

use eg_core::{Attachment, Color, CurveSpec, Mode, Point, Viewport};
use eg_editor::{EngineConfig, GraphEngine, LabelTarget, PointerReaction};
use eg_render::hit::PixelPos;
use pretty_assertions::assert_eq;

fn engine() -> GraphEngine {
    GraphEngine::new(
        Viewport {
            width: 800.0,
            height: 600.0,
        },
        None,
        EngineConfig::default(),
    )
}

fn pix(engine: &GraphEngine, x: f32, y: f32) -> PixelPos {
    let (px, py) = engine.space().to_pix(Point::new(x, y));
    PixelPos::new(px, py)
}

fn flat_curve(e: &mut GraphEngine) -> eg_core::EntityId {
    e.add_curve(&CurveSpec {
        p1: Some(Point::new(20.0, 50.0)),
        p2: Some(Point::new(80.0, 50.0)),
        ..CurveSpec::default()
    })
}

// ─── draw-curve ──────────────────────────────────────────────────────────

#[test]
fn single_click_stages_without_committing() {
    let mut e = engine();
    e.set_mode(Mode::DrawCurve);
    assert_eq!(e.pointer_down(pix(&e, 30.0, 30.0)), PointerReaction::Redraw);
    assert_eq!(e.state().curves.len(), 0);
    let buffer = e.state().draw_curve_state.as_ref().unwrap();
    assert_eq!(buffer.points.len(), 1);
    assert!((buffer.points[0].x - 30.0).abs() < 1e-3);
    assert!((buffer.points[0].y - 30.0).abs() < 1e-3);
}

#[test]
fn second_click_commits_exactly_one_curve() {
    let mut e = engine();
    e.set_mode(Mode::DrawCurve);
    e.pointer_down(pix(&e, 30.0, 30.0));
    e.pointer_down(pix(&e, 70.0, 80.0));

    assert_eq!(e.state().curves.len(), 1);
    let c = &e.state().curves[0];
    assert!((c.p1.x - 30.0).abs() < 1e-3 && (c.p1.y - 30.0).abs() < 1e-3);
    assert!((c.p2.x - 70.0).abs() < 1e-3 && (c.p2.y - 80.0).abs() < 1e-3);
    assert_eq!(c.label, "", "labels are never auto-assigned");
    assert_eq!(e.state().selected_curve, Some(c.id));
    assert!(e.state().draw_curve_state.is_none());
}

#[test]
fn switching_modes_discards_staged_points() {
    let mut e = engine();
    e.set_mode(Mode::DrawCurve);
    e.pointer_down(pix(&e, 30.0, 30.0));
    e.set_mode(Mode::Paint);
    assert!(e.state().draw_curve_state.is_none());
}

#[test]
fn clicks_outside_the_plot_clamp_into_range() {
    let mut e = engine();
    e.set_mode(Mode::DrawCurve);
    e.pointer_down(PixelPos::new(0.0, 0.0));
    e.pointer_down(PixelPos::new(10_000.0, 10_000.0));
    let c = &e.state().curves[0];
    assert_eq!(c.p1, Point::new(0.0, 100.0));
    assert_eq!(c.p2, Point::new(100.0, 0.0));
}

// ─── paint ───────────────────────────────────────────────────────────────

#[test]
fn fourth_click_commits_a_polygon() {
    let mut e = engine();
    e.set_paint_color(Color::rgb(0xE7, 0x4C, 0x3C));
    e.set_mode(Mode::Paint);
    for (x, y) in [(20.0, 20.0), (60.0, 20.0), (60.0, 60.0)] {
        e.pointer_down(pix(&e, x, y));
        assert_eq!(e.state().shading.len(), 0);
    }
    e.pointer_down(pix(&e, 20.0, 60.0));

    assert_eq!(e.state().shading.len(), 1);
    let poly = &e.state().shading[0];
    assert_eq!(poly.points.len(), 4);
    assert_eq!(poly.color, Color::rgb(0xE7, 0x4C, 0x3C));
    assert!(e.state().paint_state.is_none());
}

#[test]
fn paint_color_change_applies_to_open_buffer() {
    let mut e = engine();
    e.set_mode(Mode::Paint);
    e.pointer_down(pix(&e, 20.0, 20.0));
    e.set_paint_color(Color::rgb(1, 2, 3));
    assert_eq!(e.state().paint_state.as_ref().unwrap().color, Color::rgb(1, 2, 3));
    e.clear_paint();
    assert!(e.state().paint_state.is_none());
}

// ─── line ────────────────────────────────────────────────────────────────

#[test]
fn line_mode_places_then_drags() {
    let mut e = engine();
    e.set_mode(Mode::Line);
    e.pointer_down(pix(&e, 50.0, 40.0));
    assert_eq!(e.state().lines.len(), 1);
    assert!((e.state().lines[0].position - 40.0).abs() < 1e-3);

    // Clicking the existing line starts a drag instead of placing another.
    e.pointer_down(pix(&e, 30.0, 40.0));
    assert_eq!(e.state().lines.len(), 1);
    assert!(e.pointer_move(pix(&e, 30.0, 70.0)));
    e.pointer_up();
    assert!((e.state().lines[0].position - 70.0).abs() < 1e-3);
}

// ─── quota ───────────────────────────────────────────────────────────────

#[test]
fn quota_attaches_at_clicked_body_point() {
    let mut e = engine();
    let id = flat_curve(&mut e);
    e.set_mode(Mode::Quota);
    e.pointer_down(pix(&e, 50.0, 50.0));

    assert_eq!(e.state().quotas.len(), 1);
    let q = &e.state().quotas[0];
    assert_eq!(q.curve_id, id);
    assert_eq!(q.attachment, Attachment::Body);
    let t = q.t.unwrap();
    assert!((t - 0.5).abs() < 0.02);
    assert!((q.x - 50.0).abs() < 0.5);
    assert!((q.start_y - 50.0).abs() < 0.5);
    assert!((q.end_y - (q.start_y + 20.0)).abs() < 1e-3);
}

#[test]
fn one_quota_per_curve() {
    let mut e = engine();
    flat_curve(&mut e);
    e.set_mode(Mode::Quota);
    e.pointer_down(pix(&e, 40.0, 50.0));
    e.pointer_down(pix(&e, 60.0, 50.0));
    assert_eq!(e.state().quotas.len(), 1);
    assert!((e.state().quotas[0].x - 60.0).abs() < 0.5);
}

#[test]
fn quota_ignores_empty_space() {
    let mut e = engine();
    e.set_mode(Mode::Quota);
    assert_eq!(e.pointer_down(pix(&e, 50.0, 50.0)), PointerReaction::None);
    assert!(e.state().quotas.is_empty());
}

// ─── reference ───────────────────────────────────────────────────────────

#[test]
fn reference_on_endpoint_replaces_previous() {
    let mut e = engine();
    let id = flat_curve(&mut e);
    e.set_mode(Mode::Reference);
    e.pointer_down(pix(&e, 20.0, 50.0));
    e.pointer_down(pix(&e, 20.0, 50.0));

    // Same endpoint → same synthesized pointId → replacement, not a pile.
    assert_eq!(e.state().reference_lines.len(), 1);
    let rl = &e.state().reference_lines[0];
    assert_eq!(rl.curve_id, id);
    assert_eq!(rl.attachment, Attachment::P1);
    assert_eq!(rl.t, None);
    assert_eq!((rl.point_x, rl.point_y), (20.0, 50.0));
}

#[test]
fn body_references_accumulate() {
    let mut e = engine();
    flat_curve(&mut e);
    e.set_mode(Mode::Reference);
    e.pointer_down(pix(&e, 45.0, 50.0));
    e.pointer_down(pix(&e, 60.0, 50.0));
    assert_eq!(e.state().reference_lines.len(), 2);
    for rl in &e.state().reference_lines {
        assert_eq!(rl.attachment, Attachment::Body);
        assert!(rl.t.is_some(), "body attachment always carries t");
    }
}

// ─── label ───────────────────────────────────────────────────────────────

#[test]
fn label_flow_on_curve() {
    let mut e = engine();
    let id = flat_curve(&mut e);
    e.set_mode(Mode::Label);
    let reaction = e.pointer_down(pix(&e, 50.0, 50.0));
    let PointerReaction::LabelPrompt { target, current } = reaction else {
        panic!("expected a label prompt, got {reaction:?}");
    };
    assert_eq!(target, LabelTarget::Curve(id));
    assert_eq!(current, "");

    assert!(e.submit_label(target, Some("D".to_string())));
    assert_eq!(e.state().curve(id).unwrap().label, "D");

    // Re-prompting now prefills with the existing text.
    let PointerReaction::LabelPrompt { current, .. } = e.pointer_down(pix(&e, 50.0, 50.0)) else {
        panic!("expected a label prompt");
    };
    assert_eq!(current, "D");
}

#[test]
fn cancelled_dialog_mutates_nothing() {
    let mut e = engine();
    let id = flat_curve(&mut e);
    e.set_mode(Mode::Label);
    let PointerReaction::LabelPrompt { target, .. } = e.pointer_down(pix(&e, 50.0, 50.0)) else {
        panic!("expected a label prompt");
    };
    assert!(!e.submit_label(target, None));
    assert_eq!(e.state().curve(id).unwrap().label, "");
    assert!(!e.undo(), "cancel must not leave an undo entry");
}

#[test]
fn empty_space_click_creates_floating_label() {
    let mut e = engine();
    e.set_mode(Mode::Label);
    let PointerReaction::LabelPrompt { target, current } = e.pointer_down(pix(&e, 10.0, 90.0))
    else {
        panic!("expected a label prompt");
    };
    assert!(matches!(target, LabelTarget::NewLabel { .. }));
    assert_eq!(current, "");

    // Empty text creates nothing…
    assert!(!e.submit_label(target, Some(String::new())));
    assert!(e.state().labels.is_empty());

    // …but real text does.
    assert!(e.submit_label(target, Some("CS".to_string())));
    assert_eq!(e.state().labels.len(), 1);
    let label = &e.state().labels[0];
    assert_eq!(label.text, "CS");
    assert!((label.x - 10.0).abs() < 0.5);
    assert!((label.y - 90.0).abs() < 0.5);
}

#[test]
fn label_prompt_survives_a_stale_target() {
    let mut e = engine();
    let id = flat_curve(&mut e);
    e.set_mode(Mode::Label);
    let PointerReaction::LabelPrompt { target, .. } = e.pointer_down(pix(&e, 50.0, 50.0)) else {
        panic!("expected a label prompt");
    };
    // The curve disappears (undo) while the dialog is open.
    assert!(e.undo());
    assert!(e.state().curve(id).is_none());
    assert!(!e.submit_label(target, Some("S".to_string())));
}

// ─── eraser ──────────────────────────────────────────────────────────────

#[test]
fn erasing_a_curve_cascades_to_attachments() {
    let mut e = engine();
    let id = flat_curve(&mut e);
    e.set_mode(Mode::Reference);
    e.pointer_down(pix(&e, 20.0, 50.0));
    e.set_mode(Mode::Quota);
    e.pointer_down(pix(&e, 60.0, 50.0));
    assert_eq!(e.state().reference_lines.len(), 1);
    assert_eq!(e.state().quotas.len(), 1);

    e.set_mode(Mode::Eraser);
    e.pointer_down(pix(&e, 40.0, 50.0));

    assert!(e.state().curve(id).is_none());
    assert!(e.state().reference_lines.is_empty(), "no orphaned reference lines");
    assert!(e.state().quotas.is_empty(), "no orphaned quotas");
    assert_eq!(e.state().selected_curve, None);

    // One undo brings everything back.
    assert!(e.undo());
    assert!(e.state().curve(id).is_some());
    assert_eq!(e.state().reference_lines.len(), 1);
    assert_eq!(e.state().quotas.len(), 1);
}

#[test]
fn eraser_miss_pushes_no_snapshot() {
    let mut e = engine();
    e.set_mode(Mode::Eraser);
    assert_eq!(e.pointer_down(pix(&e, 50.0, 50.0)), PointerReaction::None);
    assert!(!e.undo());
}

#[test]
fn eraser_removes_floating_labels() {
    let mut e = engine();
    e.set_mode(Mode::Label);
    let PointerReaction::LabelPrompt { target, .. } = e.pointer_down(pix(&e, 50.0, 50.0)) else {
        panic!("expected a label prompt");
    };
    e.submit_label(target, Some("P*".to_string()));

    e.set_mode(Mode::Eraser);
    e.pointer_down(pix(&e, 50.0, 50.0));
    assert!(e.state().labels.is_empty());
}

// ─── read-only ───────────────────────────────────────────────────────────

#[test]
fn read_only_blocks_all_pointer_mutation() {
    let mut e = GraphEngine::new(
        Viewport {
            width: 800.0,
            height: 600.0,
        },
        None,
        EngineConfig {
            read_only: true,
            initial_curves: vec![CurveSpec {
                p1: Some(Point::new(20.0, 50.0)),
                p2: Some(Point::new(80.0, 50.0)),
                ..CurveSpec::default()
            }],
            ..EngineConfig::default()
        },
    );
    assert_eq!(e.state().curves.len(), 1);
    assert_eq!(e.pointer_down(pix(&e, 20.0, 50.0)), PointerReaction::None);
    assert!(!e.pointer_move(pix(&e, 40.0, 80.0)));
    assert!(!e.pointer_up());
    assert_eq!(e.state().curves[0].p1, Point::new(20.0, 50.0));
}

// ─── seeding ─────────────────────────────────────────────────────────────

#[test]
fn initial_curves_seed_only_fresh_states() {
    let config = EngineConfig {
        initial_curves: vec![CurveSpec::default()],
        ..EngineConfig::default()
    };
    let fresh = GraphEngine::new(
        Viewport {
            width: 800.0,
            height: 600.0,
        },
        None,
        config.clone(),
    );
    assert_eq!(fresh.state().curves.len(), 1);

    let restored = GraphEngine::new(
        Viewport {
            width: 800.0,
            height: 600.0,
        },
        Some(eg_core::GraphState::new()),
        config,
    );
    assert_eq!(restored.state().curves.len(), 0);
}
