//! WASM bridge — owns a `<canvas>` inside a host container and drives the
//! engine from browser events.
//!
//! One `GraphCanvas` per mounted container. The instance owns its canvas,
//! every event listener and the resize observer; hosts must call
//! [`GraphCanvas::destroy`] before discarding the container, or a stale
//! instance keeps redrawing onto a detached canvas.

mod render2d;

use eg_core::{Color, CurveSpec, EntityId, GraphState, Mode, Viewport};
use eg_editor::{ConfigPatch, EngineConfig, GraphEngine, LabelTarget, PointerReaction};
use eg_render::hit::PixelPos;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlElement,
    MouseEvent, ResizeObserver, TouchEvent,
};

/// Burst resize events collapse into one re-layout after this quiet period.
const RESIZE_DEBOUNCE_MS: i32 = 60;

struct Inner {
    engine: GraphEngine,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    container: HtmlElement,
    /// Target of an unresolved label prompt (host dialog still open).
    pending_label: Option<LabelTarget>,
    on_label_request: Option<js_sys::Function>,
    resize_timeout: Option<i32>,
    css_width: f64,
    css_height: f64,
}

impl Inner {
    /// Measure the container, size the backing store for the device pixel
    /// ratio, and hand the CSS size to the engine.
    fn size_canvas(&mut self) {
        let rect = self.container.get_bounding_client_rect();
        let w = rect.width().max(100.0);
        let h = rect.height().max(100.0);
        let dpr = web_sys::window()
            .map(|win| win.device_pixel_ratio())
            .unwrap_or(1.0);
        self.canvas.set_width((w * dpr) as u32);
        self.canvas.set_height((h * dpr) as u32);
        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let _ = self.ctx.scale(dpr, dpr);
        self.css_width = w;
        self.css_height = h;
        self.engine.resize(Viewport {
            width: w as f32,
            height: h as f32,
        });
    }

    fn render(&self) {
        let scene = self.engine.scene(detect_dark());
        render2d::replay(&self.ctx, &scene, self.css_width, self.css_height);
    }
}

/// `Auto` theme answer: a `dark` class on the document root.
fn detect_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .map(|el| el.class_list().contains("dark"))
        .unwrap_or(false)
}

/// Unified mouse/touch coordinate extraction, relative to the canvas.
fn pointer_pos(canvas: &HtmlCanvasElement, event: &Event) -> Option<PixelPos> {
    let rect = canvas.get_bounding_client_rect();
    let (cx, cy) = if let Some(touch) = event.dyn_ref::<TouchEvent>() {
        let t = touch.touches().item(0)?;
        (t.client_x() as f64, t.client_y() as f64)
    } else if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        (mouse.client_x() as f64, mouse.client_y() as f64)
    } else {
        return None;
    };
    Some(PixelPos::new(
        (cx - rect.left()) as f32,
        (cy - rect.top()) as f32,
    ))
}

/// Hand a label prompt to the host callback, or fall back to the browser
/// prompt and resolve it synchronously.
fn request_label(inner: &Rc<RefCell<Inner>>, target: LabelTarget, current: &str) {
    let callback = inner.borrow().on_label_request.clone();
    if let Some(callback) = callback {
        inner.borrow_mut().pending_label = Some(target);
        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(current));
    } else {
        let text = web_sys::window()
            .and_then(|w| w.prompt_with_message_and_default("Enter label", current).ok())
            .flatten();
        let mut b = inner.borrow_mut();
        if b.engine.submit_label(target, text) {
            b.render();
        }
    }
}

fn decode_state(state: JsValue) -> Result<Option<GraphState>, JsValue> {
    if state.is_undefined() || state.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(state)
        .map(Some)
        .map_err(|e| JsValue::from_str(&format!("invalid graph state: {e}")))
}

/// Split a host config object into serde data and its function-valued
/// fields. `JSON.stringify` drops functions, leaving the data part for
/// serde; the callbacks come out via `Reflect`.
fn decode_config(
    config: &JsValue,
) -> Result<(EngineConfig, Option<js_sys::Function>, Option<js_sys::Function>), JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok((EngineConfig::default(), None, None));
    }
    let data = js_sys::JSON::stringify(config)
        .ok()
        .and_then(|s| s.as_string());
    let engine_config = match data {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?,
        None => EngineConfig::default(),
    };
    let get_fn = |name: &str| {
        js_sys::Reflect::get(config, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
    };
    Ok((engine_config, get_fn("onStateChange"), get_fn("onLabelRequest")))
}

fn state_change_listener(callback: js_sys::Function) -> eg_editor::ChangeListener {
    Box::new(move |state: &GraphState| {
        let Ok(json) = serde_json::to_string(state) else {
            return;
        };
        if let Ok(value) = js_sys::JSON::parse(&json) {
            let _ = callback.call1(&JsValue::NULL, &value);
        }
    })
}

/// The browser-facing controller.
#[wasm_bindgen]
pub struct GraphCanvas {
    inner: Rc<RefCell<Inner>>,
    /// Every (event type, listener) pair registered on the canvas, for
    /// removal in `destroy()`. One closure may back several pairs.
    canvas_bindings: Vec<(&'static str, js_sys::Function)>,
    /// Owning storage that keeps the listener closures alive.
    pointer_closures: Vec<Closure<dyn FnMut(Event)>>,
    window_resize: Option<Closure<dyn FnMut()>>,
    observer: Option<ResizeObserver>,
    observer_cb: Option<Closure<dyn FnMut()>>,
    debounce_cb: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl GraphCanvas {
    /// Mount into `container`. `state` is a previously exported snapshot
    /// (or null/undefined for a fresh diagram); `config` recognizes
    /// `initialCurves`, `theme`, `readOnly`, `axisLabels`, `margin`,
    /// `onStateChange` and `onLabelRequest`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        state: JsValue,
        config: JsValue,
    ) -> Result<GraphCanvas, JsValue> {
        let (engine_config, on_state_change, on_label_request) = decode_config(&config)?;
        let state = decode_state(state)?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_class_name("ge-canvas");
        let style = canvas.style();
        style.set_property("display", "block")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("touch-action", "none")?;
        style.set_property("cursor", "crosshair")?;
        container.append_child(&canvas)?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let mut engine = GraphEngine::new(
            Viewport {
                width: 100.0,
                height: 100.0,
            },
            state,
            engine_config,
        );
        if let Some(callback) = on_state_change {
            engine.set_on_change(Some(state_change_listener(callback)));
        }

        let inner = Rc::new(RefCell::new(Inner {
            engine,
            canvas: canvas.clone(),
            ctx,
            container: container.clone(),
            pending_label: None,
            on_label_request,
            resize_timeout: None,
            css_width: 0.0,
            css_height: 0.0,
        }));
        inner.borrow_mut().size_canvas();

        let mut this = GraphCanvas {
            inner,
            canvas_bindings: Vec::new(),
            pointer_closures: Vec::new(),
            window_resize: None,
            observer: None,
            observer_cb: None,
            debounce_cb: None,
        };
        this.bind_pointer_events()?;
        this.bind_resize_handling(&container)?;
        this.inner.borrow().render();
        Ok(this)
    }

    // ─── Engine API passthrough ──────────────────────────────────────────

    /// Switch the interaction mode by wire name (`"curve"`, `"draw-curve"`,
    /// `"paint"`, `"line"`, `"quota"`, `"reference"`, `"label"`,
    /// `"eraser"`). Returns `false` for an unknown name.
    pub fn set_mode(&self, mode: &str) -> bool {
        let Some(mode) = Mode::from_name(mode) else {
            log::warn!("unknown mode {mode:?}");
            return false;
        };
        let mut b = self.inner.borrow_mut();
        b.engine.set_mode(mode);
        b.render();
        true
    }

    pub fn get_mode(&self) -> String {
        self.inner.borrow().engine.mode().as_name().to_string()
    }

    /// Add a curve. `spec` may be null/undefined or a partial
    /// `{id, type, label, color, p1, p2}` object. Returns the new id.
    pub fn add_curve(&self, spec: JsValue) -> Result<String, JsValue> {
        let spec: CurveSpec = if spec.is_undefined() || spec.is_null() {
            CurveSpec::default()
        } else {
            serde_wasm_bindgen::from_value(spec)
                .map_err(|e| JsValue::from_str(&format!("invalid curve spec: {e}")))?
        };
        let mut b = self.inner.borrow_mut();
        let id = b.engine.add_curve(&spec);
        b.render();
        Ok(id.as_str().to_string())
    }

    /// Remove a curve by id, or the current selection when omitted.
    pub fn remove_curve(&self, id: Option<String>) {
        let mut b = self.inner.borrow_mut();
        b.engine.remove_curve(id.map(|s| EntityId::intern(&s)));
        b.render();
    }

    pub fn clear_paint(&self) {
        let mut b = self.inner.borrow_mut();
        b.engine.clear_paint();
        b.render();
    }

    pub fn clear_all(&self) {
        let mut b = self.inner.borrow_mut();
        b.engine.clear_all();
        b.render();
    }

    pub fn set_paint_color(&self, color: &str) -> bool {
        let Some(color) = Color::from_hex(color) else {
            return false;
        };
        let mut b = self.inner.borrow_mut();
        b.engine.set_paint_color(color);
        b.render();
        true
    }

    pub fn set_grid_visible(&self, visible: bool) {
        let mut b = self.inner.borrow_mut();
        b.engine.set_grid_visible(visible);
        b.render();
    }

    pub fn undo(&self) -> bool {
        let mut b = self.inner.borrow_mut();
        let changed = b.engine.undo();
        if changed {
            b.render();
        }
        changed
    }

    pub fn redo(&self) -> bool {
        let mut b = self.inner.borrow_mut();
        let changed = b.engine.redo();
        if changed {
            b.render();
        }
        changed
    }

    /// Export the full state as a plain JS object.
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        let json = serde_json::to_string(self.inner.borrow().engine.state())
            .map_err(|e| JsValue::from_str(&format!("export failed: {e}")))?;
        js_sys::JSON::parse(&json)
    }

    /// Replace the state with an imported snapshot (undoable).
    pub fn from_json(&self, state: JsValue) -> Result<(), JsValue> {
        let imported: GraphState = serde_wasm_bindgen::from_value(state)
            .map_err(|e| JsValue::from_str(&format!("invalid graph state: {e}")))?;
        let mut b = self.inner.borrow_mut();
        b.engine.restore(imported);
        b.render();
        Ok(())
    }

    /// Rasterized PNG snapshot as a data URL.
    pub fn to_png(&self) -> Result<String, JsValue> {
        self.inner.borrow().canvas.to_data_url()
    }

    /// Apply a partial config update (`theme`, `readOnly`, `axisLabels`,
    /// `onStateChange`).
    pub fn update_config(&self, patch: JsValue) -> Result<(), JsValue> {
        if patch.is_undefined() || patch.is_null() {
            return Ok(());
        }
        let data = js_sys::JSON::stringify(&patch)
            .ok()
            .and_then(|s| s.as_string());
        let decoded: ConfigPatch = match data {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?,
            None => ConfigPatch::default(),
        };
        let swap_listener = js_sys::Reflect::get(&patch, &JsValue::from_str("onStateChange"))
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok());
        let mut b = self.inner.borrow_mut();
        b.engine.update_config(&decoded);
        if let Some(callback) = swap_listener {
            b.engine.set_on_change(Some(state_change_listener(callback)));
        }
        b.render();
        Ok(())
    }

    /// Resolve a pending label prompt opened through `onLabelRequest`.
    /// `null`/omitted means the dialog was cancelled. Returns whether the
    /// state changed.
    pub fn submit_label(&self, text: Option<String>) -> bool {
        let mut b = self.inner.borrow_mut();
        let Some(target) = b.pending_label.take() else {
            return false;
        };
        let changed = b.engine.submit_label(target, text);
        if changed {
            b.render();
        }
        changed
    }

    /// Force a re-render (e.g. after the host flips its dark class).
    pub fn render(&self) {
        self.inner.borrow().render();
    }

    /// Remove every listener, disconnect the resize observer and cancel any
    /// pending debounce. Must be called before the host discards the
    /// container.
    pub fn destroy(&mut self) {
        for (name, listener) in self.canvas_bindings.drain(..) {
            let _ = self
                .inner
                .borrow()
                .canvas
                .remove_event_listener_with_callback(name, &listener);
        }
        self.pointer_closures.clear();
        if let Some(window) = web_sys::window() {
            if let Some(closure) = self.window_resize.take() {
                let _ = window.remove_event_listener_with_callback(
                    "resize",
                    closure.as_ref().unchecked_ref(),
                );
            }
            if let Some(handle) = self.inner.borrow_mut().resize_timeout.take() {
                window.clear_timeout_with_handle(handle);
            }
        }
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.observer_cb = None;
        self.debounce_cb = None;
    }
}

impl GraphCanvas {
    fn bind_pointer_events(&mut self) -> Result<(), JsValue> {
        let on_down = {
            let inner = Rc::clone(&self.inner);
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let reaction = {
                    let mut b = inner.borrow_mut();
                    let Some(pos) = pointer_pos(&b.canvas, &event) else {
                        return;
                    };
                    let reaction = b.engine.pointer_down(pos);
                    if reaction != PointerReaction::None {
                        event.prevent_default();
                        b.render();
                    }
                    reaction
                };
                if let PointerReaction::LabelPrompt { target, current } = reaction {
                    request_label(&inner, target, &current);
                }
            })
        };
        let on_move = {
            let inner = Rc::clone(&self.inner);
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let mut b = inner.borrow_mut();
                let Some(pos) = pointer_pos(&b.canvas, &event) else {
                    return;
                };
                if b.engine.pointer_move(pos) {
                    event.prevent_default();
                    b.render();
                }
            })
        };
        let on_up = {
            let inner = Rc::clone(&self.inner);
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                inner.borrow_mut().engine.pointer_up();
            })
        };
        let on_context = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
        });

        let canvas = self.inner.borrow().canvas.clone();
        let passive_off = AddEventListenerOptions::new();
        passive_off.set_passive(false);

        let down_fn: js_sys::Function = on_down.as_ref().unchecked_ref::<js_sys::Function>().clone();
        let move_fn: js_sys::Function = on_move.as_ref().unchecked_ref::<js_sys::Function>().clone();
        let up_fn: js_sys::Function = on_up.as_ref().unchecked_ref::<js_sys::Function>().clone();
        let context_fn: js_sys::Function =
            on_context.as_ref().unchecked_ref::<js_sys::Function>().clone();

        canvas.add_event_listener_with_callback("mousedown", &down_fn)?;
        canvas.add_event_listener_with_callback("mousemove", &move_fn)?;
        canvas.add_event_listener_with_callback("mouseup", &up_fn)?;
        canvas.add_event_listener_with_callback("mouseleave", &up_fn)?;
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            &down_fn,
            &passive_off,
        )?;
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            &move_fn,
            &passive_off,
        )?;
        canvas.add_event_listener_with_callback("touchend", &up_fn)?;
        canvas.add_event_listener_with_callback("contextmenu", &context_fn)?;

        self.canvas_bindings = vec![
            ("mousedown", down_fn.clone()),
            ("mousemove", move_fn.clone()),
            ("mouseup", up_fn.clone()),
            ("mouseleave", up_fn.clone()),
            ("touchstart", down_fn),
            ("touchmove", move_fn),
            ("touchend", up_fn),
            ("contextmenu", context_fn),
        ];
        self.pointer_closures = vec![on_down, on_move, on_up, on_context];
        Ok(())
    }

    fn bind_resize_handling(&mut self, container: &HtmlElement) -> Result<(), JsValue> {
        let debounce = {
            let inner = Rc::clone(&self.inner);
            Closure::<dyn FnMut()>::new(move || {
                let mut b = inner.borrow_mut();
                b.resize_timeout = None;
                b.size_canvas();
                b.render();
            })
        };
        let debounce_fn: js_sys::Function = debounce.as_ref().unchecked_ref::<js_sys::Function>().clone();

        let schedule = move |inner: &Rc<RefCell<Inner>>| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let mut b = inner.borrow_mut();
            if let Some(handle) = b.resize_timeout.take() {
                window.clear_timeout_with_handle(handle);
            }
            if let Ok(handle) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                &debounce_fn,
                RESIZE_DEBOUNCE_MS,
            ) {
                b.resize_timeout = Some(handle);
            }
        };

        let observer_cb = {
            let inner = Rc::clone(&self.inner);
            let schedule = schedule.clone();
            Closure::<dyn FnMut()>::new(move || schedule(&inner))
        };
        let observer = ResizeObserver::new(observer_cb.as_ref().unchecked_ref())?;
        observer.observe(container);

        // Window resize fallback for hosts without ResizeObserver layout
        // changes (e.g. print scaling).
        let window_resize = {
            let inner = Rc::clone(&self.inner);
            Closure::<dyn FnMut()>::new(move || schedule(&inner))
        };
        if let Some(window) = web_sys::window() {
            window.add_event_listener_with_callback(
                "resize",
                window_resize.as_ref().unchecked_ref(),
            )?;
        }

        self.observer = Some(observer);
        self.observer_cb = Some(observer_cb);
        self.window_resize = Some(window_resize);
        self.debounce_cb = Some(debounce);
        Ok(())
    }
}
