/// Browser host: DOM wiring and the animation loop around a `Scene`
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use nalgebra::Point2;
use polyspin_core::{AnimationMode, Config, MouseButton, PointerEvent, Scene, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, KeyboardEvent, MouseEvent, TouchEvent, Window,
};

use crate::controls::{
    expand_button_text, parse_sides, play_pause_label, Slider, CONTROLS_CONTENT_ID,
    CONTROL_HEADER_ID, EXPAND_BUTTON_ID, PLAY_PAUSE_ID, SIDES_RADIO_NAME, SIDES_SELECT_ID,
};
use crate::engine::CanvasEngine;
use crate::error::WebError;

/// Panel elements found at startup. Any of them may be missing.
struct Controls {
    play_pause: Option<HtmlElement>,
    radios: Vec<HtmlInputElement>,
    sides_select: Option<HtmlSelectElement>,
    sliders: Vec<(Slider, HtmlInputElement)>,
    header: Option<HtmlElement>,
    expand_button: Option<HtmlElement>,
    content: Option<HtmlElement>,
}

impl Controls {
    fn find(document: &Document) -> Self {
        Self {
            play_pause: optional(document, PLAY_PAUSE_ID),
            radios: sides_radios(document),
            sides_select: optional(document, SIDES_SELECT_ID),
            sliders: Slider::ALL
                .into_iter()
                .filter_map(|slider| optional(document, slider.id()).map(|input| (slider, input)))
                .collect(),
            header: optional(document, CONTROL_HEADER_ID),
            expand_button: optional(document, EXPAND_BUTTON_ID),
            content: optional(document, CONTROLS_CONTENT_ID),
        }
    }

    /// Defaults, overridden by whatever the page's controls start out showing
    fn initial_config(&self) -> Config {
        let mut config = Config::default();
        for (slider, input) in &self.sliders {
            if let Some(value) = slider.parse(&input.value()) {
                slider.seed(&mut config.shape, value);
            }
        }

        let checked = self.radios.iter().find(|radio| radio.checked());
        if let Some(radio) = checked {
            config.shape.face_count = parse_sides(&radio.value());
        } else if let Some(select) = &self.sides_select {
            config.shape.face_count = parse_sides(&select.value());
        }

        if let Some(content) = &self.content {
            if content.style().get_property_value("display").ok().as_deref() == Some("none") {
                config.panel.expanded = false;
            }
        }
        config
    }
}

fn optional<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    let element = document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok());
    if element.is_none() {
        tracing::warn!(id, "control not found, skipping");
    }
    element
}

fn sides_radios(document: &Document) -> Vec<HtmlInputElement> {
    let selector = format!("input[name=\"{SIDES_RADIO_NAME}\"]");
    let Ok(nodes) = document.query_selector_all(&selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect()
}

/// Scene plus the DOM it reflects its state into
struct App {
    scene: Scene<CanvasEngine>,
    document: Document,
    controls: Controls,
}

impl App {
    fn toggle(&mut self) {
        if let Some(mode) = self.scene.toggle() {
            self.show_mode(mode);
        }
    }

    fn pointer(&mut self, event: PointerEvent) {
        if let Some(mode) = self.scene.handle_pointer(event) {
            self.show_mode(mode);
        }
    }

    fn select_sides(&mut self, raw: &str) {
        self.scene.set_face_count(parse_sides(raw));
        self.show_sides();
    }

    fn slider_input(&mut self, slider: Slider, raw: &str) {
        let Some(value) = slider.parse(raw) else {
            tracing::trace!(id = slider.id(), raw, "ignoring slider value");
            return;
        };
        if !slider.apply(&mut self.scene, value) {
            tracing::debug!(id = slider.id(), value, "slider value rejected");
        }
        // Mirror the value in effect, not the rejected one
        let current = slider.current(self.scene.shape());
        self.set_text(&slider.readout_id(), &slider.readout(current));
        if current != value {
            self.reset_slider(slider, current);
        }
    }

    fn reset_slider(&self, slider: Slider, value: f32) {
        let input = self.controls.sliders.iter().find(|(s, _)| *s == slider);
        if let Some((_, input)) = input {
            input.set_value(&value.to_string());
        }
    }

    fn toggle_panel(&mut self) {
        let expanded = self.scene.toggle_panel();
        self.show_panel(expanded);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.scene.resize(viewport);
    }

    fn show_mode(&self, mode: AnimationMode) {
        if let Some(button) = &self.controls.play_pause {
            button.set_text_content(Some(play_pause_label(mode)));
        }
    }

    fn show_sides(&self) {
        let value = self.scene.shape().face_count.faces().to_string();
        for radio in &self.controls.radios {
            radio.set_checked(radio.value() == value);
        }
        if let Some(select) = &self.controls.sides_select {
            select.set_value(&value);
        }
    }

    fn show_panel(&self, expanded: bool) {
        if let Some(content) = &self.controls.content {
            let display = if expanded { "block" } else { "none" };
            if let Err(err) = content.style().set_property("display", display) {
                tracing::warn!(?err, "failed to set panel display");
            }
        }
        if let Some(button) = &self.controls.expand_button {
            button.set_text_content(Some(expand_button_text(expanded)));
        }
    }

    /// Bring every control in line with the scene
    fn show_all(&self) {
        self.show_mode(self.scene.mode());
        self.show_sides();
        self.show_panel(self.scene.panel_expanded());
        for (slider, input) in &self.controls.sliders {
            let value = slider.current(self.scene.shape());
            input.set_value(&value.to_string());
            self.set_text(&slider.readout_id(), &slider.readout(value));
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(element) = self.document.get_element_by_id(id) {
            element.set_text_content(Some(text));
        }
    }
}

/// A registered DOM listener, removed again on drop
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        let function: &js_sys::Function = self.callback.as_ref().unchecked_ref();
        if let Err(err) = self.target.remove_event_listener_with_callback(self.event, function) {
            tracing::warn!(event = self.event, ?err, "failed to remove listener");
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Self-rescheduling `requestAnimationFrame` loop
struct AnimationLoop {
    window: Window,
    callback: FrameCallback,
    request: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    fn start(window: &Window, app: Rc<RefCell<App>>) -> Self {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let request = Rc::new(Cell::new(None));

        let next = Rc::clone(&callback);
        let pending = Rc::clone(&request);
        let frame_window = window.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.scene.frame();
            }
            pending.set(schedule(&frame_window, &next));
        }) as Box<dyn FnMut()>));

        request.set(schedule(window, &callback));
        Self {
            window: window.clone(),
            callback,
            request,
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        if let Some(id) = self.request.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                tracing::warn!(?err, "failed to cancel animation frame");
            }
        }
        // The closure holds a handle to its own cell
        self.callback.borrow_mut().take();
    }
}

fn schedule(window: &Window, callback: &FrameCallback) -> Option<i32> {
    let guard = callback.borrow();
    let closure = guard.as_ref()?;
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => Some(id),
        Err(err) => {
            tracing::error!(?err, "requestAnimationFrame failed");
            None
        }
    }
}

/// A running app. Dropping it stops the loop, detaches every listener and
/// releases the mesh.
pub struct Mounted {
    listeners: Vec<Listener>,
    animation: Option<AnimationLoop>,
    app: Rc<RefCell<App>>,
}

impl Mounted {
    fn bind<F>(&mut self, target: &EventTarget, event: &'static str, handler: F) -> Result<(), WebError>
    where
        F: Fn(&mut App, &Event) + 'static,
    {
        let app = Rc::clone(&self.app);
        let callback = Closure::wrap(Box::new(move |event: Event| match app.try_borrow_mut() {
            Ok(mut app) => handler(&mut app, &event),
            Err(_) => tracing::trace!(event = %event.type_(), "app busy, dropping event"),
        }) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: target.clone(),
            event,
            callback,
        });
        Ok(())
    }

    fn bind_viewport(&mut self, canvas: &HtmlCanvasElement) -> Result<(), WebError> {
        self.bind(canvas, "mousedown", |app, event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                app.pointer(PointerEvent::MouseDown {
                    button: MouseButton::from_dom(mouse.button()),
                    position: client_position(mouse),
                });
            }
        })?;
        self.bind(canvas, "mousemove", |app, event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                app.pointer(PointerEvent::MouseMove {
                    position: client_position(mouse),
                });
            }
        })?;
        self.bind(canvas, "mouseup", |app, event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                app.pointer(PointerEvent::MouseUp {
                    button: MouseButton::from_dom(mouse.button()),
                });
            }
        })?;

        self.bind(canvas, "touchstart", |app, event| {
            let Some((touch_count, first)) = touches(event) else {
                return;
            };
            if touch_count == 1 {
                event.prevent_default();
            }
            if let Some(position) = first {
                app.pointer(PointerEvent::TouchStart {
                    touch_count,
                    position,
                });
            }
        })?;
        self.bind(canvas, "touchmove", |app, event| {
            if let Some((touch_count, Some(position))) = touches(event) {
                app.pointer(PointerEvent::TouchMove {
                    touch_count,
                    position,
                });
            }
        })?;
        self.bind(canvas, "touchend", |app, event| {
            let Some((remaining, _)) = touches(event) else {
                return;
            };
            if remaining == 0 {
                event.prevent_default();
            }
            app.pointer(PointerEvent::TouchEnd { remaining });
        })?;
        Ok(())
    }

    fn bind_window(&mut self, window: &Window) -> Result<(), WebError> {
        let resized = window.clone();
        self.bind(window, "resize", move |app, _| {
            app.resize(window_viewport(&resized));
        })?;
        self.bind(window, "keydown", |app, event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                if key.code() == "Space" {
                    key.prevent_default();
                    app.toggle();
                }
            }
        })?;
        Ok(())
    }

    fn bind_controls(&mut self) -> Result<(), WebError> {
        let (play_pause, radios, sides_select, sliders, header) = {
            let app = self.app.borrow();
            let controls = &app.controls;
            (
                controls.play_pause.clone(),
                controls.radios.clone(),
                controls.sides_select.clone(),
                controls.sliders.clone(),
                controls.header.clone(),
            )
        };

        if let Some(button) = play_pause {
            self.bind(&button, "click", |app, _| app.toggle())?;
        }
        for radio in radios {
            let input = radio.clone();
            self.bind(&radio, "change", move |app, _| app.select_sides(&input.value()))?;
        }
        if let Some(select) = sides_select {
            let input = select.clone();
            self.bind(&select, "change", move |app, _| app.select_sides(&input.value()))?;
        }
        for (slider, input) in sliders {
            let source = input.clone();
            self.bind(&input, "input", move |app, _| {
                app.slider_input(slider, &source.value())
            })?;
        }
        if let Some(header) = header {
            self.bind(&header, "click", |app, _| app.toggle_panel())?;
        }
        Ok(())
    }
}

fn client_position(mouse: &MouseEvent) -> Point2<f32> {
    Point2::new(mouse.client_x() as f32, mouse.client_y() as f32)
}

/// Touch count and first touch position of a touch event
fn touches(event: &Event) -> Option<(usize, Option<Point2<f32>>)> {
    let touch_event = event.dyn_ref::<TouchEvent>()?;
    let list = touch_event.touches();
    let first = list
        .get(0)
        .map(|touch| Point2::new(touch.client_x() as f32, touch.client_y() as f32));
    Some((list.length() as usize, first))
}

fn window_viewport(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .map_or(0, |v| v.max(0.0) as u32)
    };
    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
}

fn find_or_create_canvas(document: &Document, id: &str) -> Result<HtmlCanvasElement, WebError> {
    if let Some(element) = document.get_element_by_id(id) {
        return element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| WebError::MissingElement(id.to_string()));
    }

    let body = document
        .body()
        .ok_or_else(|| WebError::MissingElement("body".to_string()))?;
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| WebError::MissingElement(id.to_string()))?;
    canvas.set_id(id);
    body.append_child(&canvas)?;
    tracing::debug!(id, "created canvas");
    Ok(canvas)
}

/// Build the scene on the page's canvas, wire every control and start
/// animating
pub fn mount(canvas_id: &str) -> Result<Mounted, WebError> {
    let window = web_sys::window().ok_or_else(|| WebError::MissingElement("window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| WebError::MissingElement("document".to_string()))?;

    let canvas = find_or_create_canvas(&document, canvas_id)?;
    let controls = Controls::find(&document);
    let config = controls.initial_config();
    let viewport = window_viewport(&window);
    let scene = Scene::new(CanvasEngine::new(canvas.clone())?, &config, viewport);

    let app = App {
        scene,
        document,
        controls,
    };
    app.show_all();

    let mut mounted = Mounted {
        listeners: Vec::new(),
        animation: None,
        app: Rc::new(RefCell::new(app)),
    };
    mounted.bind_viewport(&canvas)?;
    mounted.bind_window(&window)?;
    mounted.bind_controls()?;
    mounted.animation = Some(AnimationLoop::start(&window, Rc::clone(&mounted.app)));

    tracing::info!(
        width = viewport.width,
        height = viewport.height,
        shape = config.shape.face_count.name(),
        listeners = mounted.listeners.len(),
        "polyspin mounted"
    );
    Ok(mounted)
}
