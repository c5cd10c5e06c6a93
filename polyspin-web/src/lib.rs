/// Polyspin Web - Canvas-rendered rotating polyhedron
///
/// The start function mounts onto `<canvas id="viewport">` (creating it when
/// the page has none), wires the control panel and runs the animation loop.
/// `dispose` tears all of it down again.
use std::cell::RefCell;

use wasm_bindgen::prelude::*;

mod app;
pub mod controls;
pub mod engine;
pub mod error;

pub use app::{mount, Mounted};
pub use engine::CanvasEngine;
pub use error::WebError;

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let mounted = mount(controls::CANVAS_ID)?;
    MOUNTED.with(|slot| slot.replace(Some(mounted)));
    Ok(())
}

/// Stop animating, detach every listener and release the mesh
#[wasm_bindgen]
pub fn dispose() {
    let mounted = MOUNTED.with(|slot| slot.borrow_mut().take());
    if let Some(mounted) = mounted {
        drop(mounted);
        tracing::info!("polyspin disposed");
    }
}
