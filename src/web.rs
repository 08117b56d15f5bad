#![cfg(target_arch = "wasm32")]

//! Browser front end. Binds the demo to a canvas and the material panel
//! and drives it from `requestAnimationFrame`.

mod listeners;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use gloo_events::EventListener;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, HtmlCanvasElement};

use crate::app::{DemoRenderer, DemoState};
use crate::config::DemoConfig;
use crate::controller::LabelSink;
use crate::frame::{FrameLoop, Tick};
use crate::material::MaterialGroup;
use crate::render::GpuContext;
use crate::session::DemoKind;
use crate::texture::fetch_bytes;
use crate::transform::aspect_ratio;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

fn js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{err:#}"))
}

/// Writes labels into the page and replaces the canvas with a heading when
/// something goes wrong.
struct DomLabels {
    document: Document,
    canvas: HtmlCanvasElement,
}

impl LabelSink for DomLabels {
    fn set_label(&mut self, group: MaterialGroup, text: &str) {
        if let Some(element) = self.document.get_element_by_id(group.element_id()) {
            element.set_inner_html(text);
        }
    }

    fn show_diagnostic(&mut self, message: &str) {
        log::error!("{message}");
        self.canvas.remove();
        let Some(body) = self.document.body() else {
            return;
        };
        if let Ok(heading) = self.document.create_element("h1") {
            heading.set_inner_html(message);
            let _ = body.append_child(&heading);
        }
    }
}

struct WebState {
    gpu: GpuContext,
    renderer: DemoRenderer,
    demo: DemoState,
    frames: FrameLoop,
    labels: DomLabels,
    listeners: Vec<EventListener>,
}

impl WebState {
    fn render_frame(&mut self) -> Result<Tick> {
        let Self {
            gpu,
            renderer,
            demo,
            frames,
            labels,
            ..
        } = self;
        frames.tick(|_| renderer.frame(gpu, demo, labels))
    }
}

#[wasm_bindgen]
pub struct WebDemo {
    inner: Rc<RefCell<WebState>>,
}

#[wasm_bindgen]
impl WebDemo {
    /// Builds a demo from a `<demo>` XML document and binds it to the canvas
    /// with id `canvas_id`. Asset paths in the document are fetched as URLs.
    pub async fn create(canvas_id: String, config_xml: String) -> Result<WebDemo, JsValue> {
        Self::build(&canvas_id, &config_xml).await.map_err(js_error)
    }

    /// Starts the self-rescheduling frame loop.
    pub fn start(&self) -> Result<(), JsValue> {
        schedule_animation_loop(Rc::clone(&self.inner)).map_err(js_error)
    }

    /// Stops the frame loop at its next frame and detaches all listeners.
    pub fn stop(&self) {
        let mut state = self.inner.borrow_mut();
        state.frames.cancel_handle().cancel();
        state.listeners.clear();
    }
}

impl WebDemo {
    async fn build(canvas_id: &str, config_xml: &str) -> Result<WebDemo> {
        let config = DemoConfig::from_xml(config_xml)?;
        let window = window().ok_or_else(|| anyhow!("window not available"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("document not available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| anyhow!("canvas element `{canvas_id}` not found"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| anyhow!("element `{canvas_id}` is not a canvas"))?;

        let aspect = aspect_ratio(canvas.width(), canvas.height());
        let demo = match config.kind {
            DemoKind::Lit => {
                let path = config
                    .mesh
                    .as_ref()
                    .ok_or_else(|| anyhow!("lit demo has no mesh path"))?;
                let url = path.to_string_lossy();
                let bytes = fetch_bytes(&url)
                    .await
                    .map_err(|message| anyhow!("failed to fetch mesh {url}: {message}"))?;
                let source = String::from_utf8(bytes)
                    .with_context(|| format!("mesh {url} is not valid UTF-8"))?;
                DemoState::lit(&config, &source, aspect)?
            }
            DemoKind::Textured => DemoState::textured(&config, aspect, true)?,
        };

        let gpu = GpuContext::for_canvas(canvas.clone()).await?;
        let renderer = DemoRenderer::new(&gpu, &demo);
        let mut labels = DomLabels {
            document: document.clone(),
            canvas: canvas.clone(),
        };
        if config.kind == DemoKind::Lit {
            demo.publish_labels(&mut labels);
        }

        let inner = Rc::new(RefCell::new(WebState {
            gpu,
            renderer,
            demo,
            frames: FrameLoop::new(),
            labels,
            listeners: Vec::new(),
        }));
        let listeners = listeners::attach(&window, &document, &canvas, Rc::downgrade(&inner));
        inner.borrow_mut().listeners = listeners;
        Ok(WebDemo { inner })
    }
}

fn schedule_animation_loop(app: Rc<RefCell<WebState>>) -> Result<()> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&callback);

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let tick = app.borrow_mut().render_frame();
        match tick {
            Ok(Tick::Stop) => {
                next.borrow_mut().take();
                return;
            }
            Ok(Tick::Reschedule) => {}
            Err(err) => log::error!("frame failed: {err:#}"),
        }
        if let Some(closure) = next.borrow().as_ref() {
            if let Err(err) = request_frame(closure) {
                log::error!("unable to schedule frame: {err:#}");
            }
        }
    }) as Box<dyn FnMut()>));

    let first = callback.borrow();
    let closure = first
        .as_ref()
        .ok_or_else(|| anyhow!("animation callback missing"))?;
    request_frame(closure)
}

fn request_frame(closure: &Closure<dyn FnMut()>) -> Result<()> {
    let window = window().ok_or_else(|| anyhow!("window not available"))?;
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
    Ok(())
}
