use std::cell::RefCell;
use std::rc::Weak;

use glam::Vec2;
use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MouseEvent, Window};

use super::WebState;
use crate::controller::ControlEvent;
use crate::input::{KeyCode, MouseButtons};
use crate::material::MaterialChannel;

fn dispatch(state: &Weak<RefCell<WebState>>, event: ControlEvent) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let Ok(mut state) = state.try_borrow_mut() else {
        return;
    };
    let WebState { demo, labels, .. } = &mut *state;
    demo.handle(event, labels);
}

fn key_code(event: &web_sys::Event) -> Option<KeyCode> {
    let event = event.dyn_ref::<KeyboardEvent>()?;
    KeyCode::from_code(&event.code()).or_else(|| KeyCode::from_name(&event.key()))
}

/// Keyboard on the window, drags on the canvas, and one listener per
/// material slider present in the page.
pub(super) fn attach(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    state: Weak<RefCell<WebState>>,
) -> Vec<EventListener> {
    let mut listeners = Vec::new();

    {
        let state = Weak::clone(&state);
        listeners.push(EventListener::new(window, "keydown", move |event| {
            if let Some(key) = key_code(event) {
                dispatch(&state, ControlEvent::KeyDown(key));
            }
        }));
    }

    {
        let state = Weak::clone(&state);
        listeners.push(EventListener::new(window, "keyup", move |event| {
            if let Some(key) = key_code(event) {
                dispatch(&state, ControlEvent::KeyUp(key));
            }
        }));
    }

    {
        let state = Weak::clone(&state);
        listeners.push(EventListener::new(canvas, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            dispatch(
                &state,
                ControlEvent::PointerMoved {
                    buttons: MouseButtons::from_bits(event.buttons()),
                    movement: Vec2::new(event.movement_x() as f32, event.movement_y() as f32),
                },
            );
        }));
    }

    for channel in MaterialChannel::ALL {
        let Some(slider) = document
            .get_element_by_id(channel.element_id())
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
        else {
            continue;
        };
        let state = Weak::clone(&state);
        let input = slider.clone();
        listeners.push(EventListener::new(&slider, "input", move |_| {
            let value = input.value_as_number();
            if value.is_finite() {
                dispatch(
                    &state,
                    ControlEvent::MaterialChanged {
                        channel,
                        value: value as f32,
                    },
                );
            }
        }));
    }

    log::debug!("attached {} DOM listeners", listeners.len());
    listeners
}
