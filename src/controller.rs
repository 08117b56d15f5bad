//! Turns raw input events into session state changes.

use std::collections::HashMap;

use glam::Vec2;
use log::{error, info};

use crate::input::{KeyCode, MouseButtons, NamedKey};
use crate::material::{MaterialChannel, MaterialGroup};
use crate::session::Session;

/// Degrees of rotation per pixel of pointer movement.
pub const ROTATE_SPEED: f32 = 0.3515625;

/// Input understood by the [`InteractionController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Pointer moved by `movement` pixels while `buttons` were held.
    PointerMoved {
        buttons: MouseButtons,
        movement: Vec2,
    },
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// A material slider now reads `value`.
    MaterialChanged {
        channel: MaterialChannel,
        value: f32,
    },
}

/// What an event changed, so the caller knows what to push to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEffect {
    None,
    Rotated,
    Material(MaterialGroup),
}

/// Destination for formatted labels and one-off diagnostics.
pub trait LabelSink {
    fn set_label(&mut self, group: MaterialGroup, text: &str);

    fn show_diagnostic(&mut self, message: &str) {
        error!("{message}");
    }
}

impl LabelSink for HashMap<MaterialGroup, String> {
    fn set_label(&mut self, group: MaterialGroup, text: &str) {
        self.insert(group, text.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionController {
    rotate_speed: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(ROTATE_SPEED)
    }
}

impl InteractionController {
    pub fn new(rotate_speed: f32) -> Self {
        Self { rotate_speed }
    }

    pub fn handle(
        &self,
        session: &mut Session,
        event: ControlEvent,
        labels: &mut dyn LabelSink,
    ) -> ControlEffect {
        match event {
            ControlEvent::PointerMoved { buttons, movement } => {
                if !buttons.is_primary_only() || movement == Vec2::ZERO {
                    return ControlEffect::None;
                }
                session.drag_pose_mut().turn(
                    movement.x * self.rotate_speed,
                    movement.y * self.rotate_speed,
                );
                ControlEffect::Rotated
            }
            ControlEvent::KeyDown(key) => {
                session.keys.set_key_down(key);
                ControlEffect::None
            }
            ControlEvent::KeyUp(key) => {
                session.keys.set_key_up(key);
                ControlEffect::None
            }
            ControlEvent::MaterialChanged { channel, value } => {
                let group = session.material.apply(channel, value);
                labels.set_label(group, &session.material.label(group));
                ControlEffect::Material(group)
            }
        }
    }

    /// Writes every material label once, e.g. at startup.
    pub fn publish_labels(&self, session: &Session, labels: &mut dyn LabelSink) {
        for group in MaterialGroup::ALL {
            labels.set_label(group, &session.material.label(group));
        }
    }
}

/// Keyboard stand-in for the slider panel: digits `1`-`7` pick a channel,
/// `Up`/`Down` move it by one slider step within its range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderBank {
    selected: MaterialChannel,
}

impl Default for SliderBank {
    fn default() -> Self {
        Self {
            selected: MaterialChannel::DiffuseR,
        }
    }
}

impl SliderBank {
    pub fn selected(&self) -> MaterialChannel {
        self.selected
    }

    /// Returns the slider event a key press stands for, if any.
    pub fn key_pressed(&mut self, key: KeyCode, session: &Session) -> Option<ControlEvent> {
        let direction = match key {
            KeyCode::Digit(digit @ 1..=7) => {
                self.selected = MaterialChannel::ALL[digit as usize - 1];
                info!("selected material channel {:?}", self.selected);
                return None;
            }
            KeyCode::Named(NamedKey::Up) => 1.0,
            KeyCode::Named(NamedKey::Down) => -1.0,
            _ => return None,
        };
        let (min, max, step) = self.selected.range();
        let current = session.material.value(self.selected);
        let steps = ((current - min) / step).round() + direction;
        let value = (min + steps * step).clamp(min, max);
        Some(ControlEvent::MaterialChanged {
            channel: self.selected,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DemoKind;
    use glam::{Mat4, Vec4};

    fn labels() -> HashMap<MaterialGroup, String> {
        HashMap::new()
    }

    fn drag(x: f32, y: f32) -> ControlEvent {
        ControlEvent::PointerMoved {
            buttons: MouseButtons::PRIMARY,
            movement: Vec2::new(x, y),
        }
    }

    #[test]
    fn horizontal_drag_turns_about_vertical_axis() {
        let mut session = Session::new(DemoKind::Lit);
        let before = session.transforms.parent.rotation;
        let effect = InteractionController::default().handle(
            &mut session,
            drag(10.0, 0.0),
            &mut labels(),
        );
        assert_eq!(effect, ControlEffect::Rotated);
        let expected = Mat4::from_rotation_y((10.0 * 0.3515625f32).to_radians()) * before;
        assert!(session.transforms.parent.rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn drags_accumulate_in_world_space() {
        let mut session = Session::new(DemoKind::Textured);
        let controller = InteractionController::default();
        let mut labels = labels();
        controller.handle(&mut session, drag(0.0, 256.0), &mut labels);
        controller.handle(&mut session, drag(256.0, 0.0), &mut labels);
        let expected = Mat4::from_rotation_y(90f32.to_radians())
            * Mat4::from_rotation_x(90f32.to_radians());
        assert!(session.transforms.local.rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn drag_needs_primary_button_alone() {
        let mut session = Session::new(DemoKind::Lit);
        let before = session.transforms;
        let controller = InteractionController::default();
        let mut labels = labels();
        for bits in [0, 2, 3, 4] {
            let event = ControlEvent::PointerMoved {
                buttons: MouseButtons::from_bits(bits),
                movement: Vec2::new(5.0, 5.0),
            };
            assert_eq!(
                controller.handle(&mut session, event, &mut labels),
                ControlEffect::None
            );
        }
        assert_eq!(session.transforms, before);
    }

    #[test]
    fn shininess_slider_updates_label_and_value() {
        let mut session = Session::new(DemoKind::Lit);
        let mut labels = labels();
        let effect = InteractionController::default().handle(
            &mut session,
            ControlEvent::MaterialChanged {
                channel: MaterialChannel::Shininess,
                value: 5.0,
            },
            &mut labels,
        );
        assert_eq!(effect, ControlEffect::Material(MaterialGroup::Shininess));
        assert_eq!(session.material.shininess, 5.0);
        assert_eq!(
            labels.get(&MaterialGroup::Shininess).map(String::as_str),
            Some("Material Shininess (005):")
        );
    }

    #[test]
    fn diffuse_slider_keeps_other_components() {
        let mut session = Session::new(DemoKind::Lit);
        let mut labels = labels();
        InteractionController::default().handle(
            &mut session,
            ControlEvent::MaterialChanged {
                channel: MaterialChannel::DiffuseG,
                value: 0.5,
            },
            &mut labels,
        );
        assert_eq!(session.material.diffuse, Vec4::new(0.1, 0.5, 1.0, 1.0));
        assert_eq!(
            labels[&MaterialGroup::Diffuse],
            "Material Diffuse RGB (0.10, 0.50, 1.00):"
        );
        assert!(!labels.contains_key(&MaterialGroup::Specular));
    }

    #[test]
    fn keys_are_tracked() {
        let mut session = Session::new(DemoKind::Lit);
        let controller = InteractionController::default();
        let mut labels = labels();
        let w = KeyCode::Character('W');
        controller.handle(&mut session, ControlEvent::KeyDown(w), &mut labels);
        assert!(session.keys.is_key_down(w));
        controller.handle(&mut session, ControlEvent::KeyUp(w), &mut labels);
        assert!(!session.keys.is_key_down(w));
        assert!(labels.is_empty());
    }

    #[test]
    fn publish_labels_writes_all_groups() {
        let session = Session::new(DemoKind::Lit);
        let mut labels = labels();
        InteractionController::default().publish_labels(&session, &mut labels);
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[&MaterialGroup::Shininess], "Material Shininess (100):");
    }

    #[test]
    fn slider_bank_steps_selected_channel() {
        let session = Session::new(DemoKind::Lit);
        let mut bank = SliderBank::default();
        assert_eq!(bank.key_pressed(KeyCode::Digit(7), &session), None);
        assert_eq!(bank.selected(), MaterialChannel::Shininess);
        assert_eq!(
            bank.key_pressed(KeyCode::Named(NamedKey::Down), &session),
            Some(ControlEvent::MaterialChanged {
                channel: MaterialChannel::Shininess,
                value: 99.0
            })
        );
    }

    #[test]
    fn slider_bank_clamps_to_range() {
        let session = Session::new(DemoKind::Lit);
        let mut bank = SliderBank::default();
        bank.key_pressed(KeyCode::Digit(6), &session);
        let Some(ControlEvent::MaterialChanged { channel, value }) =
            bank.key_pressed(KeyCode::Named(NamedKey::Up), &session)
        else {
            panic!("expected a slider event");
        };
        assert_eq!(channel, MaterialChannel::SpecularB);
        assert_eq!(value, 1.0);
        assert_eq!(bank.key_pressed(KeyCode::Digit(9), &session), None);
        assert_eq!(bank.key_pressed(KeyCode::Character('A'), &session), None);
    }
}
