use std::collections::HashMap;

use crate::coords::Vec2;

use super::types::{Button, InputEvent, KeyState, MouseButtonState, PointerMoveEvent};

/// Most recent raw state reported by the host, between polls.
///
/// Every button ever observed keeps an entry so its counter keeps moving
/// after release.
#[derive(Debug, Default, Clone)]
pub struct LatestInput {
    pressed: HashMap<Button, bool>,
    pointer: Vec2,
}

impl LatestInput {
    pub fn apply_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key { key, state, .. } => {
                self.pressed.insert(Button::Key(*key), *state == KeyState::Pressed);
            }
            InputEvent::PointerButton { button, state } => {
                self.pressed.insert(Button::Pointer(*button), *state == MouseButtonState::Pressed);
            }
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer = Vec2::new(*x, *y);
            }
            InputEvent::Focused(false) => {
                // No release events arrive once focus is gone.
                for held in self.pressed.values_mut() {
                    *held = false;
                }
            }
            InputEvent::Focused(true) => {}
        }
    }

    pub fn is_down(&self, button: Button) -> bool {
        self.pressed.get(&button).copied().unwrap_or(false)
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub(crate) fn buttons(&self) -> impl Iterator<Item = (Button, bool)> + '_ {
        self.pressed.iter().map(|(b, down)| (*b, *down))
    }
}
