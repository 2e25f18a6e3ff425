use std::collections::HashMap;

use crate::coords::Vec2;

use super::latest::LatestInput;
use super::types::{Button, InputEvent, Key, MouseButton};

/// Polled input, advanced once per simulation step.
///
/// Counters are signed press durations in steps: `1, 2, 3, ...` while held,
/// `-1, -2, -3, ...` while released, `0` for a button never observed. So
/// `get(b) == 1` is "pressed this step" and `get(b) == -1` is "released this
/// step".
#[derive(Debug, Default, Clone)]
pub struct Input {
    latest: LatestInput,
    durations: HashMap<Button, i32>,
    pointer: Vec2,
    prev_pointer: Vec2,
    pointer_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a host event. Counters only change on [`Input::poll`].
    pub fn apply_event(&mut self, event: &InputEvent) {
        self.latest.apply_event(event);
    }

    /// Promotes the latest raw state into the per-step counters.
    pub fn poll(&mut self) {
        for (button, down) in self.latest.buttons() {
            let d = self.durations.entry(button).or_insert(0);
            *d = if down { d.saturating_add(1).max(1) } else { d.saturating_sub(1).min(-1) };
        }

        self.prev_pointer = self.pointer;
        self.pointer = self.latest.pointer();
        self.pointer_delta = self.pointer - self.prev_pointer;
    }

    pub fn get(&self, button: impl Into<Button>) -> i32 {
        self.durations.get(&button.into()).copied().unwrap_or(0)
    }

    pub fn key(&self, key: Key) -> i32 {
        self.get(key)
    }

    pub fn pointer_button(&self, button: MouseButton) -> i32 {
        self.get(button)
    }

    /// True while held (any positive counter).
    pub fn is_down(&self, button: impl Into<Button>) -> bool {
        self.get(button) > 0
    }

    /// True only on the step the press was first observed.
    pub fn just_pressed(&self, button: impl Into<Button>) -> bool {
        self.get(button) == 1
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    pub fn latest(&self) -> &LatestInput {
        &self.latest
    }
}
