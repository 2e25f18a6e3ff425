use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::coords::Vec2;
use crate::input::{InputEvent, Key, KeyState, MouseButton, MouseButtonState, PointerMoveEvent};

/// Maps window pixels onto surface pixels.
///
/// The window shows the surface scaled uniformly and centred (letterboxed),
/// matching [`render::Presenter`](crate::render::Presenter).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMapping {
    pub window_size: Vec2,
    pub surface_size: Vec2,
}

impl PointerMapping {
    /// Floored surface pixel under `pos`; may fall outside the surface when
    /// the pointer is over a bar.
    pub fn map(&self, pos: PhysicalPosition<f64>) -> Vec2 {
        let (win, surf) = (self.window_size, self.surface_size);
        if win.x <= 0.0 || win.y <= 0.0 || surf.x <= 0.0 || surf.y <= 0.0 {
            return Vec2::new((pos.x as f32).floor(), (pos.y as f32).floor());
        }
        let fit = (win.x / surf.x).min(win.y / surf.y);
        let off_x = (win.x - surf.x * fit) / 2.0;
        let off_y = (win.y - surf.y * fit) / 2.0;
        Vec2::new(((pos.x as f32 - off_x) / fit).floor(), ((pos.y as f32 - off_y) / fit).floor())
    }
}

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub fn translate_window_event(mapping: &PointerMapping, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorMoved { position, .. } => {
            let p = mapping.map(*position);
            Some(InputEvent::PointerMoved(PointerMoveEvent { x: p.x, y: p.y }))
        }

        WindowEvent::MouseInput { state: st, button, .. } => {
            let state = match st {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            Some(InputEvent::PointerButton { button: map_mouse_button(*button), state })
        }

        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };

            let (key, code) = map_key(event.physical_key);

            Some(InputEvent::Key { key, state, code, repeat: event.repeat })
        }

        _ => None,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

const LETTERS: [(KeyCode, Key); 26] = [
    (KeyCode::KeyA, Key::A), (KeyCode::KeyB, Key::B), (KeyCode::KeyC, Key::C), (KeyCode::KeyD, Key::D),
    (KeyCode::KeyE, Key::E), (KeyCode::KeyF, Key::F), (KeyCode::KeyG, Key::G), (KeyCode::KeyH, Key::H),
    (KeyCode::KeyI, Key::I), (KeyCode::KeyJ, Key::J), (KeyCode::KeyK, Key::K), (KeyCode::KeyL, Key::L),
    (KeyCode::KeyM, Key::M), (KeyCode::KeyN, Key::N), (KeyCode::KeyO, Key::O), (KeyCode::KeyP, Key::P),
    (KeyCode::KeyQ, Key::Q), (KeyCode::KeyR, Key::R), (KeyCode::KeyS, Key::S), (KeyCode::KeyT, Key::T),
    (KeyCode::KeyU, Key::U), (KeyCode::KeyV, Key::V), (KeyCode::KeyW, Key::W), (KeyCode::KeyX, Key::X),
    (KeyCode::KeyY, Key::Y), (KeyCode::KeyZ, Key::Z),
];

const DIGITS: [(KeyCode, Key); 10] = [
    (KeyCode::Digit0, Key::Digit0), (KeyCode::Digit1, Key::Digit1), (KeyCode::Digit2, Key::Digit2),
    (KeyCode::Digit3, Key::Digit3), (KeyCode::Digit4, Key::Digit4), (KeyCode::Digit5, Key::Digit5),
    (KeyCode::Digit6, Key::Digit6), (KeyCode::Digit7, Key::Digit7), (KeyCode::Digit8, Key::Digit8),
    (KeyCode::Digit9, Key::Digit9),
];

/// Engine key plus the platform code reported alongside it.
fn map_key(pk: PhysicalKey) -> (Key, u32) {
    let PhysicalKey::Code(code) = pk else {
        // Native codes carry no stable number.
        return (Key::Unknown(0), 0);
    };

    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        KeyCode::SuperLeft | KeyCode::SuperRight => Key::Meta,
        other => LETTERS
            .iter()
            .chain(DIGITS.iter())
            .find(|(c, _)| *c == other)
            .map_or(Key::Unknown(other as u32), |&(_, k)| k),
    };
    (key, code as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_is_scaled_and_floored() {
        let mapping = PointerMapping {
            window_size: Vec2::new(640.0, 480.0),
            surface_size: Vec2::new(160.0, 120.0),
        };
        assert_eq!(mapping.map(PhysicalPosition::new(7.0, 13.9)), Vec2::new(1.0, 3.0));
        assert_eq!(mapping.map(PhysicalPosition::new(639.0, 479.0)), Vec2::new(159.0, 119.0));
    }

    #[test]
    fn pointer_accounts_for_letterbox() {
        let mapping = PointerMapping {
            window_size: Vec2::new(400.0, 200.0),
            surface_size: Vec2::new(100.0, 100.0),
        };
        // 200x200 image centred: bars of 100 px on each side.
        assert_eq!(mapping.map(PhysicalPosition::new(100.0, 0.0)), Vec2::new(0.0, 0.0));
        assert_eq!(mapping.map(PhysicalPosition::new(299.0, 199.0)), Vec2::new(99.0, 99.0));
        assert_eq!(mapping.map(PhysicalPosition::new(50.0, 10.0)).x, -25.0);
    }

    #[test]
    fn letters_and_arrows_map() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyZ)).0, Key::Z);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)).0, Key::ArrowLeft);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit7)).0, Key::Digit7);
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::F5)).0, Key::Unknown(_)));
    }
}
