use lgl_core::input::{Key, MouseBtn};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

pub fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::Digit1 => Some(Key::Num1),
        KeyCode::Digit2 => Some(Key::Num2),
        KeyCode::Digit3 => Some(Key::Num3),
        KeyCode::Digit4 => Some(Key::Num4),
        KeyCode::KeyQ => Some(Key::Q),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyE => Some(Key::E),
        KeyCode::KeyR => Some(Key::R),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyF => Some(Key::F),
        KeyCode::KeyZ => Some(Key::Z),
        KeyCode::KeyX => Some(Key::X),
        KeyCode::KeyC => Some(Key::C),
        KeyCode::KeyV => Some(Key::V),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

pub fn map_mouse_button(button: MouseButton) -> Option<MouseBtn> {
    match button {
        MouseButton::Left => Some(MouseBtn::Left),
        MouseButton::Right => Some(MouseBtn::Right),
        _ => None,
    }
}

/// Converts a top-left origin cursor y to the bottom-left origin the camera
/// expects.
pub fn flip_y(y: f64, client_height: u32) -> f32 {
    (client_height as f64 - y) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_row_maps_to_scene_switches() {
        assert_eq!(map_key(KeyCode::Digit1), Some(Key::Num1));
        assert_eq!(map_key(KeyCode::Digit4), Some(Key::Num4));
        assert_eq!(map_key(KeyCode::Digit5), None);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(map_key(KeyCode::Space), None);
        assert_eq!(map_key(KeyCode::F1), None);
        assert_eq!(map_mouse_button(MouseButton::Middle), None);
    }

    #[test]
    fn cursor_y_is_flipped_against_the_client_height() {
        assert_eq!(flip_y(0.0, 600), 600.0);
        assert_eq!(flip_y(600.0, 600), 0.0);
        assert_eq!(flip_y(150.0, 600), 450.0);
    }
}
