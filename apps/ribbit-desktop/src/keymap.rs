use ribbit_input::Key;
use winit::keyboard::KeyCode;

/// Map a winit physical key to an engine key.
///
/// winit names its key codes after the DOM `KeyboardEvent.code` values, so
/// the debug name is the code.
pub fn map_key(code: KeyCode) -> Key {
    Key::from_code(&format!("{code:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_map_to_variants() {
        assert_eq!(map_key(KeyCode::KeyA), Key::KeyA);
        assert_eq!(map_key(KeyCode::ArrowLeft), Key::ArrowLeft);
        assert_eq!(map_key(KeyCode::Digit7), Key::Digit7);
        assert_eq!(map_key(KeyCode::Space), Key::Space);
        assert_eq!(map_key(KeyCode::Escape), Key::Escape);
        assert_eq!(map_key(KeyCode::F3), Key::F3);
    }

    #[test]
    fn other_keys_keep_their_code() {
        assert_eq!(map_key(KeyCode::NumpadAdd), Key::Other("NumpadAdd".into()));
    }
}
