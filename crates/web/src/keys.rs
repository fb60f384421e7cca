use ribbit_input::Key;

/// Keys whose browser default (scrolling, focus change) is suppressed while
/// the game listens.
pub fn captures_key(key: &Key) -> bool {
    matches!(
        key,
        Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight | Key::Space | Key::Tab
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_space_are_captured() {
        assert!(captures_key(&Key::ArrowDown));
        assert!(captures_key(&Key::from_code("Space")));
        assert!(!captures_key(&Key::KeyW));
        assert!(!captures_key(&Key::F5));
        assert!(!captures_key(&Key::from_code("MediaPlayPause")));
    }
}
