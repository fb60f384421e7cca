const ABSOLUTE_PREFIXES: [&str; 4] = ["http://", "https://", "data:", "blob:"];

/// Resolve a texture source against a base URL.
///
/// Absolute URLs and root-relative paths are returned unchanged.
pub fn resolve_source(base: &str, source: &str) -> String {
    if base.is_empty()
        || source.starts_with('/')
        || ABSOLUTE_PREFIXES.iter().any(|p| source.starts_with(p))
    {
        return source.to_string();
    }
    let base = base.trim_end_matches('/');
    let source = source.trim_start_matches("./");
    format!("{base}/{source}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_sources() {
        assert_eq!(resolve_source("assets", "frog.png"), "assets/frog.png");
        assert_eq!(resolve_source("assets/", "./frog.png"), "assets/frog.png");
        assert_eq!(
            resolve_source("https://cdn.example.com/game", "img/fly.png"),
            "https://cdn.example.com/game/img/fly.png"
        );
    }

    #[test]
    fn keeps_absolute_sources() {
        assert_eq!(resolve_source("assets", "/frog.png"), "/frog.png");
        assert_eq!(resolve_source("assets", "https://x.org/a.png"), "https://x.org/a.png");
        assert_eq!(resolve_source("assets", "data:image/png;base64,AA"), "data:image/png;base64,AA");
    }

    #[test]
    fn empty_base_is_identity() {
        assert_eq!(resolve_source("", "frog.png"), "frog.png");
    }
}
