//! Title parsing and the window-matching rule.
//!
//! Editor window titles carry a trailing workspace label: newer builds render
//! `<file> — <workspace>` with an em dash, older ones `<file> - <workspace>`.
//! Both the store (deriving `workspace_name` at record time) and the bridge
//! (matching a recorded event back to a live window) go through this module so
//! the two sides can never disagree on what a title means.

/// Em dash surrounded by spaces, the current title separator.
pub const EM_DASH_SEPARATOR: &str = " \u{2014} ";

/// Plain hyphen separator used by older builds.
pub const HYPHEN_SEPARATOR: &str = " - ";

/// Extracts the trailing workspace label from a window title.
///
/// The em-dash separator wins when both are present. The segment after the
/// last occurrence is taken, trimmed; a title without either separator (or
/// with nothing after it) yields `None`.
pub fn derive_workspace_name(title: &str) -> Option<String> {
    let separator = if title.contains(EM_DASH_SEPARATOR) {
        EM_DASH_SEPARATOR
    } else if title.contains(HYPHEN_SEPARATOR) {
        HYPHEN_SEPARATOR
    } else {
        return None;
    };

    let (_, tail) = title.rsplit_once(separator)?;
    let tail = tail.trim();
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

/// Decides whether a live window title satisfies a recorded target.
///
/// A match is either an exact title equality, or — given a workspace hint —
/// equality against the live title's em-dash segment, falling back to a plain
/// trailing-substring check. With neither a target title nor a hint there is
/// nothing to match against.
pub fn title_matches(
    live_title: &str,
    target_title: Option<&str>,
    workspace_hint: Option<&str>,
) -> bool {
    if let Some(target) = target_title {
        if live_title == target {
            return true;
        }
    }

    if let Some(hint) = workspace_hint {
        if let Some((_, tail)) = live_title.rsplit_once(EM_DASH_SEPARATOR) {
            if tail.trim() == hint {
                return true;
            }
        }
        if live_title.ends_with(hint) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_workspace_from_em_dash_title() {
        assert_eq!(
            derive_workspace_name("Foo — bar.code-workspace"),
            Some("bar.code-workspace".to_string())
        );
    }

    #[test]
    fn derives_workspace_from_hyphen_title() {
        assert_eq!(derive_workspace_name("Foo - baz"), Some("baz".to_string()));
    }

    #[test]
    fn em_dash_wins_over_hyphen() {
        assert_eq!(
            derive_workspace_name("a - b — c"),
            Some("c".to_string())
        );
    }

    #[test]
    fn takes_segment_after_last_separator() {
        assert_eq!(
            derive_workspace_name("a — b — c"),
            Some("c".to_string())
        );
    }

    #[test]
    fn no_separator_yields_none() {
        assert_eq!(derive_workspace_name("untitled"), None);
    }

    #[test]
    fn empty_tail_yields_none() {
        assert_eq!(derive_workspace_name("Foo — "), None);
    }

    #[test]
    fn trailing_dot_is_preserved_in_derived_name() {
        // The dot-suffix convention is filtered at query time, not here.
        assert_eq!(derive_workspace_name("x — Proj."), Some("Proj.".to_string()));
    }

    #[test]
    fn exact_title_matches() {
        assert!(title_matches("main.rs — myrepo", Some("main.rs — myrepo"), None));
        assert!(!title_matches("main.rs — myrepo", Some("other.rs — myrepo"), None));
    }

    #[test]
    fn hint_matches_em_dash_segment() {
        assert!(title_matches("main.rs — myrepo", None, Some("myrepo")));
    }

    #[test]
    fn hint_falls_back_to_ends_with() {
        // "repo" is not the em-dash segment but the title still ends with it.
        assert!(title_matches("main.rs — myrepo", None, Some("repo")));
        // No em-dash at all: only the ends-with branch can apply.
        assert!(title_matches("main.rs in myrepo", None, Some("repo")));
        assert!(!title_matches("main.rs in myrepo", None, Some("demo")));
    }

    #[test]
    fn no_target_never_matches() {
        assert!(!title_matches("main.rs — myrepo", None, None));
    }
}
