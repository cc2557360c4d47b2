//! Event name canonicalization.
//!
//! Both the callback registries and the declarative event tables key their entries by the
//! canonical form of the event name, so `"My Event"` and `"my_event"` address the same
//! entry unless the owner opted out of normalization at construction time.

/// Returns the canonical form of an event name.
///
/// Lowercases the name and replaces every space with an underscore. Pure, total and
/// deterministic - there are no failure modes.
///
/// # Example
///
/// ```rust
/// assert_eq!(fanout::normalize("My Event"), "my_event");
/// assert_eq!(fanout::normalize("tick"), "tick");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_")
}

/// Construction-time choice of how a registry or table derives its mapping keys.
///
/// The policy is fixed for the lifetime of the owning object; every operation on that
/// object applies the same policy to the names it is given.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum KeyPolicy {
    /// Names are canonicalized via [`normalize()`] before use. This is the default.
    #[default]
    Normalized,

    /// Names are used exactly as given (the identity function).
    Raw,
}

impl KeyPolicy {
    /// Applies this policy to a raw event name, yielding the mapping key.
    #[must_use]
    pub fn apply(self, raw: &str) -> String {
        match self {
            Self::Normalized => normalize(raw),
            Self::Raw => raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_replaces_spaces() {
        assert_eq!(normalize("My Event"), "my_event");
        assert_eq!(normalize("TICK"), "tick");
        assert_eq!(normalize("a b c"), "a_b_c");
    }

    #[test]
    fn normalize_leaves_canonical_names_unchanged() {
        assert_eq!(normalize("my_event"), "my_event");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn raw_policy_is_identity() {
        assert_eq!(KeyPolicy::Raw.apply("My Event"), "My Event");
    }

    #[test]
    fn normalized_policy_is_default() {
        assert_eq!(KeyPolicy::default(), KeyPolicy::Normalized);
        assert_eq!(KeyPolicy::default().apply("My Event"), "my_event");
    }
}
