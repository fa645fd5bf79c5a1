//! Environment-variable placeholder expansion for settings values.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Matches `%NAME%`, `${NAME}` and `$NAME` placeholders.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"%([A-Za-z_][A-Za-z0-9_]*)%|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)",
        )
        .unwrap()
    })
}

/// Expand environment-variable placeholders in `value`.
///
/// Placeholders that do not resolve stay literal; expansion never fails.
pub(crate) fn expand_env_vars(value: &str) -> String {
    placeholder_re()
        .replace_all(value, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
