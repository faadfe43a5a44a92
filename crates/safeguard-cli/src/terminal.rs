//! Terminal styling and number formatting.
//!
//! Colors are plain ANSI escape sequences. Detection honours `NO_COLOR` and
//! `TERM=dumb`; when either applies every code resolves to an empty string.

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    /// Bold reverse green for SAFE tags.
    pub const TAG_SAFE: &str = "\x1b[1;7;32m";
    /// Bold reverse yellow for DANGER tags.
    pub const TAG_DANGER: &str = "\x1b[1;7;33m";
    /// Bold reverse red for BLOCKED tags.
    pub const TAG_BLOCKED: &str = "\x1b[1;7;31m";

    /// Bright bold white for destination names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary details.
    pub const GRAY: &str = "\x1b[90m";
    /// Cyan for distances.
    pub const CYAN: &str = "\x1b[36m";
    /// Red for hazard labels.
    pub const RED: &str = "\x1b[31m";
}

/// Resolved color codes, either ANSI sequences or empty strings.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_safe: &'static str,
    pub tag_danger: &'static str,
    pub tag_blocked: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub cyan: &'static str,
    pub red: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_safe: colors::TAG_SAFE,
            tag_danger: colors::TAG_DANGER,
            tag_blocked: colors::TAG_BLOCKED,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            cyan: colors::CYAN,
            red: colors::RED,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_safe: "",
            tag_danger: "",
            tag_blocked: "",
            white_bold: "",
            gray: "",
            cyan: "",
            red: "",
        }
    }

    /// `colored()` when the terminal supports ANSI colors, `plain()` otherwise.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
///
/// Respects the `NO_COLOR` environment variable (https://no-color.org/) and
/// the `TERM=dumb` convention.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Format a number with thousand separators (commas).
///
/// ```
/// # use safeguard_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Human readable road distance: metres below one kilometre, kilometres
/// with two decimals below one hundred, whole kilometres above.
#[must_use]
pub fn format_distance(metres: f64) -> String {
    if !metres.is_finite() {
        return "unreachable".to_string();
    }
    if metres < 1_000.0 {
        format!("{metres:.0} m")
    } else if metres < 100_000.0 {
        format!("{:.2} km", metres / 1_000.0)
    } else {
        format!("{} km", format_with_separators((metres / 1_000.0).round() as u64))
    }
}
