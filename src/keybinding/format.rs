//! Platform-specific keybinding display formatting.
//!
//! Turns a raw key string from a keybinding file (e.g. `"ctrl+k ctrl+s"`)
//! into a display label (`"Ctrl+K, Ctrl+S"`). Output is display-only and is
//! not required to re-parse as a valid key string.

use crate::host::Platform;

/// Separator between chords of a multi-chord binding in the display label.
const CHORD_SEPARATOR: &str = ", ";

/// Format a raw key string for display on the given platform.
///
/// Splits the raw string on spaces into chords (sequential key-presses),
/// each chord on `+` into tokens, and maps every token through the
/// platform's modifier table, the named-key table, the function-key rule,
/// or generic capitalization, in that order.
///
/// Deterministic: equal inputs always produce equal labels.
pub fn format_keybinding(raw: &str, platform: Platform) -> String {
    raw.split(' ')
        .map(|chord| format_chord(chord, platform))
        .collect::<Vec<_>>()
        .join(CHORD_SEPARATOR)
}

/// Format a single chord (simultaneous combination) like `"ctrl+shift+g"`.
fn format_chord(chord: &str, platform: Platform) -> String {
    chord
        .split('+')
        .map(|token| format_token(token, platform))
        .collect::<Vec<_>>()
        .join("+")
}

/// Format one token of a chord.
fn format_token(token: &str, platform: Platform) -> String {
    let lower = token.to_lowercase();

    if let Some(label) = modifier_label(&lower, platform) {
        return label.to_string();
    }
    if let Some(label) = named_key_label(&lower) {
        return label.to_string();
    }
    if is_function_key(&lower) {
        return lower.to_uppercase();
    }
    if lower.chars().count() == 1 {
        return lower.to_uppercase();
    }
    title_case(&lower)
}

/// Modifier display name per platform family.
///
/// Both `cmd` and `ctrl` normalize toward the primary modifier of each
/// platform: `cmd` renders as "Cmd" on mac but "Ctrl" elsewhere.
fn modifier_label(token: &str, platform: Platform) -> Option<&'static str> {
    if platform.is_mac() {
        match token {
            "cmd" | "meta" => Some("Cmd"),
            "ctrl" => Some("Ctrl"),
            "alt" | "option" => Some("Option"),
            "shift" => Some("Shift"),
            _ => None,
        }
    } else {
        match token {
            "ctrl" | "cmd" => Some("Ctrl"),
            "meta" | "win" => Some("Win"),
            "alt" | "option" => Some("Alt"),
            "shift" => Some("Shift"),
            _ => None,
        }
    }
}

/// Fixed display names for named (non-character) keys.
fn named_key_label(token: &str) -> Option<&'static str> {
    match token {
        "up" => Some("Up"),
        "down" => Some("Down"),
        "left" => Some("Left"),
        "right" => Some("Right"),
        "home" => Some("Home"),
        "end" => Some("End"),
        "pageup" => Some("PageUp"),
        "pagedown" => Some("PageDown"),
        "insert" => Some("Insert"),
        "delete" => Some("Delete"),
        "backspace" => Some("Backspace"),
        "tab" => Some("Tab"),
        "enter" => Some("Enter"),
        "escape" => Some("Escape"),
        "space" => Some("Space"),
        _ => None,
    }
}

/// Function keys are `f` followed by one or two digits (`f1`..`f19`).
fn is_function_key(token: &str) -> bool {
    let mut chars = token.chars();
    if chars.next() != Some('f') {
        return false;
    }
    let digits = chars.as_str();
    matches!(digits.len(), 1 | 2) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Uppercase only the first character of a token.
fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ===== Tests =====
