//! Terminal output sanitization
//!
//! Entry names come straight from the file system and are printed by the CLI, so
//! escape sequences and control characters in them must not reach the terminal.

/// Makes an entry name safe to print on one terminal line
///
/// Drops ANSI CSI sequences (`ESC [ ... letter`) and replaces every remaining control
/// character, newlines included, with `?`.
///
/// # Examples
///
/// ```
/// use stacky::utils::terminal::sanitize_label;
///
/// assert_eq!(sanitize_label("\x1b[31mred\x1b[0m.lnk"), "red.lnk");
/// assert_eq!(sanitize_label("two\nlines"), "two?lines");
/// ```
pub fn sanitize_label(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        result.push(if ch.is_control() { '?' } else { ch });
    }

    result
}
