//! Terminal text sanitization for single-line labels.
//!
//! File names, window titles read from the config document and stderr captured from
//! external commands all end up painted into terminal cells. Escape sequences in them
//! would be interpreted by the terminal emulator, so they are stripped before display.

use std::borrow::Cow;

const ESC: char = '\x1b';

/// Make `input` safe to paint as one line of a label.
///
/// - ANSI escape sequences (`ESC [ ... final`, `ESC ] ... BEL|ST`, `ESC x`) are dropped
/// - `\n`, `\r` and `\t` become a single space each
/// - other C0/C1 controls and DEL are dropped
///
/// Returns `Cow::Borrowed` when nothing needs to change.
#[must_use]
pub fn sanitize_label(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_control) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => match chars.next() {
                Some('[') => {
                    // CSI: parameters and intermediates until a final byte in 0x40..=0x7E.
                    for next in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    // OSC: terminated by BEL or ESC \.
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == ESC {
                            if chars.peek() == Some(&'\\') {
                                chars.next();
                            }
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\n' | '\r' | '\t' => out.push(' '),
            c if is_control(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_control(c: char) -> bool {
    c <= '\x1f' || c == '\x7f' || ('\u{0080}'..='\u{009f}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(sanitize_label("notes.txt"), Cow::Borrowed(_)));
        assert!(matches!(sanitize_label("Überblick ✓"), Cow::Borrowed(_)));
    }

    #[test]
    fn csi_and_osc_sequences_are_removed() {
        assert_eq!(sanitize_label("a\x1b[31mred\x1b[0m"), "ared");
        assert_eq!(sanitize_label("x\x1b]0;evil title\x07y"), "xy");
        assert_eq!(sanitize_label("x\x1b]8;;http://e\x1b\\y"), "xy");
    }

    #[test]
    fn whitespace_controls_become_spaces() {
        assert_eq!(sanitize_label("line one\nline two\tend\r"), "line one line two end ");
    }

    #[test]
    fn other_controls_are_dropped() {
        assert_eq!(sanitize_label("a\x00b\x07c\x7fd\u{0085}e"), "abcde");
    }
}
