use std::io::{self, Write};

use crossterm::{queue, style};

/// Print a row of hint items separated by two spaces, after one space of
/// margin.
pub fn print_hint_bar<W: Write>(out: &mut W, items: &[&str]) -> io::Result<()> {
    queue!(out, style::Print(" "))?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        print_hint(out, item)?;
    }
    Ok(())
}

/// Print one hint: key names inside `[...]` bold, the rest dim.
fn print_hint<W: Write>(out: &mut W, item: &str) -> io::Result<()> {
    let mut rest = item;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|c| open + c) else {
            break;
        };
        print_dim(out, &rest[..open])?;
        queue!(
            out,
            style::SetAttribute(style::Attribute::Bold),
            style::Print(&rest[open..=close]),
            style::SetAttribute(style::Attribute::Reset),
        )?;
        rest = &rest[close + 1..];
    }
    print_dim(out, rest)
}

fn print_dim<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    queue!(
        out,
        style::SetAttribute(style::Attribute::Dim),
        style::Print(text),
        style::SetAttribute(style::Attribute::Reset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_escapes(bytes: &[u8]) -> String {
        let text = String::from_utf8_lossy(bytes);
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn prints_items_with_keys_and_labels() {
        let mut out = Vec::new();
        print_hint_bar(&mut out, &["[Enter] skip", "[q][Esc] quit"]).unwrap();
        assert_eq!(strip_escapes(&out), " [Enter] skip  [q][Esc] quit");
    }

    #[test]
    fn unclosed_bracket_prints_as_plain_text() {
        let mut out = Vec::new();
        print_hint_bar(&mut out, &["[oops"]).unwrap();
        assert_eq!(strip_escapes(&out), " [oops");
    }
}
