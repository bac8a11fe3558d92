//! Word-wrap and centering for the text crawl.
//!
//! Wrapping only breaks at whitespace; the whitespace at a break is consumed
//! and runs of it collapse, so no row starts or ends with a space. A single
//! word wider than the column budget is hard-truncated to the budget and the
//! rest of it is dropped.

use std::iter::Peekable;
use std::str::SplitWhitespace;

/// One output row of a wrapped script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub text: String,
}

impl WrappedLine {
    fn blank() -> Self {
        WrappedLine { text: String::new() }
    }

    /// Length in characters, which is what the column budget counts.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    /// Columns to skip so the line sits centered in `width`. Rounds down.
    pub fn left_pad(&self, width: usize) -> usize {
        width.saturating_sub(self.len()) / 2
    }

    pub fn right_pad(&self, width: usize) -> usize {
        width.saturating_sub(self.len()) - self.left_pad(width)
    }
}

/// Lazy iterator over the wrapped rows of a script. See [`wrap`].
pub struct Wrap<'a, I> {
    width: usize,
    lines: I,
    words: Option<Peekable<SplitWhitespace<'a>>>,
}

/// Wrap `lines` greedily to `width` columns.
///
/// An empty (or all-whitespace) input line yields exactly one blank row.
pub fn wrap<'a, I>(width: usize, lines: I) -> Wrap<'a, I::IntoIter>
where
    I: IntoIterator<Item = &'a str>,
{
    Wrap {
        width,
        lines: lines.into_iter(),
        words: None,
    }
}

/// Number of rows `lines` occupies once wrapped to `width`.
pub fn line_count<'a, I>(width: usize, lines: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    wrap(width, lines).count()
}

impl<'a, I> Iterator for Wrap<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = WrappedLine;

    fn next(&mut self) -> Option<WrappedLine> {
        loop {
            if let Some(words) = self.words.as_mut() {
                if let Some(first) = words.next() {
                    return Some(fill_row(first, words, self.width));
                }
                self.words = None;
            }

            let line = self.lines.next()?;
            if line.trim().is_empty() {
                return Some(WrappedLine::blank());
            }
            self.words = Some(line.split_whitespace().peekable());
        }
    }
}

fn fill_row<'a>(first: &'a str, rest: &mut Peekable<SplitWhitespace<'a>>, width: usize) -> WrappedLine {
    let first_len = first.chars().count();
    if first_len > width {
        return WrappedLine {
            text: first.chars().take(width).collect(),
        };
    }

    let mut text = String::from(first);
    let mut len = first_len;
    while let Some(word) = rest.peek() {
        let word_len = word.chars().count();
        if len + 1 + word_len > width {
            break;
        }
        text.push(' ');
        text.push_str(word);
        len += 1 + word_len;
        rest.next();
    }
    WrappedLine { text }
}

/// Output row position for the next emitted line. Only moves forward until
/// reset at a scene boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCursor {
    start_row: u16,
    pitch: u16,
    row: u16,
}

impl LayoutCursor {
    pub fn new(start_row: u16, pitch: u16) -> Self {
        LayoutCursor {
            start_row,
            pitch,
            row: start_row,
        }
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    /// Hand out the current row and advance by one line pitch.
    pub fn next_row(&mut self) -> u16 {
        let row = self.row;
        self.row = self.row.saturating_add(self.pitch);
        row
    }

    pub fn reset(&mut self) {
        self.row = self.start_row;
    }
}
