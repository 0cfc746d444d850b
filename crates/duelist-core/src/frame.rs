//! The [`Frame`] type: a screen's worth of styled lines.
//!
//! Models draw into a frame, drivers flush it. A frame is compared against
//! the previously flushed one so unchanged screens are not redrawn.

use crate::style::Style;

/// A run of text sharing one style.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// One line of styled spans.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    /// Number of visible characters.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    /// The plain text of the line.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A full screen of lines.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Frame {
    pub lines: Vec<Line>,
    pub width: i32,
    pub height: i32,
}

impl Frame {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            lines: Vec::new(),
            width,
            height,
        }
    }

    /// Remove all lines, keeping the dimensions.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Append a line.
    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.lines.push(Line::default());
    }

    /// Plain text of the whole frame, one line per row. Handy in tests.
    pub fn plain(&self) -> String {
        self.lines
            .iter()
            .map(Line::plain)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{AttrMask, Color};

    #[test]
    fn line_width_counts_chars() {
        let line = Line {
            spans: vec![
                Span::new("Time ", Style::attrs(AttrMask::BOLD)),
                Span::new("9s", Style::fg(Color::from_rgb(1, 1, 1))),
            ],
        };
        assert_eq!(line.width(), 7);
        assert_eq!(line.plain(), "Time 9s");
    }

    #[test]
    fn frame_plain_joins_lines() {
        let mut f = Frame::new(80, 24);
        f.push(Line {
            spans: vec![Span::new("a", Style::default())],
        });
        f.blank();
        f.push(Line {
            spans: vec![Span::new("b", Style::default())],
        });
        assert_eq!(f.plain(), "a\n\nb");
        f.clear();
        assert!(f.lines.is_empty());
        assert_eq!(f.width, 80);
    }
}
