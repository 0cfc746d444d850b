use duelist_core::{Line, Span, Style};

/// Text made of styled spans.
///
/// Unlike a plain string with a single style, a `StyledText` keeps the style
/// of every run, so splicing one styled value into another (see
/// [`replace`](Self::replace)) never loses the inner styling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    spans: Vec<Span>,
}

impl StyledText {
    // -- Constructors --

    /// Create a styled text from a plain string with default style.
    pub fn text(s: &str) -> Self {
        Self::new(s, Style::default())
    }

    /// Create a styled text from a formatted string with default style.
    pub fn textf(s: String) -> Self {
        Self {
            spans: vec![Span::new(s, Style::default())],
        }
    }

    /// Create a styled text with the given text and style.
    pub fn new(text: &str, style: Style) -> Self {
        Self {
            spans: vec![Span::new(text, style)],
        }
    }

    // -- Builders --

    /// Layer `base` under every span: colours already set on a span win,
    /// attributes are combined.
    pub fn with_style(mut self, base: Style) -> Self {
        for span in &mut self.spans {
            span.style = base.patch(span.style);
        }
        self
    }

    /// Append another styled text.
    pub fn append(mut self, other: StyledText) -> Self {
        self.spans.extend(other.spans);
        self
    }

    /// Append a run of text with the given style.
    pub fn push(mut self, text: &str, style: Style) -> Self {
        self.spans.push(Span::new(text, style));
        self
    }

    // -- Accessors --

    /// Return the plain text content.
    pub fn content(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Return the spans.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether there is no visible text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    // -- Transformations --

    /// Replace every occurrence of `placeholder` by `value`.
    ///
    /// The inserted spans keep their own style layered over the style of
    /// the span they were spliced into. A placeholder split across two spans
    /// is not matched.
    pub fn replace(&self, placeholder: &str, value: &StyledText) -> StyledText {
        if placeholder.is_empty() {
            return self.clone();
        }
        let mut spans = Vec::with_capacity(self.spans.len());
        for span in &self.spans {
            let mut rest = span.text.as_str();
            while let Some(at) = rest.find(placeholder) {
                if at > 0 {
                    spans.push(Span::new(&rest[..at], span.style));
                }
                for inner in &value.spans {
                    spans.push(Span::new(inner.text.clone(), span.style.patch(inner.style)));
                }
                rest = &rest[at + placeholder.len()..];
            }
            if !rest.is_empty() {
                spans.push(Span::new(rest, span.style));
            }
        }
        StyledText { spans }
    }

    /// Split the text at newlines into frame lines.
    pub fn lines(&self) -> Vec<Line> {
        let mut lines = vec![Line::default()];
        for span in &self.spans {
            for (i, part) in span.text.split('\n').enumerate() {
                if i > 0 {
                    lines.push(Line::default());
                }
                if !part.is_empty() {
                    if let Some(line) = lines.last_mut() {
                        line.spans.push(Span::new(part, span.style));
                    }
                }
            }
        }
        lines
    }

    /// Word-wrap the text to `width` columns. Words longer than the width
    /// are broken.
    pub fn wrap(&self, width: usize) -> Vec<Line> {
        if width == 0 {
            return self.lines();
        }
        let mut out = Vec::new();
        for line in self.lines() {
            let chars: Vec<(char, Style)> = line
                .spans
                .iter()
                .flat_map(|s| s.text.chars().map(move |c| (c, s.style)))
                .collect();
            if chars.is_empty() {
                out.push(Line::default());
                continue;
            }
            let mut start = 0;
            while chars.len() - start > width {
                let window = &chars[start..=start + width];
                match window.iter().rposition(|(c, _)| *c == ' ') {
                    Some(p) if p > 0 => {
                        out.push(collect_line(&chars[start..start + p]));
                        start += p + 1;
                    }
                    _ => {
                        out.push(collect_line(&chars[start..start + width]));
                        start += width;
                    }
                }
            }
            out.push(collect_line(&chars[start..]));
        }
        out
    }
}

impl From<&str> for StyledText {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for StyledText {
    fn from(s: String) -> Self {
        Self::textf(s)
    }
}

/// Merge consecutive same-style characters back into spans.
/// The spans as a single frame line, newlines included.
impl From<&StyledText> for Line {
    fn from(text: &StyledText) -> Self {
        Line {
            spans: text.spans().to_vec(),
        }
    }
}

fn collect_line(chars: &[(char, Style)]) -> Line {
    let mut line = Line::default();
    for &(c, style) in chars {
        match line.spans.last_mut() {
            Some(span) if span.style == style => span.text.push(c),
            _ => line.spans.push(Span::new(c.to_string(), style)),
        }
    }
    line
}
