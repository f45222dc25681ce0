//! Display payloads.
//!
//! A [`Payload`] is what one message provider hands to the display: either a
//! single line or a pair of lines for a two-row module. Lines are stored in
//! fixed-capacity buffers sized to the HD44780 DDRAM row (40 characters);
//! longer input is truncated on a character boundary.

use core::fmt;

/// Longest line any supported module can hold.
pub const LINE_CAPACITY: usize = 40;

/// One display line.
pub type Line = heapless::String<LINE_CAPACITY>;

/// Text content for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    OneLine(Line),
    TwoLine(Line, Line),
}

impl Payload {
    pub fn one_line(text: &str) -> Self {
        Self::OneLine(line(text))
    }

    pub fn two_line(first: &str, second: &str) -> Self {
        Self::TwoLine(line(first), line(second))
    }

    /// Top line.
    pub fn first(&self) -> &str {
        match self {
            Self::OneLine(l) | Self::TwoLine(l, _) => l.as_str(),
        }
    }

    /// Bottom line, if this is a two-line payload.
    pub fn second(&self) -> Option<&str> {
        match self {
            Self::OneLine(_) => None,
            Self::TwoLine(_, l) => Some(l.as_str()),
        }
    }

    /// Lines in display order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        core::iter::once(self.first()).chain(self.second())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneLine(l) => f.write_str(l),
            Self::TwoLine(a, b) => write!(f, "{a}\n{b}"),
        }
    }
}

/// Copy `text` into a line buffer, dropping whatever does not fit.
fn line(text: &str) -> Line {
    let mut out = Line::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
