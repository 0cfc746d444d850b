//! Visual styling: [`Color`], [`AttrMask`], and [`Style`].

use std::ops::BitOr;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGB colour packed into a `u32` (0x00RRGGBB).
///
/// The high byte is used as a "set" flag so that pure black can still be
/// distinguished from the terminal default.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// The default / unset colour (terminal default).
    pub const DEFAULT: Self = Self(0);

    const SET: u32 = 1 << 24;

    /// Construct from individual RGB components.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Self::SET | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Construct from an `[r, g, b]` triple, as stored in data files.
    #[inline]
    pub const fn from_triple(rgb: [u8; 3]) -> Self {
        Self::from_rgb(rgb[0], rgb[1], rgb[2])
    }

    /// Whether this is the terminal default colour.
    #[inline]
    pub const fn is_default(self) -> bool {
        self.0 & Self::SET == 0
    }

    /// Red component.
    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Green component.
    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Blue component.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

// ---------------------------------------------------------------------------
// AttrMask
// ---------------------------------------------------------------------------

/// Bitmask of text attributes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct AttrMask(pub u32);

impl AttrMask {
    pub const NONE: Self = Self(0);
    pub const BOLD: Self = Self(1 << 0);
    pub const ITALIC: Self = Self(1 << 1);
    pub const UNDERLINE: Self = Self(1 << 2);
    pub const REVERSE: Self = Self(1 << 3);
    pub const DIM: Self = Self(1 << 4);

    /// Whether this mask contains all the bits from `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether the mask is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parse a space separated attribute list such as `"bold italic"`.
    /// Unknown words are ignored.
    pub fn parse(words: &str) -> Self {
        words
            .split_whitespace()
            .fold(Self::NONE, |acc, w| match w.to_ascii_lowercase().as_str() {
                "bold" | "b" => acc | Self::BOLD,
                "italic" | "i" => acc | Self::ITALIC,
                "underline" | "u" => acc | Self::UNDERLINE,
                "reverse" => acc | Self::REVERSE,
                "dim" => acc | Self::DIM,
                _ => acc,
            })
    }
}

impl BitOr for AttrMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Complete visual style for a run of text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: AttrMask,
}

impl Style {
    /// A style with only a foreground colour.
    #[inline]
    pub const fn fg(fg: Color) -> Self {
        Self {
            fg,
            bg: Color::DEFAULT,
            attrs: AttrMask::NONE,
        }
    }

    /// A style with only attributes.
    #[inline]
    pub const fn attrs(attrs: AttrMask) -> Self {
        Self {
            fg: Color::DEFAULT,
            bg: Color::DEFAULT,
            attrs,
        }
    }

    /// Set the foreground colour (builder).
    #[inline]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Set the attribute mask (builder).
    #[inline]
    pub const fn with_attrs(mut self, attrs: AttrMask) -> Self {
        self.attrs = attrs;
        self
    }

    /// Layer `over` on top of `self`: colours set in `over` win, attributes
    /// are combined.
    #[inline]
    pub fn patch(self, over: Style) -> Self {
        Self {
            fg: if over.fg.is_default() { self.fg } else { over.fg },
            bg: if over.bg.is_default() { self.bg } else { over.bg },
            attrs: self.attrs | over.attrs,
        }
    }
}
