//! Color names and parsing for figure rendering.

use std::fmt;

use anyhow::{Result, anyhow, bail};

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    /// Parse a named color (matplotlib base and CSS names) or a `#rrggbb` hex string.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if let Some(hex) = name.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() { bail!("invalid hex color {name:?}: expected #rrggbb") }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| anyhow!("invalid hex color {name:?}"));
            return Ok(Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
        }

        NAMED_COLORS.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|&(_, rgb)| rgb)
            .ok_or_else(|| anyhow!("unknown color name {name:?}"))
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black",   Rgb { r:   0, g:   0, b:   0 }),
    ("white",   Rgb { r: 255, g: 255, b: 255 }),
    ("red",     Rgb { r: 255, g:   0, b:   0 }),
    ("green",   Rgb { r:   0, g: 128, b:   0 }),
    ("blue",    Rgb { r:   0, g:   0, b: 255 }),
    ("purple",  Rgb { r: 128, g:   0, b: 128 }),
    ("yellow",  Rgb { r: 255, g: 255, b:   0 }),
    ("cyan",    Rgb { r:   0, g: 255, b: 255 }),
    ("gold",    Rgb { r: 255, g: 215, b:   0 }),
    ("magenta", Rgb { r: 255, g:   0, b: 255 }),
    ("brown",   Rgb { r: 165, g:  42, b:  42 }),
    ("orange",  Rgb { r: 255, g: 165, b:   0 }),
    ("grey",    Rgb { r: 128, g: 128, b: 128 }),
    ("gray",    Rgb { r: 128, g: 128, b: 128 }),
    ("pink",    Rgb { r: 255, g: 192, b: 203 }),
    ("olive",   Rgb { r: 128, g: 128, b:   0 }),
    ("navy",    Rgb { r:   0, g:   0, b: 128 }),
    ("teal",    Rgb { r:   0, g: 128, b: 128 }),
    ("lime",    Rgb { r:   0, g: 255, b:   0 }),
    ("maroon",  Rgb { r: 128, g:   0, b:   0 }),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!(Rgb::parse("gold").unwrap(), Rgb { r: 255, g: 215, b: 0 });
        assert_eq!(Rgb::parse("Grey").unwrap(), Rgb::parse("gray").unwrap());
        assert_eq!(Rgb::parse("#0a0B0c").unwrap(), Rgb { r: 10, g: 11, b: 12 });
    }

    #[test]
    fn rejects_unknown_colors() {
        assert!(Rgb::parse("ultraviolet").is_err());
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("#zz0000").is_err());
    }

    #[test]
    fn displays_as_css() {
        assert_eq!(Rgb { r: 1, g: 2, b: 3 }.to_string(), "rgb(1,2,3)");
    }
}
