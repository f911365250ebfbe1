//! Color token helpers.
//!
//! Category colors arrive as CSS-style tokens. Hex tokens (`#RGB`,
//! `#RRGGBB`) are understood for terminal output; anything else is passed
//! through verbatim to HTML/SVG and drawn with a fallback in the terminal.

use colored::{ColoredString, Colorize};

/// Parse a `#RGB` or `#RRGGBB` token.
pub fn parse_hex(token: &str) -> Option<(u8, u8, u8)> {
    let hex = token.trim().strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((pair(0)?, pair(2)?, pair(4)?))
        }
        _ => None,
    }
}

/// Paint `text` in the category color when it is a hex token.
pub fn paint(text: &str, token: &str) -> ColoredString {
    match parse_hex(token) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

/// Fill glyphs used to tell categories apart when color is off.
const GLYPHS: [char; 5] = ['█', '▓', '▒', '░', '#'];

/// Glyph for the `index`-th category.
pub fn glyph(index: usize) -> char {
    GLYPHS[index % GLYPHS.len()]
}
