//! CSS color values.
//!
//! Style attributes keep the exact string the caller supplied (so documents
//! round-trip unchanged); renderers parse them on demand with [`Color::parse`].

use winnow::ascii::{float, space0};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any CSS color form the editor produces or accepts:
    /// `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `rgb(..)`, `rgba(..)`
    /// and a handful of named colors.
    pub fn parse(input: &str) -> Option<Self> {
        let mut rest = input.trim();
        let color = alt((parse_hex, parse_rgb_fn, parse_named))
            .parse_next(&mut rest)
            .ok()?;
        rest.trim().is_empty().then_some(color)
    }

    /// Parse a hex color string. The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// Emit as `rgba(r, g, b, a)`, the form color pickers hand back.
    pub fn to_rgba_string(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        let alpha = (self.a * 100.0).round() / 100.0;
        format!("rgba({r}, {g}, {b}, {alpha})")
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

fn parse_hex(input: &mut &str) -> ModalResult<Color> {
    let digits: &str = preceded('#', take_while(3..=8, |c: char| c.is_ascii_hexdigit()))
        .parse_next(input)?;
    Color::from_hex(digits).ok_or_else(|| winnow::error::ErrMode::Backtrack(ContextError::new()))
}

fn parse_component(input: &mut &str) -> ModalResult<f64> {
    delimited(space0, float, space0).parse_next(input)
}

fn parse_rgb_fn(input: &mut &str) -> ModalResult<Color> {
    let _ = alt(("rgba(", "rgb(")).parse_next(input)?;
    let r = parse_component.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let g = parse_component.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    let b = parse_component.parse_next(input)?;
    let a = opt(preceded(',', parse_component))
        .parse_next(input)?
        .unwrap_or(1.0);
    let _ = ')'.parse_next(input)?;
    let c = |v: f64| (v.clamp(0.0, 255.0) / 255.0) as f32;
    Ok(Color::rgba(c(r), c(g), c(b), a.clamp(0.0, 1.0) as f32))
}

fn parse_named(input: &mut &str) -> ModalResult<Color> {
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    let color = match name.to_ascii_lowercase().as_str() {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgba(1.0, 0.0, 0.0, 1.0),
        "green" => Color::rgba(0.0, 128.0 / 255.0, 0.0, 1.0),
        "blue" => Color::rgba(0.0, 0.0, 1.0, 1.0),
        "gray" | "grey" => Color::rgba(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 1.0),
        _ => return Err(winnow::error::ErrMode::Backtrack(ContextError::new())),
    };
    Ok(color)
}

/// Swatches offered by the fill and stroke pickers (material 500 shades).
pub const PALETTE: [&str; 19] = [
    "#f44336",
    "#e91e63",
    "#9c27b0",
    "#673ab7",
    "#3f51b5",
    "#2196f3",
    "#03a9f4",
    "#00bcd4",
    "#009688",
    "#4caf50",
    "#8bc34a",
    "#cddc39",
    "#ffeb3b",
    "#ffc107",
    "#ff9800",
    "#ff5722",
    "#795548",
    "#607d8b",
    "transparent",
];
