use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// sRGB color with channels normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color {0:?}: expected 6 hex digits with an optional leading '#'")]
    InvalidHex(String),
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a packed `0xRRGGBB` literal.
    pub fn from_u24(packed: u32) -> Self {
        let channel = |shift: u32| f64::from((packed >> shift) & 0xff) / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex_to_rgb(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&rgb_to_hex(*self))
    }
}

pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(hex.to_string()));
    }

    let byte = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|_| ColorError::InvalidHex(hex.to_string()))
    };
    Ok(Rgb::new(byte(0)?, byte(2)?, byte(4)?))
}

/// Formats as `#rrggbb`, rounding each channel to the nearest byte.
pub fn rgb_to_hex(color: Rgb) -> String {
    let byte = |c: f64| (255.0 * c).round().clamp(0.0, 255.0) as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        byte(color.r),
        byte(color.g),
        byte(color.b)
    )
}

/// `c1 * ratio + c2 * (1 - ratio)` per channel. `ratio` is not clamped.
pub fn mix_color(c1: Rgb, c2: Rgb, ratio: f64) -> Rgb {
    let lerp = |a: f64, b: f64| a * ratio + b * (1.0 - ratio);
    Rgb::new(lerp(c1.r, c2.r), lerp(c1.g, c2.g), lerp(c1.b, c2.b))
}

/// Achromatic inputs (`r == g == b`) report a hue of 0.
pub fn rgb_to_hsl(color: Rgb) -> Hsl {
    let Rgb { r, g, b } = color;
    let v = r.max(g).max(b);
    let chroma = v - r.min(g).min(b);
    let f = 1.0 - (v + v - chroma - 1.0).abs();

    let sector = if chroma == 0.0 {
        0.0
    } else if v == r {
        (g - b) / chroma
    } else if v == g {
        2.0 + (b - r) / chroma
    } else {
        4.0 + (r - g) / chroma
    };
    let h = 60.0 * if sector < 0.0 { sector + 6.0 } else { sector };

    Hsl {
        h,
        s: if f == 0.0 { 0.0 } else { chroma / f },
        l: (v + v - chroma) / 2.0,
    }
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let Hsl { h, s, l } = hsl;
    let a = s * l.min(1.0 - l);
    let channel = |n: f64| {
        let k = (n + h / 30.0).rem_euclid(12.0);
        l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)
    };
    Rgb::new(channel(0.0), channel(8.0), channel(4.0))
}

fn linearize(c: f64) -> f64 {
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance.
pub fn relative_luminance(color: Rgb) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// WCAG contrast ratio in `[1, 21]`, independent of argument order.
pub fn contrast_ratio(c1: Rgb, c2: Rgb) -> f64 {
    let l1 = relative_luminance(c1);
    let l2 = relative_luminance(c2);
    let (bright, dark) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (bright + 0.05) / (dark + 0.05)
}

/// Picks white or black, whichever contrasts more with `background`. Ties go to black.
pub fn font_color(background: Rgb) -> Rgb {
    let black_ratio = contrast_ratio(background, Rgb::BLACK);
    let white_ratio = contrast_ratio(background, Rgb::WHITE);
    if white_ratio > black_ratio {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    }
}
