//! RGB/HSL color model used to shade heatmap cells.
//!
//! Colors are small immutable values: every transformation (opacity change,
//! interpolation) returns a new color. Blending happens in HSL space so a
//! ramp between two saturated hues passes through saturated intermediates
//! (green to red goes through yellow, not through muddy olive).

use std::fmt;
use std::str::FromStr;

use heatmap_common::{HeatmapError, HeatmapResult};

/// An 8-bit RGB color with a floating point alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// A color in hue/saturation/lightness space, all components in [0, 1].
///
/// Hue is a fraction of a full turn. For achromatic colors (`s == 0`) the
/// hue is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Render an 8-bit component as a zero-padded, lowercase 2-digit hex string.
pub fn to_hex(component: u8) -> String {
    format!("{:02x}", component)
}

impl Rgb {
    /// Create a fully opaque color.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with an explicit alpha.
    pub fn with_alpha(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (case-insensitive, `#` optional).
    ///
    /// The optional fourth byte is the alpha, scaled from [0, 255] to [0, 1].
    pub fn from_hex(hex: &str) -> HeatmapResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let well_formed = matches!(digits.len(), 6 | 8)
            && digits.bytes().all(|b| b.is_ascii_hexdigit());
        if !well_formed {
            return Err(HeatmapError::InvalidColor(hex.to_string()));
        }

        let byte = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| HeatmapError::InvalidColor(hex.to_string()))
        };

        let a = if digits.len() == 8 {
            byte(6)? as f64 / 255.0
        } else {
            1.0
        };

        Ok(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a,
        })
    }

    /// `#rrggbb`, alpha not included.
    pub fn hex(&self) -> String {
        format!("#{}{}{}", to_hex(self.r), to_hex(self.g), to_hex(self.b))
    }

    /// CSS `rgba(r,g,b,a)` string for canvas-style surfaces.
    pub fn rgba(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }

    /// Copy with the alpha replaced by `a`.
    pub fn opacity(&self, a: f64) -> Self {
        Self { a, ..*self }
    }

    /// Copy with the alpha multiplied by `a`.
    pub fn opacify(&self, a: f64) -> Self {
        Self {
            a: self.a * a,
            ..*self
        }
    }

    /// Convert to HSL. Alpha is dropped.
    pub fn hsl(&self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl::new(0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };

        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl::new(h / 6.0, s, l)
    }

    /// Blend towards `other` at position `val` in [0, 1].
    ///
    /// Hue, saturation and lightness are interpolated independently, as is
    /// alpha; the result carries the interpolated alpha.
    pub fn interpolate(&self, other: &Rgb, val: f64) -> Rgb {
        let from = self.hsl();
        let to = other.hsl();
        let lerp = |start: f64, end: f64| start + val * (end - start);

        Hsl::new(lerp(from.h, to.h), lerp(from.s, to.s), lerp(from.l, to.l))
            .rgb()
            .opacity(lerp(self.a, other.a))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl FromStr for Rgb {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rgba())
    }
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Convert back to an opaque RGB color.
    pub fn rgb(&self) -> Rgb {
        let Hsl { h, s, l } = *self;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        Rgb::new(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b))
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Scale a [0, 1] channel to a rounded byte.
fn unit_to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Two-color gradient indexed by position in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    pub start: Rgb,
    pub end: Rgb,
}

impl ColorRamp {
    pub fn new(start: Rgb, end: Rgb) -> Self {
        Self { start, end }
    }

    /// Build a ramp from two hex strings.
    pub fn from_hex(start: &str, end: &str) -> HeatmapResult<Self> {
        Ok(Self::new(Rgb::from_hex(start)?, Rgb::from_hex(end)?))
    }

    /// Color at `position` along the ramp.
    pub fn at(&self, position: f64) -> Rgb {
        self.start.interpolate(&self.end, position)
    }
}

impl Default for ColorRamp {
    /// Green to red.
    fn default() -> Self {
        Self::new(Rgb::new(0, 255, 0), Rgb::new(255, 0, 0))
    }
}
