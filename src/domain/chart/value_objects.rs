use serde::{Deserialize, Serialize};

/// Value Object - visible window in fractional bar indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn span(&self) -> f64 {
        self.to - self.from
    }

    pub fn center(&self) -> f64 {
        (self.from + self.to) / 2.0
    }

    pub fn is_finite(&self) -> bool {
        self.from.is_finite() && self.to.is_finite()
    }

    /// Same span, moved so that its midpoint sits on `logical`.
    pub fn centered_on(&self, logical: f64) -> Self {
        let half = self.span() / 2.0;
        Self { from: logical - half, to: logical + half }
    }

    pub fn shifted(&self, delta: f64) -> Self {
        Self { from: self.from + delta, to: self.to + delta }
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self::rgba(((hex >> 16) & 0xFF) as u8, ((hex >> 8) & 0xFF) as u8, (hex & 0xFF) as u8, 1.0)
    }

    /// Parse `#rrggbb`.
    pub fn parse(css: &str) -> Option<Self> {
        let hex = css.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self::from_hex)
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let css = String::deserialize(deserializer)?;
        Color::parse(&css).ok_or_else(|| serde::de::Error::custom(format!("expected #rrggbb, got {css}")))
    }
}

/// Pixel extent of the chart's drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        x.clamp(0.0, self.width.max(0.0))
    }
}
