//! Interpolation curves mapping a normalized input in [0, 1] onto [min, max].
//!
//! The cell renderer builds a `[0, 1] -> [0, 1]` curve once per render and
//! runs every normalized cell value through it before looking up the ramp
//! color. `Exp` emphasizes hot spots, `Log` emphasizes faint density.

use std::fmt;
use std::str::FromStr;

use heatmap_common::{HeatmapError, HeatmapResult};
use serde::{Deserialize, Serialize};

/// Shape of an interpolation curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[default]
    Linear,
    Exp,
    Log,
}

impl InterpolationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolationMethod::Linear => "linear",
            InterpolationMethod::Exp => "exp",
            InterpolationMethod::Log => "log",
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = HeatmapError;

    /// Accepts `linear` (or `lin`), `exp` and `log`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" | "lin" => Ok(InterpolationMethod::Linear),
            "exp" => Ok(InterpolationMethod::Exp),
            "log" => Ok(InterpolationMethod::Log),
            other => Err(HeatmapError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pure `[0, 1] -> [min, max]` mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    min: f64,
    delta: f64,
    method: InterpolationMethod,
}

impl Curve {
    pub fn new(min: f64, max: f64, method: InterpolationMethod) -> Self {
        Self {
            min,
            delta: max - min,
            method,
        }
    }

    /// Build a curve from a method name.
    pub fn from_name(min: f64, max: f64, method: &str) -> HeatmapResult<Self> {
        Ok(Self::new(min, max, method.parse()?))
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    /// Evaluate the curve at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let offset = match self.method {
            InterpolationMethod::Linear => self.delta * x,
            InterpolationMethod::Exp => (x * (1.0 + self.delta).ln()).exp() - 1.0,
            InterpolationMethod::Log => self.delta * (x + 1.0).log2(),
        };
        self.min + offset
    }
}

/// Build the interpolation function for `method` over `[min, max]`.
///
/// Fails with [`HeatmapError::UnsupportedMethod`] for unknown method names,
/// before any rendering work starts.
pub fn make_curve(min: f64, max: f64, method: &str) -> HeatmapResult<impl Fn(f64) -> f64> {
    let curve = Curve::from_name(min, max, method)?;
    Ok(move |x| curve.eval(x))
}
