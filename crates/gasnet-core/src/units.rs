//! Compile-time unit safety for pipeline quantities.
//!
//! Prevents mixing incompatible units like MMscfd and psia, or miles and
//! inches.
//!
//! # Design Philosophy
//!
//! Pipeline capacity planning juggles several physical quantities:
//! - Volumetric flow (MMscfd)
//! - Pressure (psia) and pressure-squared (psia²) for Weymouth-style models
//! - Segment geometry (miles, inches)
//! - Commercial rates ($/MMscf)
//!
//! Using raw `f64` values throughout makes it easy to accidentally add a
//! pressure to a flow or pass a diameter where a length is expected. These
//! newtype wrappers catch such errors at compile time.
//!
//! # Zero Runtime Overhead
//!
//! All types are thin wrappers around `f64`; the compiler optimizes the
//! wrapper away entirely.
//!
//! # Usage
//!
//! ```
//! use gasnet_core::units::{Mmscfd, Psia};
//!
//! let supply = Mmscfd(800.0);
//! let total = supply + Mmscfd(200.0);
//!
//! let p = Psia(900.0);
//! let psq = p.squared();
//! assert!((psq.value() - 810_000.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Component-wise maximum
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            /// Component-wise minimum
            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }
        }
    };
}

/// Volumetric gas flow in million standard cubic feet per day
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mmscfd(pub f64);
impl_unit_ops!(Mmscfd, "MMscfd");

/// Absolute pressure in pounds per square inch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psia(pub f64);
impl_unit_ops!(Psia, "psia");

/// Squared pressure (psia²), the decision-variable space of the Weymouth model
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PsiaSq(pub f64);
impl_unit_ops!(PsiaSq, "psia²");

/// Pressure difference (gauge-style boost) in psi
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psi(pub f64);
impl_unit_ops!(Psi, "psi");

/// Segment length in statute miles
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Miles(pub f64);
impl_unit_ops!(Miles, "mi");

/// Inner pipe diameter in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);
impl_unit_ops!(Inches, "in");

/// Commercial rate in dollars per million standard cubic feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DollarsPerMmscf(pub f64);
impl_unit_ops!(DollarsPerMmscf, "$/MMscf");

impl Psia {
    /// Square the pressure into the P² decision-variable space.
    #[inline]
    pub fn squared(self) -> PsiaSq {
        PsiaSq(self.0 * self.0)
    }
}

impl PsiaSq {
    /// Back to pressure; negative values (solver noise) clamp to zero.
    #[inline]
    pub fn sqrt(self) -> Psia {
        Psia(self.0.max(0.0).sqrt())
    }
}
