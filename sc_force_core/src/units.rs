//! # Unit Types
//!
//! Type-safe wrappers for the units that cross the engine boundary. The engine
//! itself computes in plain SI `f64`; these newtypes exist where values change
//! unit: when a form record is normalized into the SI input, and when force
//! results are handed back in kilonewtons.
//!
//! ## Form Units vs. SI
//!
//! | Quantity        | Form unit | Engine unit |
//! |-----------------|-----------|-------------|
//! | Current         | kA        | A           |
//! | Diameter        | mm        | m           |
//! | Cross-section   | mm²       | m²          |
//! | Elastic modulus | N/mm²     | N/m²        |
//! | Force           | kN        | N           |
//!
//! ## Example
//!
//! ```rust
//! use sc_force_core::units::{Kiloamperes, Amperes, Newtons, Kilonewtons};
//!
//! let i: Amperes = Kiloamperes(40.0).into();
//! assert_eq!(i.0, 40_000.0);
//!
//! let f: Kilonewtons = Newtons(23_400.0).into();
//! assert_eq!(f.0, 23.4);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Current
// ============================================================================

/// Current in amperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amperes(pub f64);

/// Current in kiloamperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kiloamperes(pub f64);

impl From<Kiloamperes> for Amperes {
    fn from(ka: Kiloamperes) -> Self {
        Amperes(ka.0 * 1000.0)
    }
}

impl From<Amperes> for Kiloamperes {
    fn from(a: Amperes) -> Self {
        Kiloamperes(a.0 / 1000.0)
    }
}

// ============================================================================
// Length
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

// ============================================================================
// Area
// ============================================================================

/// Area in square metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

/// Area in square millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMillimeters(pub f64);

impl From<SquareMillimeters> for SquareMeters {
    fn from(mm2: SquareMillimeters) -> Self {
        SquareMeters(mm2.0 / 1_000_000.0)
    }
}

impl From<SquareMeters> for SquareMillimeters {
    fn from(m2: SquareMeters) -> Self {
        SquareMillimeters(m2.0 * 1_000_000.0)
    }
}

// ============================================================================
// Stress / Elastic Modulus
// ============================================================================

/// Stress in N/m² (pascals)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pascals(pub f64);

/// Stress in N/mm² (megapascals)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewtonsPerSqMm(pub f64);

impl From<NewtonsPerSqMm> for Pascals {
    fn from(n_mm2: NewtonsPerSqMm) -> Self {
        Pascals(n_mm2.0 * 1_000_000.0)
    }
}

impl From<Pascals> for NewtonsPerSqMm {
    fn from(pa: Pascals) -> Self {
        NewtonsPerSqMm(pa.0 / 1_000_000.0)
    }
}

// ============================================================================
// Force
// ============================================================================

/// Force in newtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Newtons(pub f64);

/// Force in kilonewtons (1 kN = 1000 N)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilonewtons(pub f64);

impl From<Newtons> for Kilonewtons {
    fn from(n: Newtons) -> Self {
        Kilonewtons(n.0 / 1000.0)
    }
}

impl From<Kilonewtons> for Newtons {
    fn from(kn: Kilonewtons) -> Self {
        Newtons(kn.0 * 1000.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
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

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Amperes);
impl_arithmetic!(Kiloamperes);
impl_arithmetic!(Meters);
impl_arithmetic!(Millimeters);
impl_arithmetic!(SquareMeters);
impl_arithmetic!(SquareMillimeters);
impl_arithmetic!(Pascals);
impl_arithmetic!(NewtonsPerSqMm);
impl_arithmetic!(Newtons);
impl_arithmetic!(Kilonewtons);
