//! # Calculation Input
//!
//! Two records describe an installation:
//!
//! - [`FormInput`] - the values as a form collects them: every field optional,
//!   currents in kA, diameter in mm, cross-section in mm², modulus in N/mm² and
//!   static tension in kN
//! - [`ConductorInput`] - the validated SI record the dispatcher consumes
//!
//! [`FormInput::normalize`] turns the first into the second, reporting missing
//! required fields and invalid values before any regime runs.
//!
//! ## Example
//!
//! ```rust
//! use sc_force_core::calculations::input::FormInput;
//!
//! let input = FormInput::twin_bundle_example().normalize().unwrap();
//! assert_eq!(input.i_k, 63_000.0);
//! assert_eq!(input.n, 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::equations::loop_span::loop_arc_length;
use crate::errors::{CalcError, CalcResult};
use crate::units::{
    Amperes, Kiloamperes, Kilonewtons, Meters, Millimeters, Newtons, NewtonsPerSqMm, Pascals,
    SquareMeters, SquareMillimeters,
};

/// Most spacer distances a span can carry.
pub const MAX_SPACERS: usize = 10;

// ============================================================================
// Installation Descriptors
// ============================================================================

/// How the main conductor is attached at the span ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attachment {
    /// Strained between tension insulator chains
    Suspended,
    /// Resting on post insulators
    Resting,
    /// Looped under the post insulators
    UnderLooped,
    /// Ends in a loop at the span end
    LoopAtSpanEnd,
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attachment::Suspended => "Suspended",
            Attachment::Resting => "Resting",
            Attachment::UnderLooped => "Under-looped",
            Attachment::LoopAtSpanEnd => "Loop at span end",
        };
        write!(f, "{}", name)
    }
}

/// Plane of a loop at midspan relative to the main conductors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPlane {
    Parallel,
    Perpendicular,
}

impl fmt::Display for LoopPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopPlane::Parallel => write!(f, "parallel"),
            LoopPlane::Perpendicular => write!(f, "perpendicular"),
        }
    }
}

/// The categorical attributes that select a calculation regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Installation {
    pub attachment: Attachment,
    pub loop_at_midspan: bool,
    /// Height difference between the attachment points above 25 %
    pub height_difference: bool,
    /// Only meaningful with a loop at midspan
    #[serde(default)]
    pub loop_plane: Option<LoopPlane>,
}

/// Geometry of a dropper loop at midspan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoopGeometry {
    /// Loop height in m
    pub h: Option<f64>,
    /// Loop width in m
    pub w: Option<f64>,
    /// Arc length in m; estimated from `h` and `w` when absent
    pub l_v: Option<f64>,
}

impl LoopGeometry {
    /// Given arc length, or the estimate from height and width
    pub fn arc_length(&self) -> Option<f64> {
        match (self.l_v, self.h, self.w) {
            (Some(l_v), _, _) => Some(l_v),
            (None, Some(h), Some(w)) => Some(loop_arc_length(h, w)),
            _ => None,
        }
    }
}

// ============================================================================
// SI Input Record
// ============================================================================

/// Validated installation data in SI units.
///
/// Read-only once built; the sweep runner is the only code that changes the
/// static tension, and it restores it on every exit path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductorInput {
    #[serde(flatten)]
    pub installation: Installation,

    /// Lower reference temperature in °C (label only)
    pub temperature_low: i32,
    /// Upper reference temperature in °C (label only)
    pub temperature_high: i32,

    // Electrical
    /// Initial symmetrical three-phase short-circuit current I_k″ in A
    pub i_k: f64,
    /// Peak factor κ
    pub kappa: f64,
    /// Short-circuit duration t_k in s
    pub t_k: f64,
    /// System frequency f in Hz
    pub f: f64,

    // Cable
    /// Conductor designation, e.g. "ASLH-D(S) 1x537"
    #[serde(default)]
    pub conductor_type: Option<String>,
    /// Sub-conductor diameter d in m
    pub d: f64,
    /// Cross-section of one sub-conductor A_s in m²
    pub cross_section: f64,
    /// Mass per unit length of one sub-conductor m_s in kg/m
    pub m_s: f64,
    /// Young's modulus E in N/m²
    pub e: f64,
    /// Material constant c_th in m⁴/(A²·s)
    pub c_th: f64,
    /// Number of sub-conductors n
    pub n: u32,
    /// Sum of concentrated masses in the span m_c in kg
    #[serde(default)]
    pub m_c: Option<f64>,

    // Geometry
    /// Centre-line distance between supports l in m
    pub l: f64,
    /// Length of one tension insulator chain l_i in m
    #[serde(default)]
    pub l_i: Option<f64>,
    /// Length of the clamp on a post insulator l_h_f in m
    #[serde(default)]
    pub l_h_f: Option<f64>,
    /// Centre-line distance between main conductors a in m
    pub a: f64,
    /// Distance between sub-conductors a_s in m (required for n > 1)
    #[serde(default)]
    pub a_s: Option<f64>,
    /// Distances between adjacent spacers in m
    #[serde(default)]
    pub spacer_distances: Vec<Option<f64>>,
    #[serde(default)]
    pub loop_geometry: LoopGeometry,

    // Mechanical
    /// Static tensile force at the lower temperature F_st in N
    pub f_st_low: f64,
    /// Static tensile force at the upper temperature F_st in N
    pub f_st_high: f64,
    /// Resultant spring constant of both supports S in N/m
    pub s: f64,
}

fn finite(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Value must be finite"))
    }
}

fn positive(field: &str, value: f64) -> CalcResult<()> {
    if finite(field, value)? <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> CalcResult<()> {
    if finite(field, value)? < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value cannot be negative"));
    }
    Ok(())
}

impl ConductorInput {
    /// Validate every stated invariant of the record.
    pub fn validate(&self) -> CalcResult<()> {
        positive("i_k", self.i_k)?;
        positive("t_k", self.t_k)?;
        positive("f", self.f)?;
        positive("d", self.d)?;
        positive("cross_section", self.cross_section)?;
        positive("m_s", self.m_s)?;
        positive("e", self.e)?;
        non_negative("c_th", self.c_th)?;
        positive("l", self.l)?;
        positive("a", self.a)?;
        positive("f_st_low", self.f_st_low)?;
        positive("f_st_high", self.f_st_high)?;
        positive("s", self.s)?;

        if !(1.0..=2.0).contains(&finite("kappa", self.kappa)?) {
            return Err(CalcError::invalid_input(
                "kappa",
                self.kappa.to_string(),
                "Peak factor must lie between 1.0 and 2.0",
            ));
        }

        if self.n == 0 {
            return Err(CalcError::invalid_input(
                "n",
                "0",
                "At least one sub-conductor is required",
            ));
        }

        if let Some(m_c) = self.m_c {
            non_negative("m_c", m_c)?;
        }

        for (field, value) in [("l_i", self.l_i), ("l_h_f", self.l_h_f)] {
            if let Some(length) = value {
                non_negative(field, length)?;
                if length >= self.l / 2.0 {
                    return Err(CalcError::invalid_input(
                        field,
                        length.to_string(),
                        "Length must be shorter than half the span",
                    ));
                }
            }
        }

        match (self.n > 1, self.a_s) {
            (true, None) => return Err(CalcError::missing_field("a_s")),
            (true, Some(a_s)) => {
                positive("a_s", a_s)?;
                if a_s <= self.d {
                    return Err(CalcError::invalid_input(
                        "a_s",
                        a_s.to_string(),
                        "Sub-conductor distance must exceed the conductor diameter",
                    ));
                }
            }
            (false, Some(a_s)) => non_negative("a_s", a_s)?,
            (false, None) => {}
        }

        if self.spacer_distances.len() > MAX_SPACERS {
            return Err(CalcError::invalid_input(
                "spacer_distances",
                self.spacer_distances.len().to_string(),
                format!("At most {} spacer distances are supported", MAX_SPACERS),
            ));
        }
        for distance in self.spacer_distances.iter().flatten() {
            non_negative("spacer_distances", *distance)?;
        }

        let lg = &self.loop_geometry;
        for (field, value) in [("h", lg.h), ("w", lg.w), ("l_v", lg.l_v)] {
            if let Some(v) = value {
                non_negative(field, v)?;
            }
        }

        Ok(())
    }

    /// Number of sub-conductors as a float for the formulas
    pub fn n_f64(&self) -> f64 {
        f64::from(self.n)
    }
}

// ============================================================================
// Form Record
// ============================================================================

/// Installation data as entered in a form, in form units.
///
/// ## JSON Example
///
/// ```json
/// {
///   "attachment": "suspended",
///   "loop_at_midspan": false,
///   "height_difference": false,
///   "i_k_ka": 19.0,
///   "kappa": 1.8,
///   "t_k": 0.3,
///   "f": 50.0,
///   "d_mm": 17.6,
///   "cross_section_mm2": 243.0,
///   "m_s": 0.671,
///   "e_n_per_mm2": 55000.0,
///   "c_th": 0.27e-18,
///   "n": 1,
///   "l": 10.4,
///   "a": 2.0,
///   "f_st_low_kn": 0.35,
///   "f_st_high_kn": 0.25,
///   "s": 100000.0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub attachment: Option<Attachment>,
    pub loop_at_midspan: Option<bool>,
    pub height_difference: Option<bool>,
    pub loop_plane: Option<LoopPlane>,
    pub temperature_low: Option<i32>,
    pub temperature_high: Option<i32>,

    /// Short-circuit current in kA
    pub i_k_ka: Option<f64>,
    pub kappa: Option<f64>,
    pub t_k: Option<f64>,
    pub f: Option<f64>,

    pub conductor_type: Option<String>,
    /// Diameter in mm
    pub d_mm: Option<f64>,
    /// Cross-section in mm²
    pub cross_section_mm2: Option<f64>,
    pub m_s: Option<f64>,
    /// Young's modulus in N/mm²
    pub e_n_per_mm2: Option<f64>,
    pub c_th: Option<f64>,
    pub n: Option<f64>,
    pub m_c: Option<f64>,

    pub l: Option<f64>,
    pub l_i: Option<f64>,
    pub l_h_f: Option<f64>,
    pub a: Option<f64>,
    pub a_s: Option<f64>,
    pub spacer_distances: Vec<Option<f64>>,
    pub h: Option<f64>,
    pub w: Option<f64>,
    pub l_v: Option<f64>,

    /// Static tension at the lower temperature in kN
    pub f_st_low_kn: Option<f64>,
    /// Static tension at the upper temperature in kN
    pub f_st_high_kn: Option<f64>,
    pub s: Option<f64>,
}

fn required<T>(field: &str, value: Option<T>) -> CalcResult<T> {
    value.ok_or_else(|| CalcError::missing_field(field))
}

fn kilonewtons(field: &str, value: Option<f64>) -> CalcResult<f64> {
    Ok(Newtons::from(Kilonewtons(required(field, value)?)).value())
}

impl FormInput {
    /// Convert to SI units and validate.
    ///
    /// # Errors
    /// `MissingField` for an absent required value, `InvalidInput` for a value
    /// outside its valid range.
    pub fn normalize(&self) -> CalcResult<ConductorInput> {
        let loop_at_midspan = required("loop_at_midspan", self.loop_at_midspan)?;
        let installation = Installation {
            attachment: required("attachment", self.attachment)?,
            loop_at_midspan,
            height_difference: required("height_difference", self.height_difference)?,
            loop_plane: if loop_at_midspan { self.loop_plane } else { None },
        };

        let n = required("n", self.n)?;
        if !n.is_finite() || n < 1.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
            return Err(CalcError::invalid_input(
                "n",
                n.to_string(),
                "Number of sub-conductors must be a whole number of at least 1",
            ));
        }

        let input = ConductorInput {
            installation,
            temperature_low: self.temperature_low.unwrap_or(-20),
            temperature_high: self.temperature_high.unwrap_or(80),
            i_k: Amperes::from(Kiloamperes(required("i_k_ka", self.i_k_ka)?)).value(),
            kappa: required("kappa", self.kappa)?,
            t_k: required("t_k", self.t_k)?,
            f: required("f", self.f)?,
            conductor_type: self.conductor_type.clone(),
            d: Meters::from(Millimeters(required("d_mm", self.d_mm)?)).value(),
            cross_section: SquareMeters::from(SquareMillimeters(required(
                "cross_section_mm2",
                self.cross_section_mm2,
            )?))
            .value(),
            m_s: required("m_s", self.m_s)?,
            e: Pascals::from(NewtonsPerSqMm(required("e_n_per_mm2", self.e_n_per_mm2)?)).value(),
            c_th: required("c_th", self.c_th)?,
            n: n as u32,
            m_c: self.m_c,
            l: required("l", self.l)?,
            l_i: self.l_i,
            l_h_f: self.l_h_f,
            a: required("a", self.a)?,
            a_s: self.a_s,
            spacer_distances: self.spacer_distances.clone(),
            loop_geometry: LoopGeometry {
                h: self.h,
                w: self.w,
                l_v: self.l_v,
            },
            f_st_low: kilonewtons("f_st_low_kn", self.f_st_low_kn)?,
            f_st_high: kilonewtons("f_st_high_kn", self.f_st_high_kn)?,
            s: required("s", self.s)?,
        };
        input.validate()?;
        Ok(input)
    }

    /// Twin-bundle span of the worked example in SN EN 60865-2, 8.3.1.
    pub fn twin_bundle_example() -> Self {
        FormInput {
            attachment: Some(Attachment::Suspended),
            loop_at_midspan: Some(false),
            height_difference: Some(false),
            temperature_low: Some(-20),
            temperature_high: Some(60),
            i_k_ka: Some(63.0),
            kappa: Some(1.81),
            t_k: Some(0.5),
            f: Some(50.0),
            conductor_type: Some("AL1/ST1A 537/53".to_string()),
            d_mm: Some(37.4),
            cross_section_mm2: Some(1090.0),
            m_s: Some(4.24),
            e_n_per_mm2: Some(60_000.0),
            c_th: Some(0.27e-18),
            n: Some(2.0),
            l: Some(48.0),
            l_i: Some(5.3),
            a: Some(5.0),
            a_s: Some(0.1),
            spacer_distances: vec![Some(9.8); 5],
            f_st_low_kn: Some(17.8),
            f_st_high_kn: Some(15.4),
            s: Some(500_000.0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_converts_form_units() {
        let input = FormInput::twin_bundle_example().normalize().unwrap();
        assert_eq!(input.i_k, 63_000.0);
        assert!((input.d - 0.0374).abs() < 1e-15);
        assert!((input.cross_section - 1090e-6).abs() < 1e-18);
        assert_eq!(input.e, 60_000.0e6);
        assert!((input.f_st_low - 17_800.0).abs() < 1e-9);
        assert!((input.f_st_high - 15_400.0).abs() < 1e-9);
        assert_eq!(input.temperature_low, -20);
        assert_eq!(input.installation.loop_plane, None);
    }

    #[test]
    fn test_missing_required_field() {
        let form = FormInput {
            i_k_ka: None,
            ..FormInput::twin_bundle_example()
        };
        assert_eq!(form.normalize().unwrap_err(), CalcError::missing_field("i_k_ka"));
    }

    #[test]
    fn test_subconductor_spacing_required_for_bundles() {
        let form = FormInput {
            a_s: None,
            ..FormInput::twin_bundle_example()
        };
        assert_eq!(form.normalize().unwrap_err(), CalcError::missing_field("a_s"));

        let single = FormInput {
            a_s: None,
            n: Some(1.0),
            ..FormInput::twin_bundle_example()
        };
        assert!(single.normalize().is_ok());
    }

    #[test]
    fn test_subconductor_spacing_must_exceed_diameter() {
        let form = FormInput {
            a_s: Some(0.03),
            ..FormInput::twin_bundle_example()
        };
        let err = form.normalize().unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "a_s"));
    }

    #[test]
    fn test_fractional_subconductor_count_rejected() {
        for n in [0.0, 1.5, -2.0] {
            let form = FormInput {
                n: Some(n),
                ..FormInput::twin_bundle_example()
            };
            assert_eq!(form.normalize().unwrap_err().error_code(), "INVALID_INPUT");
        }
    }

    #[test]
    fn test_range_checks() {
        let mut input = FormInput::twin_bundle_example().normalize().unwrap();
        input.kappa = 2.1;
        assert!(input.validate().is_err());

        let mut input = FormInput::twin_bundle_example().normalize().unwrap();
        input.l_i = Some(24.0);
        assert!(input.validate().is_err());

        let mut input = FormInput::twin_bundle_example().normalize().unwrap();
        input.spacer_distances = vec![Some(1.0); MAX_SPACERS + 1];
        assert!(input.validate().is_err());

        let mut input = FormInput::twin_bundle_example().normalize().unwrap();
        input.t_k = f64::NAN;
        assert!(input.validate().is_err());

        let mut input = FormInput::twin_bundle_example().normalize().unwrap();
        input.m_c = Some(-1.0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_loop_plane_dropped_without_loop() {
        let form = FormInput {
            loop_plane: Some(LoopPlane::Parallel),
            ..FormInput::twin_bundle_example()
        };
        assert_eq!(form.normalize().unwrap().installation.loop_plane, None);
    }

    #[test]
    fn test_loop_arc_length_estimate() {
        let given = LoopGeometry {
            h: Some(3.0),
            w: Some(4.0),
            l_v: Some(6.0),
        };
        assert_eq!(given.arc_length(), Some(6.0));
        let estimated = LoopGeometry { l_v: None, ..given };
        assert!((estimated.arc_length().unwrap() - 5.25).abs() < 1e-12);
        assert_eq!(LoopGeometry::default().arc_length(), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let input = FormInput::twin_bundle_example().normalize().unwrap();
        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("\"attachment\":\"suspended\""));
        let back: ConductorInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
    }
}
