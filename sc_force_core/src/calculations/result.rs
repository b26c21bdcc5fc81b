//! # Calculation Results
//!
//! One [`ForceResult`] per reference temperature. Every field is optional: a
//! step whose inputs are absent leaves its field unset, and so does every
//! later step depending on it. Unset is never reported as zero.

use serde::{Deserialize, Serialize};

use crate::equations::BundleContact;
use crate::units::{Kilonewtons, Newtons};

/// Unit of the force-valued fields of a [`ForceResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceUnit {
    /// Raw pipeline output
    #[default]
    Newtons,
    /// Converted for presentation
    Kilonewtons,
}

/// Results of one regime pipeline at one static tension.
///
/// Lengths in m, angles in degrees (γ in radians), periods in s, forces in
/// [`ForceResult::force_unit`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceResult {
    pub force_unit: ForceUnit,

    /// Cord length
    pub l_c: Option<f64>,
    /// Effective span of a resting conductor
    pub l_eff: Option<f64>,
    /// Concentrated mass per unit length and sub-conductor
    pub m_c: Option<f64>,
    /// Characteristic force per unit length F' in N/m
    pub f_a: Option<f64>,
    pub r: Option<f64>,
    pub delta_1: Option<f64>,
    pub f_es: Option<f64>,
    pub t: Option<f64>,
    pub t_res: Option<f64>,
    pub e_eff: Option<f64>,
    /// Stiffness norm N in 1/N
    pub norm: Option<f64>,
    pub zeta: Option<f64>,
    pub delta_end: Option<f64>,
    pub delta_max: Option<f64>,
    pub phi: Option<f64>,
    pub psi: Option<f64>,
    pub f_td: Option<f64>,
    pub eps_ela: Option<f64>,
    pub eps_th: Option<f64>,
    pub c_d: Option<f64>,
    pub c_f: Option<f64>,
    pub f_ed: Option<f64>,
    pub f_fd: Option<f64>,
    pub b_h: Option<f64>,
    pub a_min: Option<f64>,
    /// Mean spacer distance
    pub l_s: Option<f64>,

    // Bundle contraction
    pub f_pi_d: Option<f64>,
    pub nu_1: Option<f64>,
    pub tau: Option<f64>,
    pub gamma: Option<f64>,
    pub t_pi: Option<f64>,
    pub nu_2: Option<f64>,
    pub nu_3: Option<f64>,
    pub f_v: Option<f64>,
    pub eps_st: Option<f64>,
    pub eps_pi: Option<f64>,
    pub j: Option<f64>,
    /// ξ (clashing) or η (spread), never both
    pub contact: Option<BundleContact>,
    pub nu_4: Option<f64>,
    pub nu_e: Option<f64>,
}

impl ForceResult {
    /// Factor ξ, when the sub-conductors clash
    pub fn xi(&self) -> Option<f64> {
        match self.contact {
            Some(BundleContact::Clashing { xi }) => Some(xi),
            _ => None,
        }
    }

    /// Factor η, when the sub-conductors only approach
    pub fn eta(&self) -> Option<f64> {
        match self.contact {
            Some(BundleContact::Spread { eta }) => Some(eta),
            _ => None,
        }
    }

    /// Convert F_td, F_fd, F_pi,d and F_v from N to kN.
    ///
    /// A plain division by 1000; a result already in kN is returned unchanged.
    pub fn into_kilonewtons(self) -> Self {
        if self.force_unit == ForceUnit::Kilonewtons {
            return self;
        }
        let kn = |value: Option<f64>| value.map(|n| Kilonewtons::from(Newtons(n)).value());
        ForceResult {
            force_unit: ForceUnit::Kilonewtons,
            f_td: kn(self.f_td),
            f_fd: kn(self.f_fd),
            f_pi_d: kn(self.f_pi_d),
            f_v: kn(self.f_v),
            ..self
        }
    }

    /// Named scalar fields in pipeline order, for tables and exports.
    pub fn fields(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("l_c", self.l_c),
            ("l_eff", self.l_eff),
            ("m_c", self.m_c),
            ("F_a", self.f_a),
            ("r", self.r),
            ("δ_1", self.delta_1),
            ("f_es", self.f_es),
            ("T", self.t),
            ("T_res", self.t_res),
            ("E_eff", self.e_eff),
            ("N", self.norm),
            ("ζ", self.zeta),
            ("δ_end", self.delta_end),
            ("δ_max", self.delta_max),
            ("φ", self.phi),
            ("ψ", self.psi),
            ("F_td", self.f_td),
            ("ε_ela", self.eps_ela),
            ("ε_th", self.eps_th),
            ("C_D", self.c_d),
            ("C_F", self.c_f),
            ("f_ed", self.f_ed),
            ("F_fd", self.f_fd),
            ("b_h", self.b_h),
            ("a_min", self.a_min),
            ("l_s", self.l_s),
            ("F_pi_d", self.f_pi_d),
            ("ν_1", self.nu_1),
            ("τ", self.tau),
            ("γ", self.gamma),
            ("T_pi", self.t_pi),
            ("ν_2", self.nu_2),
            ("ν_3", self.nu_3),
            ("F_v", self.f_v),
            ("ε_st", self.eps_st),
            ("ε_pi", self.eps_pi),
            ("j", self.j),
            ("ξ", self.xi()),
            ("η", self.eta()),
            ("ν_4", self.nu_4),
            ("ν_e", self.nu_e),
        ]
    }
}

/// Results at the two reference temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPair {
    pub temperature_low: i32,
    pub temperature_high: i32,
    pub low: ForceResult,
    pub high: ForceResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> ForceResult {
        ForceResult {
            f_td: Some(36_183.448884),
            f_fd: Some(66_736.297995),
            f_pi_d: Some(32_117.021735),
            f_v: Some(69_340.930586),
            psi: Some(0.691004),
            ..Default::default()
        }
    }

    #[test]
    fn test_into_kilonewtons_divides_exactly() {
        let raw = raw();
        let kn = raw.clone().into_kilonewtons();
        assert_eq!(kn.force_unit, ForceUnit::Kilonewtons);
        assert_eq!(kn.f_td, raw.f_td.map(|v| v / 1000.0));
        assert_eq!(kn.f_fd, raw.f_fd.map(|v| v / 1000.0));
        assert_eq!(kn.f_pi_d, raw.f_pi_d.map(|v| v / 1000.0));
        assert_eq!(kn.f_v, raw.f_v.map(|v| v / 1000.0));
        // Non-force fields untouched
        assert_eq!(kn.psi, raw.psi);
    }

    #[test]
    fn test_conversion_happens_once() {
        let once = raw().into_kilonewtons();
        assert_eq!(once.clone().into_kilonewtons(), once);
    }

    #[test]
    fn test_unset_stays_unset() {
        let kn = ForceResult::default().into_kilonewtons();
        assert_eq!(kn.f_pi_d, None);
        assert!(kn.fields().iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_exactly_one_bundle_factor() {
        let clashing = ForceResult {
            contact: Some(BundleContact::Clashing { xi: 14.8 }),
            ..Default::default()
        };
        assert_eq!(clashing.xi(), Some(14.8));
        assert_eq!(clashing.eta(), None);

        let spread = ForceResult {
            contact: Some(BundleContact::Spread { eta: 0.06 }),
            ..Default::default()
        };
        assert_eq!(spread.xi(), None);
        assert_eq!(spread.eta(), Some(0.06));
    }
}
