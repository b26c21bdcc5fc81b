//! # Regime Dispatcher
//!
//! Selects the regime for an input and runs its pipeline once per reference
//! temperature. The pipeline is a fixed chain of equation-library calls with
//! three implicit steps (ψ, T_pi/ν2 and ξ or η) handed to the
//! [`TieredSolver`].
//!
//! ## Steps
//!
//! 1. Span and cord length, concentrated mass, force per unit length
//! 2. Force ratio r, direction δ1, static sag, periods T and T_res
//! 3. Effective modulus, stiffness norm N, stress factor ζ
//! 4. Swing angles δ_end and δ_max, tension factor φ, **ψ**, F_td
//! 5. Strains, C_D, C_F, dynamic sag, F_fd, deflection b_h, clearance a_min
//! 6. Spacer distance and the bundle force F_pi,d: direct multiplier when the
//!    sub-conductors clash effectively, otherwise the contraction chain
//!    (ν1, τ, γ, **T_pi/ν2**, ν3, F_v, ε_st, ε_pi, j, **ξ or η**, ν4, νe)
//!
//! The dispatcher holds no state between calls; the only setting is the
//! solver mode, switched by the sweep runner.
//!
//! ## Example
//!
//! ```rust
//! use sc_force_core::calculations::{input::FormInput, pipeline::Dispatcher};
//!
//! let input = FormInput::twin_bundle_example().normalize().unwrap();
//! let results = Dispatcher::default().calculate(&input).unwrap();
//!
//! // Forces are reported in kN
//! let f_td = results.low.f_td.unwrap();
//! assert!((f_td - 36.18).abs() < 0.01);
//! ```

use tracing::{debug, info};

use super::input::ConductorInput;
use super::regime::{InstallationKey, Regime, SpanSupport};
use super::result::{ForceResult, ResultPair};
use crate::equations::registry::{Equation, EquationTracker};
use crate::equations::{
    bundle_force_contracted, bundle_force_direct, bundle_position_j, clash_guaranteed,
    concentrated_mass_per_length, conductor_length, contraction_frequency_nu1, dynamic_sag,
    effective_length, effective_modulus, elastic_strain, end_swing_angle, fall_force,
    force_direction, force_per_length, force_ratio, force_ratio_under_looped,
    horizontal_deflection_resting, horizontal_deflection_strained, interbundle_force_fv,
    max_swing_angle, minimum_clearance, network_time_constant, nu3_factor, nu4_factor, nu_e_factor,
    phase_angle, reference_length, resultant_period, sag_factor_cd, sag_factor_cf,
    short_circuit_tension, spacer_distance_mean, static_sag, stiffness_norm, strain_factor_pi,
    strain_factor_st, stress_factor, swing_period, tension_factor_phi, thermal_strain,
    BundleContact,
};
use crate::errors::{CalcError, CalcResult};
use crate::solver::implicit::{solve_contraction_time, solve_eta, solve_psi, solve_xi, EtaEquation};
use crate::solver::{SolverMode, TieredSolver};

/// Optional equation recording for one load case.
struct Trace<'a> {
    tracker: Option<&'a mut EquationTracker>,
    case: &'static str,
}

impl Trace<'_> {
    fn record(&mut self, equation: Equation, context: &str) {
        if let Some(tracker) = self.tracker.as_deref_mut() {
            tracker.record_for_case(equation, context, self.case);
        }
    }
}

fn checked(quantity: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::calculation_failed(
            quantity,
            format!("non-finite intermediate ({})", value),
        ))
    }
}

/// Runs regime pipelines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dispatcher {
    solver: TieredSolver,
}

impl Dispatcher {
    pub fn new(solver: TieredSolver) -> Self {
        Self { solver }
    }

    pub fn mode(&self) -> SolverMode {
        self.solver.mode
    }

    pub fn set_mode(&mut self, mode: SolverMode) {
        self.solver = self.solver.with_mode(mode);
    }

    /// Regime and support model for an input.
    ///
    /// # Errors
    /// `UnsupportedRegime` when no regime is declared for the installation or
    /// the declared regime has no pipeline.
    pub fn select_regime(&self, input: &ConductorInput) -> CalcResult<(Regime, SpanSupport)> {
        let key = InstallationKey::from(&input.installation);
        let regime = Regime::select(key).ok_or_else(|| {
            debug!(?key, "no regime declared for installation");
            key.unsupported()
        })?;
        let support = regime.support().ok_or_else(|| {
            debug!(regime = regime.code(), "regime declared but not supported");
            key.unsupported()
        })?;
        Ok((regime, support))
    }

    /// Results at both reference temperatures, forces in kN.
    pub fn calculate(&self, input: &ConductorInput) -> CalcResult<ResultPair> {
        self.run(input, None).map(|(_, pair)| pair)
    }

    /// Like [`Dispatcher::calculate`], recording every equation evaluated.
    pub fn calculate_with_tracker(
        &self,
        input: &ConductorInput,
        tracker: &mut EquationTracker,
    ) -> CalcResult<(Regime, ResultPair)> {
        self.run(input, Some(tracker))
    }

    fn run(
        &self,
        input: &ConductorInput,
        mut tracker: Option<&mut EquationTracker>,
    ) -> CalcResult<(Regime, ResultPair)> {
        input.validate()?;
        let (regime, support) = self.select_regime(input)?;

        let low = self
            .run_pipeline(
                support,
                input,
                input.f_st_low,
                Trace {
                    tracker: tracker.as_deref_mut(),
                    case: "low",
                },
            )?
            .into_kilonewtons();
        let high = self
            .run_pipeline(
                support,
                input,
                input.f_st_high,
                Trace {
                    tracker: tracker.as_deref_mut(),
                    case: "high",
                },
            )?
            .into_kilonewtons();

        match self.solver.mode {
            SolverMode::Normal => info!(regime = %regime, "short-circuit forces calculated"),
            SolverMode::Loop => debug!(
                regime = regime.code(),
                f_st = input.f_st_low,
                "sweep point calculated"
            ),
        }

        Ok((
            regime,
            ResultPair {
                temperature_low: input.temperature_low,
                temperature_high: input.temperature_high,
                low,
                high,
            },
        ))
    }

    fn run_pipeline(
        &self,
        support: SpanSupport,
        input: &ConductorInput,
        f_st: f64,
        mut trace: Trace<'_>,
    ) -> CalcResult<ForceResult> {
        let n = input.n_f64();
        let a_cs = input.cross_section;
        let mut res = ForceResult::default();

        // Span geometry and electromagnetic load
        let (span, cord, mass_length) = match support {
            SpanSupport::Strained => {
                let l_c = conductor_length(input.l, input.l_i);
                trace.record(Equation::CordLength, "l_c");
                res.l_c = Some(l_c);
                (input.l, l_c, l_c)
            }
            SpanSupport::Resting | SpanSupport::UnderLooped => {
                let l_eff = effective_length(input.l, input.l_h_f);
                trace.record(Equation::EffectiveLength, "l_eff");
                res.l_eff = Some(l_eff);
                (l_eff, l_eff, input.l)
            }
        };

        let m_c = concentrated_mass_per_length(input.m_c, n, mass_length);
        trace.record(Equation::ConcentratedMass, "m_c");
        let m = input.m_s + m_c;

        let f_a = force_per_length(input.i_k, span, cord, input.a);
        trace.record(Equation::ForcePerLength, "F'");

        let r = match support {
            SpanSupport::UnderLooped => {
                trace.record(Equation::ForceRatioUnderLooped, "r");
                force_ratio_under_looped(f_a, n, m)
            }
            SpanSupport::Strained | SpanSupport::Resting => {
                trace.record(Equation::ForceRatio, "r");
                force_ratio(f_a, n, m)
            }
        };

        // Swing-out
        let delta_1 = force_direction(r);
        let f_es = static_sag(n, m, span, f_st);
        let t = swing_period(f_es);
        let t_res = resultant_period(t, r, delta_1);
        trace.record(Equation::ForceDirection, "δ_1");
        trace.record(Equation::StaticSag, "f_es");
        trace.record(Equation::SwingPeriod, "T");
        trace.record(Equation::ResultantPeriod, "T_res");

        // Stiffness
        let e_eff = effective_modulus(input.e, f_st, n, a_cs);
        let norm = stiffness_norm(input.s, span, n, e_eff, a_cs);
        let zeta = stress_factor(n, m, span, f_st, norm);
        trace.record(Equation::EffectiveModulus, "E_eff");
        trace.record(Equation::StiffnessNorm, "N");
        trace.record(Equation::StressFactor, "ζ");
        debug!(r, delta_1, f_es, t_res, zeta, "swing-out and stiffness");

        // Tensile force
        let delta_end = end_swing_angle(delta_1, input.t_k, t_res);
        let delta_max = max_swing_angle(r, delta_end);
        let phi = tension_factor_phi(input.t_k, t_res, r, delta_end);
        trace.record(Equation::EndSwingAngle, "δ_end");
        trace.record(Equation::MaxSwingAngle, "δ_max");
        trace.record(Equation::TensionFactorPhi, "φ");

        let psi = solve_psi(&self.solver, phi, zeta)?;
        trace.record(Equation::TensionFactorPsi, "ψ");
        let f_td = checked("F_td", short_circuit_tension(f_st, phi, psi))?;
        trace.record(Equation::ShortCircuitTension, "F_td");

        // Dynamic sag, drop force, clearance
        let eps_ela = elastic_strain(norm, f_td, f_st);
        let eps_th = thermal_strain(input.c_th, input.i_k, n, a_cs, input.t_k, t_res);
        let c_d = sag_factor_cd(span, f_es, eps_ela, eps_th);
        let c_f = sag_factor_cf(r);
        let f_ed = dynamic_sag(c_d, c_f, f_es);
        trace.record(Equation::ElasticStrain, "ε_ela");
        trace.record(Equation::ThermalStrain, "ε_th");
        trace.record(Equation::DilatationFactor, "C_D");
        trace.record(Equation::FormFactor, "C_F");
        trace.record(Equation::DynamicSag, "f_ed");

        let f_fd = checked("F_fd", fall_force(f_st, zeta, delta_max))?;
        trace.record(Equation::FallForce, "F_fd");

        let b_h = match support {
            SpanSupport::Strained => {
                trace.record(Equation::DeflectionStrained, "b_h");
                horizontal_deflection_strained(f_ed, delta_max, delta_1)
            }
            SpanSupport::Resting | SpanSupport::UnderLooped => {
                trace.record(Equation::DeflectionResting, "b_h");
                horizontal_deflection_resting(f_ed, delta_max)
            }
        };
        let a_min = minimum_clearance(input.a, b_h);
        trace.record(Equation::MinimumClearance, "a_min");

        let l_s = spacer_distance_mean(&input.spacer_distances);
        trace.record(Equation::SpacerDistanceMean, "l_s");

        res.m_c = Some(m_c);
        res.f_a = Some(f_a);
        res.r = Some(r);
        res.delta_1 = Some(delta_1);
        res.f_es = Some(f_es);
        res.t = Some(t);
        res.t_res = Some(t_res);
        res.e_eff = Some(e_eff);
        res.norm = Some(norm);
        res.zeta = Some(zeta);
        res.delta_end = Some(delta_end);
        res.delta_max = Some(delta_max);
        res.phi = Some(phi);
        res.psi = Some(psi);
        res.f_td = Some(f_td);
        res.eps_ela = Some(eps_ela);
        res.eps_th = Some(eps_th);
        res.c_d = Some(c_d);
        res.c_f = Some(c_f);
        res.f_ed = Some(f_ed);
        res.f_fd = Some(f_fd);
        res.b_h = Some(b_h);
        res.a_min = Some(a_min);
        res.l_s = Some(l_s);

        // Bundle force
        if let Some(a_s) = input.a_s.filter(|a_s| *a_s > 0.0) {
            if clash_guaranteed(a_s, input.d, l_s, n) {
                trace.record(Equation::ClashCriteria, "F_pi,d");
                res.f_pi_d = Some(bundle_force_direct(f_td));
                trace.record(Equation::BundleForceDirect, "F_pi,d");
            } else if input.n > 1 {
                trace.record(Equation::ClashCriteria, "F_pi,d");
                self.contraction_chain(input, a_s, f_st, norm, &mut res, &mut trace)?;
            }
        }

        Ok(res)
    }

    /// Bundle contraction sub-chain, filling the bundle fields of `res`.
    fn contraction_chain(
        &self,
        input: &ConductorInput,
        a_s: f64,
        f_st: f64,
        norm: f64,
        res: &mut ForceResult,
        trace: &mut Trace<'_>,
    ) -> CalcResult<()> {
        let n = input.n_f64();
        let d = input.d;
        let Some(length) = reference_length(res.l_s.unwrap_or(0.0), res.l_eff, res.l_c) else {
            return Ok(());
        };

        let nu_1 = contraction_frequency_nu1(input.i_k, a_s, n, input.m_s, d, input.f);
        let tau = network_time_constant(input.f, input.kappa);
        let gamma = phase_angle(input.f, tau);
        trace.record(Equation::ContractionFactorNu1, "ν_1");
        trace.record(Equation::NetworkTimeConstant, "τ, γ");

        let contraction = solve_contraction_time(&self.solver, nu_1, input.f, tau, gamma)?;
        trace.record(Equation::ContractionTime, "T_pi, ν_2");

        let nu_3 = nu3_factor(a_s, d, n);
        let f_v = interbundle_force_fv(input.i_k, a_s, length, n, contraction.nu_2, nu_3);
        let f_v = checked("F_v", f_v)?;
        let eps_st = strain_factor_st(f_st, length, norm, a_s, n, d);
        let eps_pi = strain_factor_pi(f_v, length, norm, a_s, n, d);
        let j = bundle_position_j(eps_st, eps_pi);
        trace.record(Equation::FactorNu3, "ν_3");
        trace.record(Equation::InterbundleForce, "F_v");
        trace.record(Equation::StrainFactorSt, "ε_st");
        trace.record(Equation::StrainFactorPi, "ε_pi");
        trace.record(Equation::BundlePosition, "j");
        debug!(nu_1, t_pi = contraction.t_pi, nu_2 = contraction.nu_2, j, "bundle contraction");

        let contact = if j >= 1.0 {
            trace.record(Equation::FactorXi, "ξ");
            BundleContact::Clashing {
                xi: solve_xi(&self.solver, j, eps_st)?,
            }
        } else {
            trace.record(Equation::FactorEta, "η");
            let equation = EtaEquation {
                eps_st,
                j,
                nu_3,
                n,
                a_s,
                d,
            };
            BundleContact::Spread {
                eta: solve_eta(&self.solver, equation)?,
            }
        };

        let nu_4 = nu4_factor(a_s, d, contact);
        let nu_e = nu_e_factor(input.i_k, a_s, norm, n, length, d, contraction.nu_2, nu_4, contact);
        let f_pi_d = checked("F_pi,d", bundle_force_contracted(f_st, nu_e, eps_st, contact))?;
        trace.record(Equation::FactorNu4, "ν_4");
        trace.record(Equation::FactorNuE, "ν_e");
        trace.record(Equation::BundleForceContracted, "F_pi,d");

        res.nu_1 = Some(nu_1);
        res.tau = Some(tau);
        res.gamma = Some(gamma);
        res.t_pi = Some(contraction.t_pi);
        res.nu_2 = Some(contraction.nu_2);
        res.nu_3 = Some(nu_3);
        res.f_v = Some(f_v);
        res.eps_st = Some(eps_st);
        res.eps_pi = Some(eps_pi);
        res.j = Some(j);
        res.contact = Some(contact);
        res.nu_4 = Some(nu_4);
        res.nu_e = Some(nu_e);
        res.f_pi_d = Some(f_pi_d);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::calculations::input::{Attachment, ConductorInput, Installation, LoopGeometry};

    /// Single conductor of SN EN 60865-2, 7.3: I_k = 19 kA, l = 10.4 m
    pub fn single_conductor() -> ConductorInput {
        ConductorInput {
            installation: Installation {
                attachment: Attachment::Suspended,
                loop_at_midspan: false,
                height_difference: false,
                loop_plane: None,
            },
            temperature_low: -20,
            temperature_high: 80,
            i_k: 19_000.0,
            kappa: 1.8,
            t_k: 0.3,
            f: 50.0,
            conductor_type: None,
            d: 0.0176,
            cross_section: 243e-6,
            m_s: 0.671,
            e: 55_000e6,
            c_th: 0.27e-18,
            n: 1,
            m_c: None,
            l: 10.4,
            l_i: None,
            l_h_f: None,
            a: 2.0,
            a_s: None,
            spacer_distances: Vec::new(),
            loop_geometry: LoopGeometry::default(),
            f_st_low: 350.0,
            f_st_high: 250.0,
            s: 100_000.0,
        }
    }

    /// Twin bundle of SN EN 60865-2, 8.3.1: I_k = 63 kA, l = 48 m, five spacers
    pub fn twin_bundle() -> ConductorInput {
        ConductorInput {
            i_k: 63_000.0,
            kappa: 1.81,
            t_k: 0.5,
            d: 0.0374,
            cross_section: 1090e-6,
            m_s: 4.24,
            e: 60_000e6,
            n: 2,
            l: 48.0,
            l_i: Some(5.3),
            a: 5.0,
            a_s: Some(0.1),
            spacer_distances: vec![Some(9.8); 5],
            f_st_low: 17_800.0,
            f_st_high: 15_400.0,
            s: 500_000.0,
            ..single_conductor()
        }
    }
}
