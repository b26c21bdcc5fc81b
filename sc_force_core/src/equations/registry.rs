//! # Equation Registry
//!
//! Central registry of every formula the engine evaluates. Each equation has
//! metadata including its clause in the standard, a plain-text formula and the
//! variable definitions.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe equation identification via the `Equation` enum
//! - Metadata for the calculation report and audit trails
//! - Usage tracking per calculation ([`EquationTracker`])
//! - The generator behind `EQUATIONS.md`
//!
//! ## Usage
//!
//! ```rust
//! use sc_force_core::equations::registry::{Equation, EquationTracker};
//!
//! let mut tracker = EquationTracker::new();
//! tracker.record_for_case(Equation::ShortCircuitTension, "F_td", "low");
//!
//! let meta = Equation::ShortCircuitTension.metadata();
//! assert_eq!(meta.reference.citation(), "SN EN 60865-1:2012, 6.2.3, eq. (33)");
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// Code References
// ============================================================================

/// Reference to the standard a formula is taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeReference {
    /// SN EN 60865-1:2012, short-circuit currents, calculation of effects
    Sn60865 {
        clause: &'static str,
        equation: &'static str,
    },
    /// SN EN 60865-1:2012 Annex A, formulas behind the design figures
    Sn60865Annex {
        annex: &'static str,
        figure: u8,
    },
    /// SN EN 60909-0, short-circuit currents in three-phase a.c. systems
    Sn60909 { clause: &'static str },
    /// Engineering practice of the engine, not prescribed by a standard
    Practice,
}

impl CodeReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Sn60865 { clause, equation } => {
                format!("SN EN 60865-1:2012, {}, eq. {}", clause, equation)
            }
            CodeReference::Sn60865Annex { annex, figure } => {
                format!("SN EN 60865-1:2012, Annex {}, Figure {}", annex, figure)
            }
            CodeReference::Sn60909 { clause } => format!("SN EN 60909-0, {}", clause),
            CodeReference::Practice => "Engineering practice".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::Sn60865 { .. } | CodeReference::Sn60865Annex { .. } => "SN EN 60865-1",
            CodeReference::Sn60909 { .. } => "SN EN 60909-0",
            CodeReference::Practice => "Practice",
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in reports and EQUATIONS.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Span, cord and loop lengths, distributed masses
    Geometry,
    /// Characteristic force per unit length and force ratio
    ElectromagneticLoad,
    /// Swing-out direction, sag, periods and angles
    SwingOut,
    /// Effective modulus, stiffness norm, stress factor
    Stiffness,
    /// Tension factors and the tensile and drop forces
    TensileForces,
    /// Strains and dynamic sag
    DynamicSag,
    /// Horizontal displacement and minimum air clearance
    Clearance,
    /// Sub-conductor bundle contraction (pinch effect)
    BundleContraction,
    /// Peak and thermal-equivalent current factors
    ShortCircuitCurrent,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::Geometry => "Geometry",
            EquationCategory::ElectromagneticLoad => "Electromagnetic Load",
            EquationCategory::SwingOut => "Swing-Out",
            EquationCategory::Stiffness => "Stiffness",
            EquationCategory::TensileForces => "Tensile Forces",
            EquationCategory::DynamicSag => "Dynamic Sag",
            EquationCategory::Clearance => "Clearance",
            EquationCategory::BundleContraction => "Bundle Contraction",
            EquationCategory::ShortCircuitCurrent => "Short-Circuit Current",
        }
    }

    /// Sort order, following the calculation pipeline (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::ShortCircuitCurrent => 1,
            EquationCategory::Geometry => 2,
            EquationCategory::ElectromagneticLoad => 3,
            EquationCategory::SwingOut => 4,
            EquationCategory::Stiffness => 5,
            EquationCategory::TensileForces => 6,
            EquationCategory::DynamicSag => 7,
            EquationCategory::Clearance => 8,
            EquationCategory::BundleContraction => 9,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "F_st", "l_c", "δ1")
    pub symbol: &'static str,
    pub description: &'static str,
    /// SI units, "-" for dimensionless
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for one formula.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name (e.g., "Short-Circuit Tensile Force")
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    pub reference: CodeReference,
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    pub category: EquationCategory,
    /// Source module where the equation implementation lives
    pub source_module: &'static str,
    /// Function name implementing the equation
    pub source_function: &'static str,
}

fn sn60865(clause: &'static str, equation: &'static str) -> CodeReference {
    CodeReference::Sn60865 { clause, equation }
}

fn annex(annex: &'static str, figure: u8) -> CodeReference {
    CodeReference::Sn60865Annex { annex, figure }
}

// ============================================================================
// Equation Enum
// ============================================================================

/// Every formula evaluated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------
    /// l_c = l - 2·l_i
    CordLength,
    /// l_eff = l - 2·l_h_f
    EffectiveLength,
    /// m_c spread over span and sub-conductors
    ConcentratedMass,
    /// Mean spacer distance l_s
    SpacerDistanceMean,
    /// l_v = 1.05·√(h² + w²)
    LoopArcLength,

    // -------------------------------------------------------------------------
    // Electromagnetic load
    // -------------------------------------------------------------------------
    /// F' through the whole cord
    ForcePerLength,
    /// F' through half the span and the loop
    ForcePerLengthLoop,
    /// r = F'/(n·m_s·g_n)
    ForceRatio,
    /// r with the 1.2 weight factor
    ForceRatioUnderLooped,

    // -------------------------------------------------------------------------
    // Swing-out
    // -------------------------------------------------------------------------
    ForceDirection,
    StaticSag,
    SwingPeriod,
    ResultantPeriod,
    EndSwingAngle,
    MaxSwingAngle,
    SwingLimitParallel,
    SwingLimitPerpendicular,

    // -------------------------------------------------------------------------
    // Stiffness
    // -------------------------------------------------------------------------
    EffectiveModulus,
    StiffnessNorm,
    StressFactor,

    // -------------------------------------------------------------------------
    // Tensile forces
    // -------------------------------------------------------------------------
    TensionFactorPhi,
    TensionFactorPhiLoop,
    /// ψ from the implicit cubic
    TensionFactorPsi,
    /// F_td = F_st·(1 + φ·ψ)
    ShortCircuitTension,
    /// F_fd = 1.2·F_st·√(1 + 8ζ·δ_max/180°)
    FallForce,

    // -------------------------------------------------------------------------
    // Dynamic sag
    // -------------------------------------------------------------------------
    ElasticStrain,
    ThermalStrain,
    DilatationFactor,
    FormFactor,
    DynamicSag,

    // -------------------------------------------------------------------------
    // Clearance
    // -------------------------------------------------------------------------
    DeflectionResting,
    DeflectionStrained,
    DeflectionLoop,
    MinimumClearance,

    // -------------------------------------------------------------------------
    // Bundle contraction
    // -------------------------------------------------------------------------
    /// a_s/d and l_s criteria for effective clashing
    ClashCriteria,
    /// F_pi,d = 1.1·F_td
    BundleForceDirect,
    ContractionFactorNu1,
    /// τ and γ
    NetworkTimeConstant,
    /// T_pi and ν2
    ContractionTime,
    FactorNu3,
    InterbundleForce,
    StrainFactorSt,
    StrainFactorPi,
    BundlePosition,
    FactorXi,
    FactorEta,
    FactorNu4,
    FactorNuE,
    /// F_pi,d from νe, ε_st and ξ or η
    BundleForceContracted,

    // -------------------------------------------------------------------------
    // Short-circuit current
    // -------------------------------------------------------------------------
    PeakFactorKappa,
    PeakCurrent,
    DcHeatFactor,
    AcHeatFactor,
    ThermalEquivalentCurrent,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            // Geometry
            Equation::CordLength => EquationMetadata {
                name: "Cord Length",
                description: "Length of a main conductor between strained insulator chains",
                formula_plain: "l_c = l - 2*l_i",
                reference: sn60865("6.2.2", "(19)"),
                variables: vec![
                    Variable::new("l", "Centre-line distance between supports", "m"),
                    Variable::new("l_i", "Length of one tension insulator chain", "m"),
                ],
                assumptions: vec!["l_c = l without insulator chains"],
                category: EquationCategory::Geometry,
                source_module: "equations/conductor.rs",
                source_function: "conductor_length",
            },

            Equation::EffectiveLength => EquationMetadata {
                name: "Effective Span",
                description: "Span of a conductor resting on post insulators, reduced by the clamps",
                formula_plain: "l_eff = l - 2*l_h_f",
                reference: sn60865("6.2.2", "(19)"),
                variables: vec![
                    Variable::new("l", "Centre-line distance between supports", "m"),
                    Variable::new("l_h_f", "Length of the clamp on a post insulator", "m"),
                ],
                assumptions: vec!["Conductor rests on post insulators"],
                category: EquationCategory::Geometry,
                source_module: "equations/conductor.rs",
                source_function: "effective_length",
            },

            Equation::ConcentratedMass => EquationMetadata {
                name: "Distributed Concentrated Mass",
                description: "Concentrated masses (droppers, clamps) spread over the span per sub-conductor",
                formula_plain: "m_c' = m_c / (n*l_c)",
                reference: CodeReference::Practice,
                variables: vec![
                    Variable::new("m_c", "Sum of concentrated masses in the span", "kg"),
                    Variable::new("n", "Number of sub-conductors", "-"),
                ],
                assumptions: vec!["Added to m_s for all gravity terms"],
                category: EquationCategory::Geometry,
                source_module: "equations/conductor.rs",
                source_function: "concentrated_mass_per_length",
            },

            Equation::SpacerDistanceMean => EquationMetadata {
                name: "Mean Spacer Distance",
                description: "Average of the given spacer distances; zero when no spacers are fitted",
                formula_plain: "l_s = sum(l_s,i) / k",
                reference: CodeReference::Practice,
                variables: vec![Variable::new("l_s,i", "Distance between adjacent spacers", "m")],
                assumptions: vec!["Absent and zero distances are ignored"],
                category: EquationCategory::Geometry,
                source_module: "equations/conductor.rs",
                source_function: "spacer_distance_mean",
            },

            Equation::LoopArcLength => EquationMetadata {
                name: "Loop Arc Length",
                description: "Estimated arc length of a dropper loop at midspan",
                formula_plain: "l_v = 1.05 * sqrt(h^2 + w^2)",
                reference: CodeReference::Practice,
                variables: vec![
                    Variable::new("h", "Loop height", "m"),
                    Variable::new("w", "Loop width", "m"),
                ],
                assumptions: vec!["Factor 1.05 averaged from built installations"],
                category: EquationCategory::Geometry,
                source_module: "equations/loop_span.rs",
                source_function: "loop_arc_length",
            },

            // Electromagnetic load
            Equation::ForcePerLength => EquationMetadata {
                name: "Characteristic Force per Unit Length",
                description: "Electromagnetic force on a main conductor with current through the whole cord",
                formula_plain: "F' = (mu0/2pi) * 0.75 * (I_k^2/a) * (l_c/l)",
                reference: sn60865("6.2.2", "(19a)"),
                variables: vec![
                    Variable::new(
                        "I_k",
                        "Initial symmetrical three-phase short-circuit current",
                        "A",
                    ),
                    Variable::new("a", "Centre-line distance between main conductors", "m"),
                    Variable::new("l_c", "Cord length", "m"),
                    Variable::new("l", "Span", "m"),
                ],
                assumptions: vec!["Three-phase fault, factor 0.75 for the outer conductor"],
                category: EquationCategory::ElectromagneticLoad,
                source_module: "equations/conductor.rs",
                source_function: "force_per_length",
            },

            Equation::ForcePerLengthLoop => EquationMetadata {
                name: "Force per Unit Length with Loop",
                description: "Electromagnetic force with current through half the span and the loop",
                formula_plain: "F' = (mu0/2pi) * 0.75 * (I_k^2/a) * ((l_c/2 + l_v/2)/l)",
                reference: sn60865("6.2.2", "(19b)"),
                variables: vec![
                    Variable::new("l_v", "Arc length of the loop", "m"),
                    Variable::new("l_c", "Cord length", "m"),
                ],
                assumptions: vec!["Loop at midspan"],
                category: EquationCategory::ElectromagneticLoad,
                source_module: "equations/loop_span.rs",
                source_function: "force_per_length_loop",
            },

            Equation::ForceRatio => EquationMetadata {
                name: "Force Ratio",
                description: "Ratio of electromagnetic force to gravitational force",
                formula_plain: "r = F' / (n*m_s*g_n)",
                reference: sn60865("6.2.2", "(20)"),
                variables: vec![
                    Variable::new("F'", "Characteristic force per unit length", "N/m"),
                    Variable::new("m_s", "Mass per unit length of one sub-conductor", "kg/m"),
                    Variable::new("g_n", "Standard gravity", "m/s^2"),
                ],
                assumptions: vec!["m_s includes distributed concentrated masses"],
                category: EquationCategory::ElectromagneticLoad,
                source_module: "equations/conductor.rs",
                source_function: "force_ratio",
            },

            Equation::ForceRatioUnderLooped => EquationMetadata {
                name: "Force Ratio, Under-Looped",
                description: "Force ratio of a conductor looped under its supports",
                formula_plain: "r = F' / (1.2*n*m_s*g_n)",
                reference: sn60865("6.2.2", "(20)"),
                variables: vec![Variable::new("F'", "Characteristic force per unit length", "N/m")],
                assumptions: vec!["Weight term increased by 1.2"],
                category: EquationCategory::ElectromagneticLoad,
                source_module: "equations/conductor.rs",
                source_function: "force_ratio_under_looped",
            },

            // Swing-out
            Equation::ForceDirection => EquationMetadata {
                name: "Direction of Resultant Force",
                description: "Angle of the resultant of electromagnetic and gravitational force",
                formula_plain: "delta_1 = arctan(r)",
                reference: sn60865("6.2.2", "(21)"),
                variables: vec![Variable::new("r", "Force ratio", "-")],
                assumptions: vec![],
                category: EquationCategory::SwingOut,
                source_module: "equations/conductor.rs",
                source_function: "force_direction",
            },

            Equation::StaticSag => EquationMetadata {
                name: "Equivalent Static Sag",
                description: "Static conductor sag at midspan",
                formula_plain: "f_es = n*m_s*g_n*l^2 / (8*F_st)",
                reference: sn60865("6.2.2", "(22)"),
                variables: vec![
                    Variable::new("F_st", "Static tensile force", "N"),
                    Variable::new("l", "Span (l_eff for resting conductors)", "m"),
                ],
                assumptions: vec!["Parabolic sag"],
                category: EquationCategory::SwingOut,
                source_module: "equations/conductor.rs",
                source_function: "static_sag",
            },

            Equation::SwingPeriod => EquationMetadata {
                name: "Period of Conductor Oscillation",
                description: "Pendulum period of the span without current",
                formula_plain: "T = 2*pi*sqrt(0.8*f_es/g_n)",
                reference: sn60865("6.2.2", "(23)"),
                variables: vec![Variable::new("f_es", "Equivalent static sag", "m")],
                assumptions: vec!["Small swing angles"],
                category: EquationCategory::SwingOut,
                source_module: "equations/conductor.rs",
                source_function: "swing_period",
            },

            Equation::ResultantPeriod => EquationMetadata {
                name: "Resulting Period",
                description: "Period of the oscillation during the short-circuit current flow",
                formula_plain: "T_res = T / ((1+r^2)^(1/4) * (1 - (pi^2/64)*(delta_1/90)^2))",
                reference: sn60865("6.2.2", "(24)"),
                variables: vec![
                    Variable::new("T", "Period of conductor oscillation", "s"),
                    Variable::new("delta_1", "Direction of resultant force", "deg"),
                ],
                assumptions: vec![],
                category: EquationCategory::SwingOut,
                source_module: "equations/conductor.rs",
                source_function: "resultant_period",
            },

            Equation::EndSwingAngle => EquationMetadata {
                name: "Swing-Out Angle at End of Fault",
                description: "Swing-out angle when the short-circuit current is switched off",
                formula_plain: "delta_end = delta_1*(1 - cos(360*t_k1/T_res)) for t_k1/T_res <= 0.5, else 2*delta_1",
                reference: sn60865("6.2.2", "(29)"),
                variables: vec![
                    Variable::new("t_k1", "Duration of the first short-circuit current flow", "s"),
                    Variable::new("T_res", "Resulting period", "s"),
                ],
                assumptions: vec!["Ratio exactly 0.5 uses the cosine branch"],
                category: EquationCategory::SwingOut,
                source_module: "equations/conductor.rs",
                source_function: "end_swing_angle",
            },

            Equation::MaxSwingAngle => EquationMetadata {
                name: "Maximum Swing-Out Angle",
                description: "Largest swing-out angle during or after the short circuit",
                formula_plain: "chi = 1 - r*sin(delta_end) (delta_end <= 90) or 1 - r; \
                                delta_max = 1.25*acos(chi) | 10 + acos(chi) | 180",
                reference: sn60865("6.2.2", "(30), (31)"),
                variables: vec![
                    Variable::new("chi", "Auxiliary swing parameter", "-"),
                    Variable::new("delta_end", "Swing-out angle at end of fault", "deg"),
                ],
                assumptions: vec!["Branches at chi in (0.766, 1], [-0.985, 0.766], below -0.985"],
                category: EquationCategory::SwingOut,
                source_module: "equations/conductor.rs",
                source_function: "max_swing_angle",
            },

            Equation::SwingLimitParallel => EquationMetadata {
                name: "Swing Limit by Loop, Parallel Plane",
                description: "Swing-out angle reached when a loop parallel to the conductors restricts the swing",
                formula_plain: "delta = acos(((h+f_es)^2 + f_ed^2 - (l_v^2 - w^2)) / (2*f_ed*(h+f_es)))",
                reference: sn60865("6.2.5", "(39)"),
                variables: vec![
                    Variable::new("h", "Loop height", "m"),
                    Variable::new("w", "Loop width", "m"),
                    Variable::new("f_ed", "Dynamic sag", "m"),
                ],
                assumptions: vec!["No restriction when l_v >= sqrt((h + f_es + f_ed)^2 + w^2)"],
                category: EquationCategory::SwingOut,
                source_module: "equations/loop_span.rs",
                source_function: "swing_limit_parallel",
            },

            Equation::SwingLimitPerpendicular => EquationMetadata {
                name: "Swing Limit by Loop, Perpendicular Plane",
                description: "Swing-out angle reached when a loop perpendicular to the conductors restricts the swing",
                formula_plain: "delta = acos((...) / (2*f_ed*sqrt((h+f_es)^2 + w^2))) + acos((h+f_es)/sqrt((h+f_es)^2 + w^2))",
                reference: sn60865("6.2.5", "(39)"),
                variables: vec![
                    Variable::new("h", "Loop height", "m"),
                    Variable::new("w", "Loop width", "m"),
                ],
                assumptions: vec!["No restriction when l_v >= sqrt((h + f_es)^2 + w^2) + f_ed"],
                category: EquationCategory::SwingOut,
                source_module: "equations/loop_span.rs",
                source_function: "swing_limit_perpendicular",
            },

            // Stiffness
            Equation::EffectiveModulus => EquationMetadata {
                name: "Actual Young's Modulus",
                description: "Modulus of the stranded conductor reduced at low tensile stress",
                formula_plain: "E_eff = E*(0.3 + 0.7*sin(F_st/(n*A_s*sigma_fin)*90)) for F_st/(n*A_s) <= sigma_fin, else E",
                reference: sn60865("6.2.2", "(26), (27)"),
                variables: vec![
                    Variable::new("E", "Young's modulus", "N/m^2"),
                    Variable::new("A_s", "Cross-section of one sub-conductor", "m^2"),
                    Variable::new(
                        "sigma_fin",
                        "Lowest stress where E becomes constant, 50 N/mm^2",
                        "N/m^2",
                    ),
                ],
                assumptions: vec![],
                category: EquationCategory::Stiffness,
                source_module: "equations/conductor.rs",
                source_function: "effective_modulus",
            },

            Equation::StiffnessNorm => EquationMetadata {
                name: "Stiffness Norm",
                description: "Combined flexibility of supports and conductor",
                formula_plain: "N = 1/(S*l) + 1/(n*E_eff*A_s)",
                reference: sn60865("6.2.2", "(25)"),
                variables: vec![Variable::new(
                    "S",
                    "Resultant spring constant of both supports",
                    "N/m",
                )],
                assumptions: vec![],
                category: EquationCategory::Stiffness,
                source_module: "equations/conductor.rs",
                source_function: "stiffness_norm",
            },

            Equation::StressFactor => EquationMetadata {
                name: "Stress Factor",
                description: "Stress factor of the main conductor",
                formula_plain: "zeta = (n*g_n*m_s*l)^2 / (24*F_st^3*N)",
                reference: sn60865("6.2.2", "(28)"),
                variables: vec![Variable::new("N", "Stiffness norm", "1/N")],
                assumptions: vec![],
                category: EquationCategory::Stiffness,
                source_module: "equations/conductor.rs",
                source_function: "stress_factor",
            },

            // Tensile forces
            Equation::TensionFactorPhi => EquationMetadata {
                name: "Tension Factor phi",
                description: "Load factor for the tensile force during the short circuit",
                formula_plain: "phi = 3*(sqrt(1+r^2) - 1) for t_k1 >= T_res/4, else 3*(r*sin(delta_end) + cos(delta_end) - 1)",
                reference: sn60865("6.2.3", "(32)"),
                variables: vec![Variable::new("r", "Force ratio", "-")],
                assumptions: vec![],
                category: EquationCategory::TensileForces,
                source_module: "equations/conductor.rs",
                source_function: "tension_factor_phi",
            },

            Equation::TensionFactorPhiLoop => EquationMetadata {
                name: "Tension Factor phi with Loop",
                description: "Load factor when a loop at midspan limits the swing to delta",
                formula_plain: "phi = plain phi (delta >= delta_1); 3*(r*sin(x) + cos(x) - 1), x = min(delta, delta_end)",
                reference: sn60865("6.2.5", "(40), (41)"),
                variables: vec![Variable::new("delta", "Swing limit by the loop", "deg")],
                assumptions: vec![],
                category: EquationCategory::TensileForces,
                source_module: "equations/loop_span.rs",
                source_function: "tension_factor_phi_loop",
            },

            Equation::TensionFactorPsi => EquationMetadata {
                name: "Tension Factor psi",
                description: "Real root in [0, 1] of the cubic relating phi and zeta",
                formula_plain: "phi^2*psi^3 + phi*(2+zeta)*psi^2 + (1+2*zeta)*psi - zeta*(2+phi) = 0",
                reference: sn60865("6.2.3, Figure 7", "(33)"),
                variables: vec![
                    Variable::new("phi", "Tension factor", "-"),
                    Variable::new("zeta", "Stress factor", "-"),
                ],
                assumptions: vec!["Solved by the tiered root solver"],
                category: EquationCategory::TensileForces,
                source_module: "solver/implicit.rs",
                source_function: "solve_psi",
            },

            Equation::ShortCircuitTension => EquationMetadata {
                name: "Short-Circuit Tensile Force",
                description: "Design tensile force caused by swing-out during the short circuit",
                formula_plain: "F_td = F_st*(1 + phi*psi)",
                reference: sn60865("6.2.3", "(33)"),
                variables: vec![
                    Variable::new("F_st", "Static tensile force", "N"),
                    Variable::new("psi", "Tension factor", "-"),
                ],
                assumptions: vec!["Single conductor or non-clashing bundle"],
                category: EquationCategory::TensileForces,
                source_module: "equations/conductor.rs",
                source_function: "short_circuit_tension",
            },

            Equation::FallForce => EquationMetadata {
                name: "Drop Force",
                description: "Tensile force when the conductor falls back after the short circuit",
                formula_plain: "F_fd = 1.2*F_st*sqrt(1 + 8*zeta*delta_max/180)",
                reference: sn60865("6.2.6", "(43)"),
                variables: vec![Variable::new("delta_max", "Maximum swing-out angle", "deg")],
                assumptions: vec!["Relevant only for r > 0.6 and delta_max >= 70 deg"],
                category: EquationCategory::TensileForces,
                source_module: "equations/conductor.rs",
                source_function: "fall_force",
            },

            // Dynamic sag
            Equation::ElasticStrain => EquationMetadata {
                name: "Elastic Expansion",
                description: "Elastic strain of the conductor at the tensile force F_td",
                formula_plain: "eps_ela = N*(F_td - F_st)",
                reference: sn60865("6.2.4", "(34)"),
                variables: vec![Variable::new("F_td", "Short-circuit tensile force", "N")],
                assumptions: vec![],
                category: EquationCategory::DynamicSag,
                source_module: "equations/conductor.rs",
                source_function: "elastic_strain",
            },

            Equation::ThermalStrain => EquationMetadata {
                name: "Thermal Expansion",
                description: "Thermal strain of the conductor during the short circuit",
                formula_plain: "eps_th = c_th*(I_k/(n*A_s))^2 * min(T_res/4, t_k1)",
                reference: sn60865("6.2.4", "(35)"),
                variables: vec![Variable::new("c_th", "Material constant", "m^4/(A^2 s)")],
                assumptions: vec!["t_k1 = T_res/4 uses the T_res/4 branch"],
                category: EquationCategory::DynamicSag,
                source_module: "equations/conductor.rs",
                source_function: "thermal_strain",
            },

            Equation::DilatationFactor => EquationMetadata {
                name: "Dilatation Factor",
                description: "Sag increase caused by elastic and thermal expansion",
                formula_plain: "C_D = sqrt(1 + (3/8)*(l/f_es)^2*(eps_ela + eps_th))",
                reference: sn60865("6.2.4", "(36)"),
                variables: vec![Variable::new("f_es", "Equivalent static sag", "m")],
                assumptions: vec![],
                category: EquationCategory::DynamicSag,
                source_module: "equations/conductor.rs",
                source_function: "sag_factor_cd",
            },

            Equation::FormFactor => EquationMetadata {
                name: "Form Factor",
                description: "Sag increase caused by the change of conductor shape",
                formula_plain: "C_F = 1.05 (r <= 0.8), 0.97 + 0.1*r (0.8 < r < 1.8), 1.15 (r >= 1.8)",
                reference: sn60865("6.2.4", "(37)"),
                variables: vec![Variable::new("r", "Force ratio", "-")],
                assumptions: vec![],
                category: EquationCategory::DynamicSag,
                source_module: "equations/conductor.rs",
                source_function: "sag_factor_cf",
            },

            Equation::DynamicSag => EquationMetadata {
                name: "Dynamic Sag",
                description: "Conductor sag at midspan during the short circuit",
                formula_plain: "f_ed = C_F*C_D*f_es",
                reference: sn60865("6.2.4", "(38)"),
                variables: vec![
                    Variable::new("C_D", "Dilatation factor", "-"),
                    Variable::new("C_F", "Form factor", "-"),
                ],
                assumptions: vec![],
                category: EquationCategory::DynamicSag,
                source_module: "equations/conductor.rs",
                source_function: "dynamic_sag",
            },

            // Clearance
            Equation::DeflectionResting => EquationMetadata {
                name: "Horizontal Displacement, Resting Conductor",
                description: "Maximum horizontal span displacement of a conductor on post insulators",
                formula_plain: "b_h = f_ed (delta_max >= 90), else f_ed*sin(delta_max)",
                reference: sn60865("6.2.7", "(44)"),
                variables: vec![Variable::new("f_ed", "Dynamic sag", "m")],
                assumptions: vec!["l_c = l"],
                category: EquationCategory::Clearance,
                source_module: "equations/conductor.rs",
                source_function: "horizontal_deflection_resting",
            },

            Equation::DeflectionStrained => EquationMetadata {
                name: "Horizontal Displacement, Strained Conductor",
                description: "Maximum horizontal span displacement of a conductor between tension chains",
                formula_plain: "b_h = f_ed*sin(delta_1) (delta_max >= delta_1), else f_ed*sin(delta_max)",
                reference: sn60865("6.2.7", "(45)"),
                variables: vec![Variable::new("delta_1", "Direction of resultant force", "deg")],
                assumptions: vec!["l_c = l - 2*l_i"],
                category: EquationCategory::Clearance,
                source_module: "equations/conductor.rs",
                source_function: "horizontal_deflection_strained",
            },

            Equation::DeflectionLoop => EquationMetadata {
                name: "Horizontal Displacement with Loop",
                description: "Maximum horizontal displacement of a strained conductor with a loop at midspan",
                formula_plain: "b_h = f_ed*sin(delta_1) (delta_max >= delta_1), else f_ed*sin(min(delta, delta_max))",
                reference: sn60865("6.2.7", "(46), (47)"),
                variables: vec![Variable::new("delta", "Swing limit by the loop", "deg")],
                assumptions: vec![],
                category: EquationCategory::Clearance,
                source_module: "equations/loop_span.rs",
                source_function: "horizontal_deflection_loop",
            },

            Equation::MinimumClearance => EquationMetadata {
                name: "Minimum Air Clearance",
                description: "Smallest distance between two swinging main conductors",
                formula_plain: "a_min = a - 2*b_h",
                reference: sn60865("6.2.7", "(48)"),
                variables: vec![Variable::new("b_h", "Maximum horizontal displacement", "m")],
                assumptions: vec!["Two-phase swing towards each other"],
                category: EquationCategory::Clearance,
                source_module: "equations/conductor.rs",
                source_function: "minimum_clearance",
            },

            // Bundle contraction
            Equation::ClashCriteria => EquationMetadata {
                name: "Effective Clashing Criteria",
                description: "Whether sub-conductors of a bundle clash effectively",
                formula_plain: "a_s/d <= 2.0 and l_s >= 50*a_s, or a_s/d <= 2.5 and l_s >= 70*a_s",
                reference: sn60865("6.4.1", "(52), (53)"),
                variables: vec![
                    Variable::new("a_s", "Effective distance between sub-conductors", "m"),
                    Variable::new("d", "Conductor diameter", "m"),
                    Variable::new("l_s", "Mean spacer distance", "m"),
                ],
                assumptions: vec!["n > 1"],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "clash_guaranteed",
            },

            Equation::BundleForceDirect => EquationMetadata {
                name: "Pinch Force of Clashing Sub-Conductors",
                description: "Bundle tensile force when sub-conductors clash effectively",
                formula_plain: "F_pi,d = 1.1*F_td",
                reference: sn60865("6.4.1", "(51)"),
                variables: vec![Variable::new("F_td", "Short-circuit tensile force", "N")],
                assumptions: vec!["Clash criteria satisfied"],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "bundle_force_direct",
            },

            Equation::ContractionFactorNu1 => EquationMetadata {
                name: "Factor nu_1",
                description: "Frequency factor of the bundle contraction",
                formula_plain: "nu_1 = f/sin(180/n) * sqrt((a_s - d)*m_s / ((mu0/2pi)*(I_k/n)^2*(n-1)/a_s))",
                reference: sn60865("6.4.1", "(55)"),
                variables: vec![Variable::new("f", "System frequency", "Hz")],
                assumptions: vec![],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "contraction_frequency_nu1",
            },

            Equation::NetworkTimeConstant => EquationMetadata {
                name: "Network Time Constant and Phase Angle",
                description: "Time constant of the DC component from kappa, and the phase angle gamma",
                formula_plain: "tau = |1/((2*pi*f/3)*ln((kappa - 1.02)/0.98))|, gamma = arctan(2*pi*f*tau)",
                reference: annex("A.7", 9),
                variables: vec![Variable::new("kappa", "Peak factor", "-")],
                assumptions: vec!["kappa below 1.1 is raised to 1.1"],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "network_time_constant",
            },

            Equation::ContractionTime => EquationMetadata {
                name: "Contraction Time and Factor nu_2",
                description: "Time to peak pinch force, from the damped-oscillation equation in x = f*T_pi",
                formula_plain: "x*sqrt(1 - A(x) + B(x) - C(x)) = nu_1, T_pi = x/f, nu_2 = (nu_1/x)^2",
                reference: annex("A.7", 9),
                variables: vec![
                    Variable::new("T_pi", "Time to peak pinch force", "s"),
                    Variable::new("gamma", "Phase angle", "rad"),
                ],
                assumptions: vec!["Solved on (0, 2] by the tiered root solver"],
                category: EquationCategory::BundleContraction,
                source_module: "solver/implicit.rs",
                source_function: "solve_contraction_time",
            },

            Equation::FactorNu3 => EquationMetadata {
                name: "Factor nu_3",
                description: "Geometry factor of the bundle",
                formula_plain: "nu_3 = (d/a_s)/sin(180/n) * sqrt(a_s/d - 1)/arctan(sqrt(a_s/d - 1))",
                reference: annex("A.8", 10),
                variables: vec![Variable::new(
                    "a_s",
                    "Effective distance between sub-conductors",
                    "m",
                )],
                assumptions: vec![],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "nu3_factor",
            },

            Equation::InterbundleForce => EquationMetadata {
                name: "Force Between Sub-Conductors",
                description: "Short-circuit current force between the sub-conductors of a bundle",
                formula_plain: "F_v = (n - 1)*(mu0/2pi)*(I_k/n)^2*(l_s/a_s)*(nu_2/nu_3)",
                reference: sn60865("6.4.1", "(54)"),
                variables: vec![Variable::new("l_s", "Reference length (spacer distance)", "m")],
                assumptions: vec!["Without spacers, l_eff or l_c replaces l_s"],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "interbundle_force_fv",
            },

            Equation::StrainFactorSt => EquationMetadata {
                name: "Strain Factor eps_st",
                description: "Strain factor from the static tension",
                formula_plain: "eps_st = 1.5*F_st*l_s^2*N/(a_s - d)^2 * sin^2(180/n)",
                reference: sn60865("6.4.1", "(56)"),
                variables: vec![Variable::new("N", "Stiffness norm", "1/N")],
                assumptions: vec![],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "strain_factor_st",
            },

            Equation::StrainFactorPi => EquationMetadata {
                name: "Strain Factor eps_pi",
                description: "Strain factor from the pinch force",
                formula_plain: "eps_pi = 0.375*n*F_v*l_s^3*N/(a_s - d)^3 * sin^3(180/n)",
                reference: sn60865("6.4.1", "(57)"),
                variables: vec![Variable::new("F_v", "Force between sub-conductors", "N")],
                assumptions: vec![],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "strain_factor_pi",
            },

            Equation::BundlePosition => EquationMetadata {
                name: "Bundle Position Parameter",
                description: "Whether sub-conductors clash (j >= 1) or only approach (j < 1)",
                formula_plain: "j = sqrt(eps_pi/(1 + eps_st))",
                reference: sn60865("6.4.1", "(58)"),
                variables: vec![
                    Variable::new("eps_st", "Strain factor", "-"),
                    Variable::new("eps_pi", "Strain factor", "-"),
                ],
                assumptions: vec![],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "bundle_position_j",
            },

            Equation::FactorXi => EquationMetadata {
                name: "Factor xi",
                description: "Pinch factor for clashing sub-conductors",
                formula_plain: "xi^3 + eps_st*xi^2 - j^2*(1 + eps_st) = 0, j^(2/3) <= xi <= j",
                reference: annex("A.9", 11),
                variables: vec![Variable::new("j", "Bundle position parameter", "-")],
                assumptions: vec!["j >= 1"],
                category: EquationCategory::BundleContraction,
                source_module: "solver/implicit.rs",
                source_function: "solve_xi",
            },

            Equation::FactorEta => EquationMetadata {
                name: "Factor eta",
                description: "Pinch factor for sub-conductors that approach without clashing",
                formula_plain: "eta^3 + eps_st*eta - j^2*(1 + eps_st)*f_eta(eta) = 0, 0 <= eta <= 1",
                reference: annex("A.10", 12),
                variables: vec![
                    Variable::new("f_eta", "nu_3 / (a_sw/a_s)", "-"),
                    Variable::new("j", "Bundle position parameter", "-"),
                ],
                assumptions: vec![
                    "j < 1",
                    "eta = 1 when the residual is still negative at the upper edge",
                ],
                category: EquationCategory::BundleContraction,
                source_module: "solver/implicit.rs",
                source_function: "solve_eta",
            },

            Equation::FactorNu4 => EquationMetadata {
                name: "Factor nu_4",
                description: "Distance factor of the bundle during contraction",
                formula_plain: "nu_4 = (a_s - d)/d (j >= 1), eta*(a_s - d)/(a_s - eta*(a_s - d)) (j < 1)",
                reference: sn60865("6.4.2", "(61), (64)"),
                variables: vec![Variable::new("eta", "Pinch factor", "-")],
                assumptions: vec![],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "nu4_factor",
            },

            Equation::FactorNuE => EquationMetadata {
                name: "Factor nu_e",
                description: "Dynamic factor of the pinch force",
                formula_plain: "nu_e = 1/2 + sqrt(9/8*n*(n-1)*(mu0/2pi)*(I_k/n)^2*N*nu_2*(l_s/(a_s-d))^4*sin^4(180/n)/X*(1 - arctan(sqrt(nu_4))/sqrt(nu_4)) - 1/4), X = xi^3 or eta^4",
                reference: sn60865("6.4.2", "(60), (63)"),
                variables: vec![Variable::new("nu_2", "Factor from the contraction time", "-")],
                assumptions: vec!["Negative radicand clamped to zero"],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "nu_e_factor",
            },

            Equation::BundleForceContracted => EquationMetadata {
                name: "Pinch Force from Contraction",
                description: "Bundle tensile force from the contraction chain",
                formula_plain: "F_pi,d = F_st*(1 + (nu_e/eps_st)*xi) (j >= 1), F_st*(1 + (nu_e/eps_st)*eta^2) (j < 1)",
                reference: sn60865("6.4.2", "(59), (62)"),
                variables: vec![Variable::new("nu_e", "Dynamic factor", "-")],
                assumptions: vec![],
                category: EquationCategory::BundleContraction,
                source_module: "equations/bundle.rs",
                source_function: "bundle_force_contracted",
            },

            // Short-circuit current
            Equation::PeakFactorKappa => EquationMetadata {
                name: "Peak Factor kappa",
                description: "Factor for the peak short-circuit current from the network R/X ratio",
                formula_plain: "kappa = 1.02 + 0.98*exp(-3*R/X)",
                reference: CodeReference::Sn60909 { clause: "8.1" },
                variables: vec![Variable::new(
                    "R/X",
                    "Smallest resistance/reactance ratio in the fault path",
                    "-",
                )],
                assumptions: vec!["Alternatively kappa = i_p/(sqrt(2)*I_k'')"],
                category: EquationCategory::ShortCircuitCurrent,
                source_module: "equations/short_circuit.rs",
                source_function: "kappa_from_rx",
            },

            Equation::PeakCurrent => EquationMetadata {
                name: "Peak Short-Circuit Current",
                description: "Maximum instantaneous short-circuit current",
                formula_plain: "i_p = kappa*sqrt(2)*I_k''",
                reference: CodeReference::Sn60909 { clause: "8.1" },
                variables: vec![Variable::new(
                    "I_k''",
                    "Initial symmetrical short-circuit current",
                    "A",
                )],
                assumptions: vec!["kappa = 2.0 when unknown"],
                category: EquationCategory::ShortCircuitCurrent,
                source_module: "equations/short_circuit.rs",
                source_function: "peak_current",
            },

            Equation::DcHeatFactor => EquationMetadata {
                name: "DC Heat-Effect Factor m",
                description: "Heat effect of the decaying DC component",
                formula_plain: "m = 1/(2*f*T_k*ln(kappa - 1)) * (exp(4*f*T_k*ln(kappa - 1)) - 1)",
                reference: CodeReference::Sn60909 { clause: "14" },
                variables: vec![Variable::new("T_k", "Short-circuit duration", "s")],
                assumptions: vec!["kappa = 1.95 when unknown"],
                category: EquationCategory::ShortCircuitCurrent,
                source_module: "equations/short_circuit.rs",
                source_function: "dc_heat_factor_m",
            },

            Equation::AcHeatFactor => EquationMetadata {
                name: "AC Heat-Effect Factor n",
                description: "Heat effect of the decaying AC component",
                formula_plain: "n = 1/q^2 * [1 + ...], q = I_k''/I_k, T_d' = 3.1/(q/(0.88 + 0.17*q))",
                reference: CodeReference::Sn60909 { clause: "14" },
                variables: vec![Variable::new("I_k", "Steady-state short-circuit current", "A")],
                assumptions: vec![
                    "Evaluates below the reference diagram; n = 1 is on the safe side",
                ],
                category: EquationCategory::ShortCircuitCurrent,
                source_module: "equations/short_circuit.rs",
                source_function: "ac_heat_factor_n",
            },

            Equation::ThermalEquivalentCurrent => EquationMetadata {
                name: "Thermal Equivalent Current",
                description: "Short-circuit current with the same heat effect over T_k",
                formula_plain: "I_th = I_k''*sqrt(m + n)",
                reference: CodeReference::Sn60909 { clause: "14" },
                variables: vec![
                    Variable::new("m", "DC heat-effect factor", "-"),
                    Variable::new("n", "AC heat-effect factor", "-"),
                ],
                assumptions: vec!["m + n = 1 permitted for far-from-generator faults >= 0.5 s"],
                category: EquationCategory::ShortCircuitCurrent,
                source_module: "equations/short_circuit.rs",
                source_function: "thermal_equivalent_current",
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories in report order
    pub fn all_categories() -> Vec<EquationCategory> {
        use EquationCategory::*;
        let mut cats = vec![
            Geometry,
            ElectromagneticLoad,
            SwingOut,
            Stiffness,
            TensileForces,
            DynamicSag,
            Clearance,
            BundleContraction,
            ShortCircuitCurrent,
        ];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    // Geometry
    Equation::CordLength,
    Equation::EffectiveLength,
    Equation::ConcentratedMass,
    Equation::SpacerDistanceMean,
    Equation::LoopArcLength,
    // Electromagnetic load
    Equation::ForcePerLength,
    Equation::ForcePerLengthLoop,
    Equation::ForceRatio,
    Equation::ForceRatioUnderLooped,
    // Swing-out
    Equation::ForceDirection,
    Equation::StaticSag,
    Equation::SwingPeriod,
    Equation::ResultantPeriod,
    Equation::EndSwingAngle,
    Equation::MaxSwingAngle,
    Equation::SwingLimitParallel,
    Equation::SwingLimitPerpendicular,
    // Stiffness
    Equation::EffectiveModulus,
    Equation::StiffnessNorm,
    Equation::StressFactor,
    // Tensile forces
    Equation::TensionFactorPhi,
    Equation::TensionFactorPhiLoop,
    Equation::TensionFactorPsi,
    Equation::ShortCircuitTension,
    Equation::FallForce,
    // Dynamic sag
    Equation::ElasticStrain,
    Equation::ThermalStrain,
    Equation::DilatationFactor,
    Equation::FormFactor,
    Equation::DynamicSag,
    // Clearance
    Equation::DeflectionResting,
    Equation::DeflectionStrained,
    Equation::DeflectionLoop,
    Equation::MinimumClearance,
    // Bundle contraction
    Equation::ClashCriteria,
    Equation::BundleForceDirect,
    Equation::ContractionFactorNu1,
    Equation::NetworkTimeConstant,
    Equation::ContractionTime,
    Equation::FactorNu3,
    Equation::InterbundleForce,
    Equation::StrainFactorSt,
    Equation::StrainFactorPi,
    Equation::BundlePosition,
    Equation::FactorXi,
    Equation::FactorEta,
    Equation::FactorNu4,
    Equation::FactorNuE,
    Equation::BundleForceContracted,
    // Short-circuit current
    Equation::PeakFactorKappa,
    Equation::PeakCurrent,
    Equation::DcHeatFactor,
    Equation::AcHeatFactor,
    Equation::ThermalEquivalentCurrent,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being used in a calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    /// The equation that was used
    pub equation: Equation,
    /// Quantity or step it produced (e.g., "F_td")
    pub context: String,
    /// Load case it was evaluated for (e.g., "low", "high")
    pub case_label: Option<String>,
}

impl EquationUsage {
    /// Create a new equation usage record
    pub fn new(equation: Equation, context: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            case_label: None,
        }
    }

    /// Create usage record for a load case
    pub fn for_case(
        equation: Equation,
        context: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            equation,
            context: context.into(),
            case_label: Some(label.into()),
        }
    }
}

/// Collector for equation usage during a calculation.
///
/// The dispatcher records every formula it evaluates; the report lists the
/// unique equations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an equation was used
    pub fn record(&mut self, equation: Equation, context: impl Into<String>) {
        self.usages.push(EquationUsage::new(equation, context));
    }

    /// Record equation usage for a load case
    pub fn record_for_case(
        &mut self,
        equation: Equation,
        context: impl Into<String>,
        label: impl Into<String>,
    ) {
        self.usages.push(EquationUsage::for_case(equation, context, label));
    }

    /// Get all recorded usages
    pub fn usages(&self) -> &[EquationUsage] {
        &self.usages
    }

    /// Get unique equations used (deduplicated, first-use order)
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }

    /// Group usages by equation
    pub fn by_equation(&self) -> HashMap<Equation, Vec<&EquationUsage>> {
        let mut map: HashMap<Equation, Vec<&EquationUsage>> = HashMap::new();
        for usage in &self.usages {
            map.entry(usage.equation).or_default().push(usage);
        }
        map
    }

    /// Group unique equations by category, in report order
    pub fn by_category(&self) -> Vec<(EquationCategory, Vec<Equation>)> {
        let unique = self.unique_equations();
        let mut by_cat: HashMap<EquationCategory, Vec<Equation>> = HashMap::new();

        for eq in unique {
            let cat = eq.metadata().category;
            by_cat.entry(cat).or_default().push(eq);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    /// Merge another tracker into this one
    pub fn merge(&mut self, other: EquationTracker) {
        self.usages.extend(other.usages);
    }
}

// ============================================================================
// Markdown Generation
// ============================================================================

/// Render the whole registry as markdown (the content of EQUATIONS.md).
///
/// ```rust
/// use sc_force_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Conductor Short-Circuit Force Equations"));
/// assert!(markdown.contains("## Bundle Contraction"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(48_000);

    output.push_str(r#"# Conductor Short-Circuit Force Equations

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

This document lists every formula the engine evaluates for short-circuit forces on
flexible conductors. Each equation includes its formula, clause reference, source
location and assumptions.

## Conventions

| Quantity | Unit |
|----------|------|
| Currents | A |
| Lengths, sags | m |
| Forces | N (reported in kN) |
| Swing angles | degrees |
| Phase angle gamma | radians |

---

"#);

    let categories = Equation::all_categories();

    for category in &categories {
        let equations = Equation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        var.symbol, var.description, var.units
                    ));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Categories:** {}\n",
        ALL_EQUATIONS.len(),
        categories.len()
    ));

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_equations_have_metadata() {
        assert_eq!(ALL_EQUATIONS.len(), 54);

        for eq in ALL_EQUATIONS {
            let meta = eq.metadata();
            assert!(!meta.name.is_empty(), "Equation {:?} has no name", eq);
            assert!(!meta.formula_plain.is_empty(), "Equation {:?} has no formula", eq);
            assert!(!meta.variables.is_empty(), "Equation {:?} has no variables", eq);
            assert!(!meta.source_module.is_empty(), "Equation {:?} missing source_module", eq);
            assert!(!meta.source_function.is_empty(), "Equation {:?} missing source_function", eq);
        }

        let tension = Equation::ShortCircuitTension.metadata();
        assert!(tension.formula_plain.contains("F_st*(1 + phi*psi)"));
    }

    #[test]
    fn test_no_duplicate_registrations() {
        let unique: std::collections::HashSet<_> = ALL_EQUATIONS.iter().collect();
        assert_eq!(unique.len(), ALL_EQUATIONS.len());
    }

    #[test]
    fn test_code_reference_citation() {
        assert_eq!(
            Equation::ForcePerLength.metadata().reference.citation(),
            "SN EN 60865-1:2012, 6.2.2, eq. (19a)"
        );
        assert_eq!(
            Equation::FactorEta.metadata().reference.citation(),
            "SN EN 60865-1:2012, Annex A.10, Figure 12"
        );
        assert_eq!(CodeReference::Sn60909 { clause: "14" }.citation(), "SN EN 60909-0, 14");
        assert_eq!(CodeReference::Practice.short_form(), "Practice");
    }

    #[test]
    fn test_equation_tracker() {
        let mut tracker = EquationTracker::new();
        tracker.record_for_case(Equation::ShortCircuitTension, "F_td", "low");
        tracker.record_for_case(Equation::FallForce, "F_fd", "low");
        tracker.record_for_case(Equation::ShortCircuitTension, "F_td", "high");

        assert_eq!(tracker.usages().len(), 3);
        assert_eq!(
            tracker.unique_equations(),
            vec![Equation::ShortCircuitTension, Equation::FallForce]
        );
        assert_eq!(tracker.by_equation()[&Equation::ShortCircuitTension].len(), 2);
    }

    #[test]
    fn test_by_category() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::FactorXi, "xi");
        tracker.record(Equation::StaticSag, "f_es");
        tracker.record(Equation::ShortCircuitTension, "F_td");

        let by_cat = tracker.by_category();
        let categories: Vec<_> = by_cat.iter().map(|(cat, _)| *cat).collect();
        assert_eq!(
            categories,
            vec![
                EquationCategory::SwingOut,
                EquationCategory::TensileForces,
                EquationCategory::BundleContraction,
            ]
        );
    }

    #[test]
    fn test_merge() {
        let mut low = EquationTracker::new();
        low.record(Equation::StaticSag, "f_es");
        let mut high = EquationTracker::new();
        high.record(Equation::StaticSag, "f_es");
        low.merge(high);
        assert_eq!(low.usages().len(), 2);
        assert_eq!(low.unique_equations().len(), 1);
    }

    #[test]
    fn test_categories_sorted() {
        let cats = Equation::all_categories();
        let orders: Vec<u8> = cats.iter().map(|c| c.sort_order()).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted, "Categories should be sorted by sort_order");
        for cat in cats {
            assert!(!Equation::in_category(cat).is_empty(), "{:?} is empty", cat);
        }
    }

    #[test]
    fn test_generate_equations_markdown() {
        let markdown = generate_equations_markdown();

        assert!(markdown.contains("# Conductor Short-Circuit Force Equations"));
        assert!(markdown.contains("Auto-generated from source code"));
        assert!(markdown.contains("## Tensile Forces"));
        assert!(markdown.contains("### Short-Circuit Tensile Force"));
        assert!(markdown.contains("`F_td = F_st*(1 + phi*psi)`"));
        assert!(markdown.contains("SN EN 60865-1:2012, 6.2.3, eq. (33)"));
        assert!(markdown.contains("equations/bundle.rs"));
        assert!(markdown.contains("**Total Equations:** 54"));
        assert!(markdown.contains("**Categories:** 9"));
    }
}
