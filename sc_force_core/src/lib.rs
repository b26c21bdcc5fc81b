//! # sc_force_core - Short-Circuit Force Engine
//!
//! `sc_force_core` computes the mechanical effects of short-circuit currents on
//! flexible conductors after SN EN 60865-1: tensile force F_td, drop force
//! F_fd, bundle pinch force F_pi,d, horizontal deflection and minimum
//! clearance. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: a calculation is a pure function of its input record
//! - **JSON-First**: every record implements Serialize/Deserialize
//! - **Rich Errors**: structured error types, not strings
//! - **Traceable**: every formula is registered with its clause and equation number
//!
//! ## Quick Start
//!
//! ```rust
//! use sc_force_core::calculations::{Dispatcher, FormInput};
//!
//! // Form values: kA, mm, mm², N/mm², kN
//! let input = FormInput::twin_bundle_example().normalize().unwrap();
//! let results = Dispatcher::default().calculate(&input).unwrap();
//!
//! println!("F_td at {} °C: {:.2} kN", results.temperature_low, results.low.f_td.unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - input records, regime dispatcher, tension sweep
//! - [`equations`] - formulas of the standard and the equation registry
//! - [`solver`] - tiered root solver for the implicit quantities
//! - [`report`] - calculation report envelope
//! - [`units`] - type-safe unit wrappers
//! - [`errors`] - structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod report;
pub mod solver;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{ConductorInput, Dispatcher, FormInput, ForceResult, ResultPair};
pub use errors::{CalcError, CalcResult};
pub use report::CalculationReport;
