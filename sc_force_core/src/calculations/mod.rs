//! # Force Calculations
//!
//! The calculation layer on top of [`crate::equations`] and [`crate::solver`].
//! Every calculation follows the pattern:
//!
//! - [`ConductorInput`] - validated input record (JSON-serializable)
//! - [`ResultPair`] - one [`ForceResult`] per reference temperature
//! - [`Dispatcher::calculate`] - regime selection plus pipeline, no state
//!   kept between calls
//!
//! ## Modules
//!
//! - [`input`] - input record, installation attributes, form-unit normalization
//! - [`regime`] - installation key and regime selection
//! - [`pipeline`] - the regime dispatcher
//! - [`result`] - result record and kN conversion
//! - [`sweep`] - static tension sweep with guaranteed rollback
//! - [`runs`] - run ids, cancellation and the published sweep table

pub mod input;
pub mod pipeline;
pub mod regime;
pub mod result;
pub mod runs;
pub mod sweep;

// Re-export commonly used types
pub use input::{Attachment, ConductorInput, FormInput, Installation, LoopGeometry, LoopPlane};
pub use pipeline::Dispatcher;
pub use regime::{InstallationKey, Regime, SpanSupport};
pub use result::{ForceResult, ForceUnit, ResultPair};
pub use runs::{run_registered_sweep, RunRegistry, RunToken, SweepBoard, SweepTable};
pub use sweep::{run_sweep, SweepConfig, SweepRow};
