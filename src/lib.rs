//! # hysteresis-lab
//!
//! Analysis of quasi-static structural tests: a displacement/force record of
//! a cyclically loaded specimen goes in, identified loading cycles with
//! equivalent stiffness and dissipated energy, the skeleton (envelope) curve
//! per case, and the outer envelope across cases come out.
//!
//! ## Modules
//!
//! - [`analysis`]: the numeric pipeline (preprocessing, cycle detection,
//!   stiffness, skeleton curve)
//! - [`data`]: sample/cycle/case model plus CSV/JSON ingestion and export
//! - [`session`]: the multi-case comparison set and overall envelope
//! - [`config`]: tolerances and policy knobs, passed explicitly per call
//! - [`error`]: typed failures of the core
//!
//! The numeric pipeline holds no global state and performs no I/O of its
//! own; file handling lives in [`data`] and rendering belongs to the host
//! (see the `hysteresis-lab` binary for a CLI host).

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod session;

pub use analysis::analyze_case;
pub use config::{AnalysisConfig, RepresentativeRule, Tolerances};
pub use data::model::{Case, Cycle, Direction, Sample, SkeletonPoint, StiffnessRecord};
pub use error::AnalysisError;
pub use session::{ComparisonSet, OverallEnvelope};
