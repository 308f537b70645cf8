//! Numeric pipeline: raw samples → cycles → stiffness → skeleton curve.
//!
//! ```text
//!   raw (t, d, f) samples
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ preprocess   │  drop non-finite, merge timestamps, smooth
//!   └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ cycles       │  turning points → loading cycles
//!   └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ stiffness    │  k_eq + loop energy per cycle
//!   └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ skeleton     │  representative peak per amplitude level
//!   └─────────────┘
//!          │
//!          ▼
//!        Case
//! ```
//!
//! Every stage is a pure transformation taking its configuration explicitly;
//! there is no shared mutable state, so independent cases can be analyzed
//! concurrently by the host.

pub mod cycles;
pub mod preprocess;
pub mod skeleton;
pub mod stiffness;

use log::info;

use crate::config::AnalysisConfig;
use crate::data::model::{Case, Sample};
use crate::error::AnalysisError;

/// Run the whole per-case pipeline on one raw sample sequence.
pub fn analyze_case(
    label: &str,
    raw: &[Sample],
    config: &AnalysisConfig,
) -> Result<Case, AnalysisError> {
    info!("analyzing case '{label}' ({} raw samples)", raw.len());

    let samples = preprocess::preprocess(raw, config.smoothing_window)?;

    let d_range = displacement_range(&samples);
    let tolerances = config.resolve(d_range);

    let detection = cycles::detect_cycles(&samples, &tolerances);
    let records = stiffness::stiffness_records(&samples, &detection.cycles)?;
    let skeleton =
        skeleton::build_skeleton(&detection.cycles, tolerances.amplitude, config.representative);

    info!(
        "case '{label}': {} cycle(s), {} skeleton level(s)",
        detection.cycles.len(),
        skeleton.len()
    );
    Ok(Case {
        label: label.to_string(),
        samples,
        cycles: detection.cycles,
        records,
        skeleton,
        skipped_degenerate: detection.skipped_degenerate,
        tolerances,
    })
}

/// Max − min of the cleaned displacement series, used to resolve
/// range-relative tolerance defaults.
fn displacement_range(samples: &[Sample]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in samples {
        min = min.min(s.d);
        max = max.max(s.d);
    }
    if min <= max {
        max - min
    } else {
        0.0
    }
}
