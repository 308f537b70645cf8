use serde::{Deserialize, Serialize};

use crate::analysis::skeleton::SkeletonCurve;
use crate::config::Tolerances;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Sample – one acquisition instant
// ---------------------------------------------------------------------------

/// One `(time, displacement, force)` triple of the test record.
///
/// After preprocessing the sequence is strictly increasing in `t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Acquisition time.
    pub t: f64,
    /// Displacement.
    pub d: f64,
    /// Force.
    pub f: f64,
}

impl Sample {
    pub fn new(t: f64, d: f64, f: f64) -> Self {
        Sample { t, d, f }
    }

    /// Whether displacement and force (and time) are all finite.
    pub fn is_finite(&self) -> bool {
        self.t.is_finite() && self.d.is_finite() && self.f.is_finite()
    }
}

/// Zip separate channel slices into a sample sequence.
///
/// The displacement and force channels must have equal length (they come from
/// the same acquisition table). An absent time channel falls back to the row
/// index, which preserves ordering for rigs that log no time column.
pub fn samples_from_channels(
    time: Option<&[f64]>,
    displacement: &[f64],
    force: &[f64],
) -> Result<Vec<Sample>, AnalysisError> {
    if displacement.len() != force.len() {
        return Err(AnalysisError::ChannelMismatch {
            displacement: displacement.len(),
            force: force.len(),
        });
    }
    if let Some(t) = time {
        if t.len() != displacement.len() {
            return Err(AnalysisError::ChannelMismatch {
                displacement: displacement.len(),
                force: t.len(),
            });
        }
    }
    Ok(displacement
        .iter()
        .zip(force.iter())
        .enumerate()
        .map(|(i, (&d, &f))| Sample {
            t: time.map(|t| t[i]).unwrap_or(i as f64),
            d,
            f,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Cycle – one loading loop of the displacement history
// ---------------------------------------------------------------------------

/// Loading direction of a cycle's first half, by sign of the displacement
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Positive,
    Negative,
}

/// One detected loading cycle: a contiguous index range of the cleaned
/// sample sequence together with its displacement extrema.
///
/// Cycles within a case are disjoint and time-ordered; consecutive cycles may
/// share a single boundary sample. `d_max > d_min` holds for every retained
/// cycle (flat segments are dropped by the detector).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// First sample index (into the cleaned sequence).
    pub start_index: usize,
    /// Last sample index, inclusive.
    pub end_index: usize,
    /// Largest displacement reached.
    pub d_max: f64,
    /// Force recorded at `d_max`.
    pub f_at_d_max: f64,
    /// Smallest displacement reached.
    pub d_min: f64,
    /// Force recorded at `d_min`.
    pub f_at_d_min: f64,
    /// Sign of the first half-cycle's displacement change.
    pub direction: Direction,
    /// Whether the loop returned within the closure tolerance of its
    /// starting displacement.
    pub is_complete: bool,
}

impl Cycle {
    /// Number of samples covered, boundary samples included.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Peak-to-peak displacement amplitude.
    pub fn amplitude(&self) -> f64 {
        self.d_max - self.d_min
    }
}

// ---------------------------------------------------------------------------
// StiffnessRecord – derived metrics of one cycle
// ---------------------------------------------------------------------------

/// Equivalent stiffness and loop energy of exactly one cycle.
///
/// Immutable once computed; it is only recomputed when the owning cycle's
/// extrema change (i.e. by re-running the pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessRecord {
    /// Equivalent secant stiffness connecting the two loop peaks through the
    /// origin reference: `(|f_at_d_max| + |f_at_d_min|) / (|d_max| + |d_min|)`.
    pub k_eq: f64,
    /// Signed area enclosed by the displacement-force trace. `None` for
    /// incomplete cycles, where the loop area is not applicable and is never
    /// coerced to zero.
    pub energy_dissipated: Option<f64>,
}

// ---------------------------------------------------------------------------
// SkeletonPoint – one representative peak of an envelope
// ---------------------------------------------------------------------------

/// One representative peak of a case's skeleton curve, signed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkeletonPoint {
    /// Signed peak displacement.
    pub d: f64,
    /// Force at that peak.
    pub f: f64,
    /// Index of the source cycle in the case's cycle list. A plain index,
    /// never ownership.
    pub source_cycle: usize,
}

// ---------------------------------------------------------------------------
// Case – one complete test run
// ---------------------------------------------------------------------------

/// One analyzed test run: the cleaned samples, the detected cycles with
/// their stiffness records, and the skeleton curve.
///
/// A case is immutable once its pipeline completes; the comparison session
/// only ever adds or removes whole cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// External identity key, e.g. the source file stem.
    pub label: String,
    /// Cleaned, strictly time-ordered samples.
    pub samples: Vec<Sample>,
    /// Detected cycles, time-ordered and non-overlapping.
    pub cycles: Vec<Cycle>,
    /// Stiffness records, index-aligned with `cycles`.
    pub records: Vec<StiffnessRecord>,
    /// Skeleton curve (positive and negative branch).
    pub skeleton: SkeletonCurve,
    /// Degenerate (zero-amplitude) cycle candidates dropped by the detector.
    pub skipped_degenerate: usize,
    /// Tolerances the pipeline actually used, after resolving defaults
    /// against this case's displacement range.
    pub tolerances: Tolerances,
}

impl Case {
    /// Mean equivalent stiffness over the complete cycles, `None` when the
    /// case has no complete cycle.
    pub fn mean_k_eq(&self) -> Option<f64> {
        let complete: Vec<f64> = self
            .cycles
            .iter()
            .zip(self.records.iter())
            .filter(|(c, _)| c.is_complete)
            .map(|(_, r)| r.k_eq)
            .collect();
        if complete.is_empty() {
            None
        } else {
            Some(complete.iter().sum::<f64>() / complete.len() as f64)
        }
    }

    /// Samples covered by the given cycle.
    pub fn cycle_samples(&self, cycle: &Cycle) -> &[Sample] {
        &self.samples[cycle.start_index..=cycle.end_index]
    }
}
