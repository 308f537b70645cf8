use log::info;
use serde::{Deserialize, Serialize};

use crate::data::model::Case;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Comparison session across multiple cases
// ---------------------------------------------------------------------------

/// One point of the overall envelope, tagged with the case it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    /// Signed peak displacement.
    pub d: f64,
    /// Force at that peak.
    pub f: f64,
    /// Label of the case whose skeleton point won this displacement level.
    pub case_label: String,
}

/// The outer envelope across all cases of a session, per direction branch,
/// ascending in signed displacement. Derived data: computing it never
/// mutates the per-case skeleton curves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallEnvelope {
    pub negative: Vec<EnvelopePoint>,
    pub positive: Vec<EnvelopePoint>,
}

impl OverallEnvelope {
    pub fn is_empty(&self) -> bool {
        self.negative.is_empty() && self.positive.is_empty()
    }

    /// Both branches concatenated, ascending in signed displacement.
    pub fn points(&self) -> impl Iterator<Item = &EnvelopePoint> {
        self.negative.iter().chain(self.positive.iter())
    }
}

/// An ordered collection of analyzed cases (insertion order = display
/// order), the single stateful object of a comparison session.
///
/// All mutation is explicit: the envelope is recomputed only when
/// [`ComparisonSet::compute_overall_envelope`] is invoked again after an add
/// or remove. The host owning the set is responsible for serializing writers
/// when cases are analyzed concurrently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonSet {
    cases: Vec<Case>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases in insertion order.
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Case labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.label == label)
    }

    /// Append a case. The label is the external identity key, so a second
    /// case with the same label is rejected and the set is left unchanged.
    pub fn add_case(&mut self, case: Case) -> Result<(), AnalysisError> {
        if self.cases.iter().any(|c| c.label == case.label) {
            return Err(AnalysisError::DuplicateLabel(case.label));
        }
        info!("session: added case '{}'", case.label);
        self.cases.push(case);
        Ok(())
    }

    /// Remove and return the case with the given label.
    pub fn remove_case(&mut self, label: &str) -> Result<Case, AnalysisError> {
        match self.cases.iter().position(|c| c.label == label) {
            Some(i) => {
                info!("session: removed case '{label}'");
                Ok(self.cases.remove(i))
            }
            None => Err(AnalysisError::CaseNotFound(label.to_string())),
        }
    }

    /// Drop all cases.
    pub fn clear(&mut self) {
        self.cases.clear();
    }

    /// Merge all cases' skeleton curves into one outer envelope.
    ///
    /// At each distinct displacement level across all cases (levels closer
    /// than `amplitude_tol` collapse into one), the point with the largest
    /// absolute force wins, the bound on every specimen's capacity at that
    /// level. Ties keep the point encountered first in sorted order, which
    /// is deterministic.
    pub fn compute_overall_envelope(&self, amplitude_tol: f64) -> OverallEnvelope {
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for case in &self.cases {
            for p in &case.skeleton.positive {
                positive.push(EnvelopePoint {
                    d: p.d,
                    f: p.f,
                    case_label: case.label.clone(),
                });
            }
            for p in &case.skeleton.negative {
                negative.push(EnvelopePoint {
                    d: p.d,
                    f: p.f,
                    case_label: case.label.clone(),
                });
            }
        }
        OverallEnvelope {
            negative: outer_bound(negative, amplitude_tol),
            positive: outer_bound(positive, amplitude_tol),
        }
    }
}

/// Sort points by displacement, collapse levels within `amplitude_tol`, and
/// keep the max-|force| point of each level.
fn outer_bound(mut points: Vec<EnvelopePoint>, amplitude_tol: f64) -> Vec<EnvelopePoint> {
    let tol = amplitude_tol.max(0.0);
    points.sort_by(|a, b| a.d.total_cmp(&b.d));

    let mut out: Vec<EnvelopePoint> = Vec::new();
    let mut level_ref = f64::NAN;
    for p in points {
        if let Some(last) = out.last_mut() {
            if p.d - level_ref <= tol {
                if p.f.abs() > last.f.abs() {
                    *last = p;
                }
                continue;
            }
        }
        level_ref = p.d;
        out.push(p);
    }
    out
}
