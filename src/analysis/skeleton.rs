use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::RepresentativeRule;
use crate::data::model::{Cycle, SkeletonPoint};

// ---------------------------------------------------------------------------
// SkeletonBuilder: reduce a case's cycles to an envelope per direction
// ---------------------------------------------------------------------------

/// A case's skeleton (envelope) curve: one representative peak per amplitude
/// level, split by loading direction.
///
/// Both branches are strictly ascending in signed displacement, so
/// concatenating `negative` then `positive` walks the whole backbone from
/// the largest pull to the largest push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonCurve {
    /// Negative-going peaks, ascending in signed displacement.
    pub negative: Vec<SkeletonPoint>,
    /// Positive-going peaks, ascending in signed displacement.
    pub positive: Vec<SkeletonPoint>,
}

impl SkeletonCurve {
    pub fn is_empty(&self) -> bool {
        self.negative.is_empty() && self.positive.is_empty()
    }

    pub fn len(&self) -> usize {
        self.negative.len() + self.positive.len()
    }

    /// Both branches concatenated, ascending in signed displacement.
    pub fn points(&self) -> impl Iterator<Item = &SkeletonPoint> {
        self.negative.iter().chain(self.positive.iter())
    }
}

/// Build the skeleton curve from a case's cycle list.
///
/// Each cycle contributes its positive peak `(d_max, f_at_d_max)` to the
/// positive branch and its negative peak `(d_min, f_at_d_min)` to the
/// negative one (peaks on the wrong side of zero are not envelope points).
/// Within a branch, peaks whose displacements lie within `amplitude_tol` of
/// each other collapse into one amplitude level (standard loading protocols
/// repeat each target displacement several times), and the level's
/// representative is chosen by `rule`, first-cycle by default. A case with
/// no cycles yields an empty curve, not an error.
pub fn build_skeleton(
    cycles: &[Cycle],
    amplitude_tol: f64,
    rule: RepresentativeRule,
) -> SkeletonCurve {
    let positive: Vec<SkeletonPoint> = cycles
        .iter()
        .enumerate()
        .filter(|(_, c)| c.d_max > 0.0)
        .map(|(i, c)| SkeletonPoint {
            d: c.d_max,
            f: c.f_at_d_max,
            source_cycle: i,
        })
        .collect();
    let negative: Vec<SkeletonPoint> = cycles
        .iter()
        .enumerate()
        .filter(|(_, c)| c.d_min < 0.0)
        .map(|(i, c)| SkeletonPoint {
            d: c.d_min,
            f: c.f_at_d_min,
            source_cycle: i,
        })
        .collect();

    let curve = SkeletonCurve {
        negative: collapse_levels(negative, amplitude_tol, rule),
        positive: collapse_levels(positive, amplitude_tol, rule),
    };
    debug!(
        "skeleton: {} positive, {} negative level(s) from {} cycle(s)",
        curve.positive.len(),
        curve.negative.len(),
        cycles.len()
    );
    curve
}

/// Sort candidate peaks by displacement, merge runs closer than
/// `amplitude_tol` into one level, and keep one representative per level.
fn collapse_levels(
    mut peaks: Vec<SkeletonPoint>,
    amplitude_tol: f64,
    rule: RepresentativeRule,
) -> Vec<SkeletonPoint> {
    let tol = amplitude_tol.max(0.0);
    peaks.sort_by(|a, b| {
        a.d.total_cmp(&b.d)
            .then_with(|| a.source_cycle.cmp(&b.source_cycle))
    });

    let mut levels: Vec<SkeletonPoint> = Vec::new();
    let mut bucket: Vec<SkeletonPoint> = Vec::new();
    let mut bucket_ref = f64::NAN;

    for p in peaks {
        if bucket.is_empty() || p.d - bucket_ref <= tol {
            if bucket.is_empty() {
                bucket_ref = p.d;
            }
            bucket.push(p);
        } else {
            levels.push(representative(&bucket, rule));
            bucket_ref = p.d;
            bucket = vec![p];
        }
    }
    if !bucket.is_empty() {
        levels.push(representative(&bucket, rule));
    }
    levels
}

/// Pick the representative peak of one amplitude level. Ties on the
/// max-force rule fall back to the earlier cycle, keeping the choice
/// deterministic.
fn representative(bucket: &[SkeletonPoint], rule: RepresentativeRule) -> SkeletonPoint {
    let mut best = bucket[0];
    for p in &bucket[1..] {
        let wins = match rule {
            RepresentativeRule::FirstCycle => p.source_cycle < best.source_cycle,
            RepresentativeRule::LastCycle => p.source_cycle > best.source_cycle,
            RepresentativeRule::MaxForce => p.f.abs() > best.f.abs(),
        };
        if wins {
            best = *p;
        }
    }
    best
}
