use log::debug;

use crate::data::model::Sample;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Preprocessor: clean and align one raw sample sequence
// ---------------------------------------------------------------------------

/// Clean a raw sample sequence: drop non-finite samples, collapse duplicate
/// timestamps by averaging, then optionally smooth displacement and force
/// with a centered moving average of `smoothing_window` samples (`<= 1`
/// disables smoothing).
///
/// Pure transformation: the input is untouched, a new sequence is returned.
/// Fails with [`AnalysisError::InsufficientData`] when fewer than 2 valid
/// samples remain.
pub fn preprocess(raw: &[Sample], smoothing_window: usize) -> Result<Vec<Sample>, AnalysisError> {
    let dropped = raw.iter().filter(|s| !s.is_finite()).count();
    if dropped > 0 {
        debug!("preprocess: dropped {dropped} non-finite sample(s)");
    }

    let cleaned = merge_duplicate_timestamps(raw.iter().copied().filter(Sample::is_finite));

    if cleaned.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            valid: cleaned.len(),
        });
    }

    if smoothing_window <= 1 {
        return Ok(cleaned);
    }
    Ok(moving_average(&cleaned, smoothing_window))
}

/// Collapse runs of samples sharing a timestamp into one sample whose
/// displacement and force are the run averages. Deterministic, and leaves
/// the sequence strictly increasing in `t` (input is ordered by `t`).
fn merge_duplicate_timestamps(samples: impl Iterator<Item = Sample>) -> Vec<Sample> {
    let mut out: Vec<Sample> = Vec::new();
    // (sum_d, sum_f, count) of the run currently ending `out`
    let mut run: Option<(f64, f64, usize)> = None;

    for s in samples {
        if let Some(last) = out.last_mut() {
            if last.t == s.t {
                let (sum_d, sum_f, n) = run.get_or_insert((last.d, last.f, 1));
                *sum_d += s.d;
                *sum_f += s.f;
                *n += 1;
                last.d = *sum_d / *n as f64;
                last.f = *sum_f / *n as f64;
                continue;
            }
        }
        run = None;
        out.push(s);
    }
    out
}

/// Centered moving average over displacement and force. An even window
/// width rounds up to the next odd one; the window shrinks symmetrically at
/// the ends so the output keeps the input length; time stamps pass through
/// unchanged.
fn moving_average(samples: &[Sample], window: usize) -> Vec<Sample> {
    let half = window / 2;
    let n = samples.len();

    (0..n)
        .map(|i| {
            let radius = half.min(i).min(n - 1 - i);
            let slice = &samples[i - radius..=i + radius];
            let count = slice.len() as f64;
            Sample {
                t: samples[i].t,
                d: slice.iter().map(|s| s.d).sum::<f64>() / count,
                f: slice.iter().map(|s| s.f).sum::<f64>() / count,
            }
        })
        .collect()
}
