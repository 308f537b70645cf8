use log::debug;

use crate::data::model::{Cycle, Sample, StiffnessRecord};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// StiffnessCalculator: equivalent stiffness and loop energy per cycle
// ---------------------------------------------------------------------------

/// Compute the stiffness record for one cycle.
///
/// `k_eq = (|f_at_d_max| + |f_at_d_min|) / (|d_max| + |d_min|)`: the secant
/// connecting the two loop peaks through the origin reference. A zero
/// denominator is reported as [`AnalysisError::DegenerateCycle`] rather than
/// an infinite or NaN value; the detector never emits such a cycle.
///
/// Loop energy is the signed shoelace area of the displacement-force trace,
/// and only applies to complete cycles; incomplete cycles carry `None`,
/// which downstream must read as "not applicable", never as zero.
pub fn stiffness_record(
    samples: &[Sample],
    cycle: &Cycle,
) -> Result<StiffnessRecord, AnalysisError> {
    let denom = cycle.d_max.abs() + cycle.d_min.abs();
    if denom == 0.0 {
        return Err(AnalysisError::DegenerateCycle {
            start: cycle.start_index,
            end: cycle.end_index,
        });
    }
    let k_eq = (cycle.f_at_d_max.abs() + cycle.f_at_d_min.abs()) / denom;

    let energy_dissipated = if cycle.is_complete {
        Some(loop_area(
            &samples[cycle.start_index..=cycle.end_index],
        ))
    } else {
        None
    };

    debug!(
        "cycle {}..={}: k_eq = {:.6}, energy = {:?}",
        cycle.start_index, cycle.end_index, k_eq, energy_dissipated
    );
    Ok(StiffnessRecord {
        k_eq,
        energy_dissipated,
    })
}

/// Compute records for all cycles of a case, index-aligned with the input.
pub fn stiffness_records(
    samples: &[Sample],
    cycles: &[Cycle],
) -> Result<Vec<StiffnessRecord>, AnalysisError> {
    cycles
        .iter()
        .map(|c| stiffness_record(samples, c))
        .collect()
}

/// Signed polygon area of the `(d, f)` trace by shoelace accumulation, with
/// the implicit closing edge from the last sample back to the first.
fn loop_area(samples: &[Sample]) -> f64 {
    let n = samples.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = &samples[i];
        let b = &samples[(i + 1) % n];
        twice_area += a.d * b.f - b.d * a.f;
    }
    0.5 * twice_area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Direction;

    fn cycle(start: usize, end: usize, complete: bool) -> Cycle {
        Cycle {
            start_index: start,
            end_index: end,
            d_max: 5.0,
            f_at_d_max: 100.0,
            d_min: -5.0,
            f_at_d_min: -100.0,
            direction: Direction::Positive,
            is_complete: complete,
        }
    }

    #[test]
    fn test_secant_stiffness_of_symmetric_loop() {
        let samples = vec![
            Sample::new(0.0, 0.0, 0.0),
            Sample::new(1.0, 5.0, 100.0),
            Sample::new(2.0, 0.0, 0.0),
            Sample::new(3.0, -5.0, -100.0),
            Sample::new(4.0, 0.0, 0.0),
        ];
        let rec = stiffness_record(&samples, &cycle(0, 4, true)).unwrap();
        assert!((rec.k_eq - 20.0).abs() < 1e-12);
        assert!(rec.k_eq.is_finite() && rec.k_eq > 0.0);
    }

    #[test]
    fn test_incomplete_cycle_has_no_energy() {
        let samples = vec![
            Sample::new(0.0, 0.0, 0.0),
            Sample::new(1.0, 5.0, 100.0),
            Sample::new(2.0, 0.0, 0.0),
            Sample::new(3.0, -5.0, -100.0),
            Sample::new(4.0, 0.0, 0.0),
        ];
        let rec = stiffness_record(&samples, &cycle(0, 4, false)).unwrap();
        assert_eq!(rec.energy_dissipated, None);
    }

    #[test]
    fn test_degenerate_cycle_is_rejected_not_nan() {
        let samples = vec![Sample::new(0.0, 0.0, 1.0), Sample::new(1.0, 0.0, 2.0)];
        let mut c = cycle(0, 1, false);
        c.d_max = 0.0;
        c.d_min = 0.0;
        let err = stiffness_record(&samples, &c).unwrap_err();
        assert_eq!(err, AnalysisError::DegenerateCycle { start: 0, end: 1 });
    }

    #[test]
    fn test_loop_area_of_known_polygon() {
        // Diamond in the (d, f) plane with diagonals 2 and 2: area 2, sign
        // set by the counter-clockwise traversal.
        let samples = vec![
            Sample::new(0.0, 1.0, 0.0),
            Sample::new(1.0, 0.0, 1.0),
            Sample::new(2.0, -1.0, 0.0),
            Sample::new(3.0, 0.0, -1.0),
        ];
        assert!((loop_area(&samples) - 2.0).abs() < 1e-12);

        // Clockwise traversal flips the sign.
        let reversed: Vec<Sample> = samples.iter().rev().copied().collect();
        assert!((loop_area(&reversed) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_loop_area_ignores_duplicate_closing_point() {
        // A trace that explicitly returns to its first point adds a
        // zero-length closing edge and must give the same area.
        let open = vec![
            Sample::new(0.0, 1.0, 0.0),
            Sample::new(1.0, 0.0, 1.0),
            Sample::new(2.0, -1.0, 0.0),
            Sample::new(3.0, 0.0, -1.0),
        ];
        let mut closed = open.clone();
        closed.push(Sample::new(4.0, 1.0, 0.0));
        assert!((loop_area(&open) - loop_area(&closed)).abs() < 1e-12);
    }

    #[test]
    fn test_energy_is_deterministic() {
        let samples: Vec<Sample> = (0..200)
            .map(|i| {
                let phase = i as f64 * 0.1;
                Sample::new(i as f64, 5.0 * phase.sin(), 90.0 * (phase - 0.3).sin())
            })
            .collect();
        let c = Cycle {
            start_index: 0,
            end_index: 62,
            d_max: 5.0,
            f_at_d_max: 80.0,
            d_min: -5.0,
            f_at_d_min: -80.0,
            direction: Direction::Positive,
            is_complete: true,
        };
        let a = stiffness_record(&samples, &c).unwrap();
        let b = stiffness_record(&samples, &c).unwrap();
        assert_eq!(a, b);
        assert!(a.energy_dissipated.unwrap().is_finite());
    }

    #[test]
    fn test_records_align_with_cycles() {
        let samples = vec![
            Sample::new(0.0, 0.0, 0.0),
            Sample::new(1.0, 5.0, 100.0),
            Sample::new(2.0, 0.0, 0.0),
            Sample::new(3.0, -5.0, -100.0),
            Sample::new(4.0, 0.0, 0.0),
        ];
        let cycles = vec![cycle(0, 4, true)];
        let records = stiffness_records(&samples, &cycles).unwrap();
        assert_eq!(records.len(), cycles.len());
    }
}
