use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Case, Direction};
use crate::session::OverallEnvelope;

// ---------------------------------------------------------------------------
// CSV export of analysis results
// ---------------------------------------------------------------------------

/// Write a case's per-cycle table: index range, extrema, equivalent
/// stiffness, and loop energy. Incomplete cycles have an empty energy cell,
/// not a zero.
pub fn write_cycle_table(path: &Path, case: &Case) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        "cycle",
        "start_index",
        "end_index",
        "direction",
        "complete",
        "d_min",
        "d_max",
        "f_at_d_min",
        "f_at_d_max",
        "k_eq",
        "energy_dissipated",
    ])?;

    for (i, (cycle, record)) in case.cycles.iter().zip(case.records.iter()).enumerate() {
        writer.write_record([
            (i + 1).to_string(),
            cycle.start_index.to_string(),
            cycle.end_index.to_string(),
            direction_label(cycle.direction).to_string(),
            cycle.is_complete.to_string(),
            cycle.d_min.to_string(),
            cycle.d_max.to_string(),
            cycle.f_at_d_min.to_string(),
            cycle.f_at_d_max.to_string(),
            record.k_eq.to_string(),
            record
                .energy_dissipated
                .map(|e| e.to_string())
                .unwrap_or_default(),
        ])?;
    }
    writer.flush().context("flushing cycle table")?;
    Ok(())
}

/// Write a case's skeleton curve, negative branch first, ascending in
/// signed displacement.
pub fn write_skeleton_csv(path: &Path, case: &Case) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(["d", "f", "source_cycle"])?;
    for p in case.skeleton.points() {
        writer.write_record([
            p.d.to_string(),
            p.f.to_string(),
            (p.source_cycle + 1).to_string(),
        ])?;
    }
    writer.flush().context("flushing skeleton curve")?;
    Ok(())
}

/// Write the multi-case overall envelope with the winning case per level.
pub fn write_envelope_csv(path: &Path, envelope: &OverallEnvelope) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(["d", "f", "case"])?;
    for p in envelope.points() {
        writer.write_record([p.d.to_string(), p.f.to_string(), p.case_label.clone()])?;
    }
    writer.flush().context("flushing envelope")?;
    Ok(())
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Positive => "positive",
        Direction::Negative => "negative",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_case;
    use crate::config::AnalysisConfig;
    use crate::data::model::Sample;
    use crate::session::ComparisonSet;

    fn sample_case(label: &str) -> Case {
        let raw = vec![
            Sample::new(0.0, 0.0, 0.0),
            Sample::new(1.0, 5.0, 100.0),
            Sample::new(2.0, 0.0, 0.0),
            Sample::new(3.0, -5.0, -100.0),
            Sample::new(4.0, 0.0, 0.0),
        ];
        analyze_case(label, &raw, &AnalysisConfig::default()).unwrap()
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("hysteresis-lab-export-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_cycle_table_round_trips_through_csv() {
        let case = sample_case("C1");
        let path = temp_path("cycles.csv");
        write_cycle_table(&path, &case).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("cycle,start_index"));
        let row = lines.next().unwrap();
        assert!(row.contains(",20,")); // k_eq = 20
        assert!(row.contains("positive"));
    }

    #[test]
    fn test_skeleton_csv_lists_branches_in_order() {
        let case = sample_case("C1");
        let path = temp_path("skeleton.csv");
        write_skeleton_csv(&path, &case).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("-5,")); // negative branch first
        assert!(rows[1].starts_with("5,"));
    }

    #[test]
    fn test_envelope_csv_includes_case_labels() {
        let mut set = ComparisonSet::new();
        set.add_case(sample_case("C1")).unwrap();
        let env = set.compute_overall_envelope(0.5);

        let path = temp_path("envelope.csv");
        write_envelope_csv(&path, &env).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.lines().skip(1).all(|l| l.ends_with(",C1")));
    }
}
