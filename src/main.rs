use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;

use hysteresis_lab::analysis::analyze_case;
use hysteresis_lab::config::{AnalysisConfig, RepresentativeRule};
use hysteresis_lab::data::export;
use hysteresis_lab::data::loader::{load_file, ChannelSelection};
use hysteresis_lab::session::ComparisonSet;

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {program} [options] <file.csv|file.json>...\n\
         \n\
         Each input file is analyzed as one case (label = file stem).\n\
         \n\
         Options:\n\
           --disp <name>       displacement column (default 'd')\n\
           --force <name>      force column (default 'f')\n\
           --time <name|none>  time column (default 't'; 'none' = row index)\n\
           --smoothing <n>     moving-average window (default 1 = off)\n\
           --rule <r>          skeleton representative: first_cycle | max_force | last_cycle\n\
           --config <file>     load an AnalysisConfig from JSON (flags after it override)\n\
           --out <dir>         export cycle/skeleton/envelope CSVs to <dir>"
    );
}

struct CliArgs {
    files: Vec<PathBuf>,
    channels: ChannelSelection,
    config: AnalysisConfig,
    out_dir: Option<PathBuf>,
}

fn next_value(args: &mut std::env::Args, flag: &str) -> Result<String> {
    args.next().with_context(|| format!("{flag} needs a value"))
}

fn parse_args() -> Result<CliArgs> {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "hysteresis-lab".to_string());

    let mut files = Vec::new();
    let mut channels = ChannelSelection::default();
    let mut config = AnalysisConfig::default();
    let mut out_dir = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--disp" => channels.displacement = next_value(&mut args, "--disp")?,
            "--force" => channels.force = next_value(&mut args, "--force")?,
            "--time" => {
                let name = next_value(&mut args, "--time")?;
                channels.time = (name != "none").then_some(name);
            }
            "--smoothing" => {
                let n = next_value(&mut args, "--smoothing")?;
                config.smoothing_window =
                    n.parse().with_context(|| format!("invalid --smoothing '{n}'"))?;
            }
            "--rule" => {
                let r = next_value(&mut args, "--rule")?;
                config.representative = match r.as_str() {
                    "first_cycle" => RepresentativeRule::FirstCycle,
                    "max_force" => RepresentativeRule::MaxForce,
                    "last_cycle" => RepresentativeRule::LastCycle,
                    other => bail!("unknown --rule '{other}'"),
                };
            }
            "--config" => {
                let path = next_value(&mut args, "--config")?;
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config {path}"))?;
                config = serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {path}"))?;
            }
            "--out" => out_dir = Some(PathBuf::from(next_value(&mut args, "--out")?)),
            "--help" | "-h" => {
                print_usage(&program);
                std::process::exit(0);
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }

    if files.is_empty() {
        print_usage(&program);
        bail!("no input files given");
    }
    Ok(CliArgs {
        files,
        channels,
        config,
        out_dir,
    })
}

fn case_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_case(case: &hysteresis_lab::Case) {
    println!("\n=== Case '{}' ===", case.label);
    println!(
        "{} samples, {} cycle(s), {} skipped degenerate",
        case.samples.len(),
        case.cycles.len(),
        case.skipped_degenerate
    );
    println!("{:<7}{:>18}{:>20}{:>12}{:>12}", "cycle", "d_min ~ d_max", "f_min ~ f_max", "k_eq", "energy");
    for (i, (cycle, record)) in case.cycles.iter().zip(case.records.iter()).enumerate() {
        let energy = record
            .energy_dissipated
            .map(|e| format!("{e:.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:<7}{:>8.3} ~ {:>7.3}{:>9.3} ~ {:>8.3}{:>12.3}{:>12}",
            i + 1,
            cycle.d_min,
            cycle.d_max,
            cycle.f_at_d_min,
            cycle.f_at_d_max,
            record.k_eq,
            energy
        );
    }
    if let Some(mean) = case.mean_k_eq() {
        println!("mean equivalent stiffness: {mean:.3}");
    }
    println!("skeleton levels: {} negative, {} positive", case.skeleton.negative.len(), case.skeleton.positive.len());
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let mut session = ComparisonSet::new();
    for path in &args.files {
        let label = case_label(path);
        info!("loading {} as case '{label}'", path.display());

        let raw = load_file(path, &args.channels)
            .with_context(|| format!("loading {}", path.display()))?;
        let case = analyze_case(&label, &raw, &args.config)
            .with_context(|| format!("analyzing {}", path.display()))?;

        print_case(&case);

        if let Some(dir) = &args.out_dir {
            export::write_cycle_table(&dir.join(format!("{label}_cycles.csv")), &case)?;
            export::write_skeleton_csv(&dir.join(format!("{label}_skeleton.csv")), &case)?;
        }

        session.add_case(case)?;
    }

    if session.len() > 1 {
        let amplitude_tol = session
            .cases()
            .iter()
            .map(|c| c.tolerances.amplitude)
            .fold(0.0_f64, f64::max);
        let envelope = session.compute_overall_envelope(amplitude_tol);

        println!("\n=== Overall envelope ({} cases) ===", session.len());
        for p in envelope.points() {
            println!("{:>10.3}{:>12.3}  [{}]", p.d, p.f, p.case_label);
        }

        if let Some(dir) = &args.out_dir {
            export::write_envelope_csv(&dir.join("overall_envelope.csv"), &envelope)?;
        }
    }

    Ok(())
}
