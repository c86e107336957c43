use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "frontier-bfs workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the traversal benchmark with and without the rayon backend
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,
    },
}

/// (baseline name, cargo features)
const BUILDS: &[(&str, &str)] = &[("threads", ""), ("parallel", "parallel")];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { quick, report_only } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report()?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool) -> Result<()> {
    for (baseline, features) in BUILDS {
        println!("\n>>> Benchmarking build `{baseline}`");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.args(["bench", "--bench", "traversal_benchmark"]);
        if !features.is_empty() {
            cmd.args(["--features", features]);
        }

        // Args for the test runner (Criterion) go after --
        cmd.arg("--").arg("--save-baseline").arg(baseline);
        if quick {
            cmd.args(["--measurement-time", "0.5", "--noplot", "--sample-size", "10"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to run bench for `{baseline}`"))?;
        if !status.success() {
            anyhow::bail!("benchmark build `{baseline}` failed");
        }
        println!("Finished {baseline} in {:.2?}", start.elapsed());
    }
    Ok(())
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");
    let criterion_dir = Path::new("target/criterion/bfs");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    // workload ("engine/n") -> baseline -> edges per second
    let mut results: BTreeMap<String, HashMap<String, f64>> = BTreeMap::new();
    collect_results(criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }

    use std::fmt::Write as _;
    let mut out = String::new();
    writeln!(out, "# BFS Traversal Report\n")?;
    write!(out, "| Workload |")?;
    for (baseline, _) in BUILDS {
        write!(out, " {baseline} (edges/s) |")?;
    }
    writeln!(out)?;
    write!(out, "|---|")?;
    for _ in BUILDS {
        write!(out, "---|")?;
    }
    writeln!(out)?;

    for (workload, by_baseline) in &results {
        write!(out, "| {workload} |")?;
        for (baseline, _) in BUILDS {
            match by_baseline.get(*baseline) {
                Some(eps) if *eps > 1e6 => write!(out, " {:.2}M |", eps / 1e6)?,
                Some(eps) => write!(out, " {:.0} |", eps)?,
                None => write!(out, " N/A |")?,
            }
        }
        writeln!(out)?;
    }

    fs::write(report_path, out)?;
    println!("Report written to {}", report_path.display());
    Ok(())
}

/// Layout: `bfs/<engine>/<n>/<baseline>/estimates.json`
fn collect_results(dir: &Path, results: &mut BTreeMap<String, HashMap<String, f64>>) -> Result<()> {
    for engine in fs::read_dir(dir)?.flatten().filter(|e| e.path().is_dir()) {
        let engine_name = engine.file_name().to_string_lossy().into_owned();
        if engine_name == "report" {
            continue;
        }
        for size in fs::read_dir(engine.path())?.flatten().filter(|e| e.path().is_dir()) {
            let workload = format!("{engine_name}/{}", size.file_name().to_string_lossy());

            let mut elements = 1.0;
            for baseline in fs::read_dir(size.path())?.flatten() {
                let baseline_name = baseline.file_name().to_string_lossy().into_owned();
                if baseline_name == "report" {
                    continue;
                }
                let bench_json = baseline.path().join("benchmark.json");
                if let Ok(content) = fs::read_to_string(&bench_json) {
                    let json: serde_json::Value = serde_json::from_str(&content)?;
                    if let Some(t) = json.get("throughput").and_then(|t| t.get("Elements")) {
                        elements = t.as_f64().unwrap_or(1.0);
                    }
                }
                let estimates = baseline.path().join("estimates.json");
                let Ok(content) = fs::read_to_string(&estimates) else {
                    continue;
                };
                let json: serde_json::Value = serde_json::from_str(&content)?;
                let time_ns = json
                    .get("mean")
                    .and_then(|m| m.get("point_estimate"))
                    .and_then(serde_json::Value::as_f64)
                    .unwrap_or(0.0);
                if time_ns > 0.0 {
                    results
                        .entry(workload.clone())
                        .or_default()
                        .insert(baseline_name, elements * 1e9 / time_ns);
                }
            }
        }
    }
    Ok(())
}
