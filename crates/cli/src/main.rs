//! sheetnest command-line front end.
//!
//! # Commands
//!
//! - `sheetnest nest <JOB>` - Nest a job file and run the cost pass
//! - `sheetnest check <JOB>` - Validate a job file without nesting

mod job;
mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use job::{JobFile, RatesFile};
use sheetnest_costing::CostAllocator;
use sheetnest_nesting::{ProgressCallback, ProgressInfo, SearchMode, SheetNester, SheetResult};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetnest")]
#[command(about = "Sheet nesting and material costing for laser cutting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Nest a job onto stock sheets and price the result
    Nest {
        /// Path to the JSON job file
        job: PathBuf,

        /// Run the exhaustive search (slower, for final quotes)
        #[arg(long)]
        deep: bool,

        /// Random seed (overrides the job file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output file for the full result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rates file for material lookup (JSON)
        #[arg(long)]
        rates: Option<PathBuf>,

        /// Material name to look up in the rates file
        #[arg(short, long, requires = "rates")]
        material: Option<String>,
    },

    /// Validate a job file and list parts that can never fit
    Check {
        /// Path to the JSON job file
        job: PathBuf,
    },
}

fn build_nester(job: &JobFile, seed: Option<u64>) -> Result<SheetNester> {
    let mut config = job.to_config();
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let mut nester = SheetNester::new(config).context("Invalid nesting configuration")?;
    for part in &job.parts {
        nester
            .add_part(&part.to_geometry(), part.quantity)
            .with_context(|| format!("Invalid part '{}'", part.name))?;
    }
    Ok(nester)
}

fn run_nest(
    job_path: &Path,
    deep: bool,
    seed: Option<u64>,
    output: Option<PathBuf>,
    rates: Option<PathBuf>,
    material: Option<String>,
) -> Result<()> {
    let job = JobFile::load(job_path)?;
    let table = rates
        .as_deref()
        .map(RatesFile::load)
        .transpose()?
        .map(|file| file.to_table());
    let params = job.cost_params(table.as_ref(), material.as_deref())?;

    let nester = build_nester(&job, seed)?;
    let mode = SearchMode::from_deep(deep);
    println!(
        "Nesting {} parts from {} ({:?} mode)",
        nester.part_count(),
        job_path.display(),
        mode
    );

    let progress: ProgressCallback = Box::new(|info: &ProgressInfo, _sheets: &[SheetResult]| {
        if info.running {
            println!(
                "  sheet {:>3}: {}/{} placed ({:.0}%), last sheet {:.1}%",
                info.sheets_completed,
                info.items_placed,
                info.total_items,
                info.placement_ratio() * 100.0,
                info.last_sheet_efficiency * 100.0
            );
        }
    });
    let mut result = nester.run_nesting(mode, Some(&progress));

    if let Some(params) = &params {
        CostAllocator::new(params.clone()).calculate_costs(&mut result);
    }

    report::print_summary(&result, params.is_some());
    report::print_unplaced(&result);
    report::print_breakdown(&result);

    if let Some(path) = output {
        report::save_json(&result, &path)?;
        println!("Result saved to: {}", path.display());
    }

    Ok(())
}

fn run_check(job_path: &Path) -> Result<()> {
    let job = JobFile::load(job_path)?;
    let nester = build_nester(&job, None)?;
    let config = nester.config();

    let misfits: Vec<_> = nester
        .parts()
        .iter()
        .filter(|p| {
            !p.fits_within(
                config.usable_width(),
                config.usable_height(),
                config.allow_rotation,
            )
        })
        .collect();

    println!(
        "{}: {} part lines, {} instances, sheet {} x {} (usable {} x {})",
        job_path.display(),
        job.parts.len(),
        nester.part_count(),
        config.sheet_width,
        config.sheet_height,
        config.usable_width(),
        config.usable_height()
    );

    if misfits.is_empty() {
        println!("All parts fit the sheet");
        return Ok(());
    }

    for part in &misfits {
        println!(
            "  - {} needs {:.1} x {:.1} mm with spacing",
            part.name, part.width, part.height
        );
    }
    bail!("{} part instances can never fit the sheet", misfits.len())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Nest {
            job,
            deep,
            seed,
            output,
            rates,
            material,
        } => run_nest(&job, deep, seed, output, rates, material),
        Commands::Check { job } => run_check(&job),
    }
}
