//! Command implementations for HSL CLI.
//!
//! Provides subcommands that load a dataset directory into the structure
//! database, compute laws and export them.

use std::path::PathBuf;

use clap::Subcommand;
use hsl_core::method::Method;

pub mod compute;
pub mod dataset;
pub mod export;

#[derive(Subcommand)]
pub enum Command {
    /// Compute the law of one structure
    Compute {
        /// Directory holding structures.csv, parameters.csv, profiles.csv, elements.csv and abacus.csv
        #[arg(short = 'd', long)]
        data_dir: PathBuf,

        /// Computation method (bradley78, bradley72, borda, orifice)
        #[arg(short = 'm', long)]
        method: Method,

        /// Structure id
        #[arg(short = 's', long)]
        structure: i64,

        /// Output path for the law table (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// JSON file overriding numerical settings
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Write the full report with diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the law of every active structure
    ComputeAll {
        #[arg(short = 'd', long)]
        data_dir: PathBuf,

        #[arg(short = 'm', long)]
        method: Method,

        /// Directory receiving one table per structure
        #[arg(short = 'o', long)]
        output_dir: PathBuf,

        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// List the structures of a dataset
    List {
        #[arg(short = 'd', long)]
        data_dir: PathBuf,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Compute {
            data_dir,
            method,
            structure,
            output,
            settings,
            json,
        } => {
            let db = dataset::load_dir(&data_dir)?;
            let settings = dataset::load_settings(settings.as_deref())?;
            let report = compute::compute_structure(&db, &settings, method, structure)?;
            compute::write_report(&report, output.as_deref(), json)
        }
        Command::ComputeAll {
            data_dir,
            method,
            output_dir,
            settings,
        } => {
            let db = dataset::load_dir(&data_dir)?;
            let settings = dataset::load_settings(settings.as_deref())?;
            let summary = compute::compute_all(&db, &settings, method, &output_dir)?;
            println!("{}", summary);
            Ok(())
        }
        Command::List { data_dir } => {
            let db = dataset::load_dir(&data_dir)?;
            for s in db.query_structures()? {
                println!(
                    "{}\t{}\t{}",
                    s.id,
                    s.name,
                    if s.active { "active" } else { "inactive" }
                );
            }
            Ok(())
        }
    }
}
