// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DAGMC-Lite command line tool.
//!
//! Reads a discretized model file, builds the tagged DAGMC database with one
//! material per volume and writes it out, optionally running the external
//! watertightness repair over the result.
//!
//! ```text
//! dagmc-lite model.json --materials steel,vacuum -o dagmc.json --make-watertight
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dagmc_lite_geometry::DiscreteModel;
use dagmc_lite_processing::DagmcModel;
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "dagmc-lite")]
#[command(version, about = "Build DAGMC geometry databases from discretized models")]
struct Cli {
    /// Discretized model file (JSON).
    input: PathBuf,

    /// Material name per volume, in volume order.
    #[arg(short, long, value_delimiter = ',', required = true)]
    materials: Vec<String>,

    /// Output database file.
    #[arg(short, long, default_value = "dagmc.json")]
    output: PathBuf,

    /// Run the watertight repair after writing. Takes an optional path to the
    /// repair binary, otherwise `DAGMC_MAKE_WATERTIGHT` or `make_watertight`.
    #[arg(long, value_name = "BINARY", num_args = 0..=1)]
    make_watertight: Option<Option<PathBuf>>,

    /// Print the build summary as JSON on stdout.
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();

    run(cli, &config)
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    tracing::info!(
        input = %cli.input.display(),
        output = %cli.output.display(),
        materials = cli.materials.len(),
        "Starting DAGMC-Lite"
    );

    let model = DiscreteModel::read_file(&cli.input)
        .with_context(|| format!("failed to read model {}", cli.input.display()))?;

    let dagmc = DagmcModel::from_model(&model, &cli.materials)
        .context("failed to build DAGMC database")?;

    match cli.make_watertight {
        Some(binary) => {
            let binary = binary.unwrap_or_else(|| config.repair_binary.clone());
            dagmc
                .write_watertight(&cli.output, &binary)
                .with_context(|| format!("failed to write watertight {}", cli.output.display()))?;
        }
        None => dagmc
            .write(&cli.output)
            .with_context(|| format!("failed to write {}", cli.output.display()))?,
    }

    if cli.summary {
        if let Some(summary) = dagmc.summary() {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    }
    Ok(())
}
