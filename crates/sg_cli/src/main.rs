//! Scoutgate CLI
//!
//! CSV -> pipeline shell. This is the only crate that touches file
//! bytes: it decodes a CSV into the core's table contract, runs the
//! pipeline, and prints the structured result as JSON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sg_core::orchestrator::DEFAULT_ANALYSIS_TYPE;
use sg_core::{registry, Cell, Orchestrator, PipelineResult, Table};

#[derive(Parser)]
#[command(name = "sg")]
#[command(about = "Evidence-gated football analytics pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline on a CSV event table
    Analyze {
        /// Input CSV file path
        #[arg(long)]
        csv: PathBuf,

        /// Analysis type from the capability catalog
        #[arg(long, default_value = DEFAULT_ANALYSIS_TYPE)]
        analysis_type: String,

        /// Entity (player_id) to analyze
        #[arg(long, default_value = "entity")]
        entity: String,

        /// Extra run context as a JSON object, e.g. '{"has_spatial": true}'
        #[arg(long)]
        context: Option<String>,

        /// Capability catalog YAML (defaults to the embedded catalog)
        #[arg(long)]
        capabilities: Option<PathBuf>,

        /// Provider alias spec YAML (defaults to the embedded generic_csv spec)
        #[arg(long)]
        alias_spec: Option<PathBuf>,

        /// Print compact JSON instead of pretty-printed
        #[arg(long, default_value = "false")]
        compact: bool,
    },

    /// Print the JSON schema of the pipeline result contract
    Schema,

    /// Parse the registry artifacts and report what they declare
    CheckRegistries {
        /// Registry directory (defaults to the embedded artifacts)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            csv,
            analysis_type,
            entity,
            context,
            capabilities,
            alias_spec,
            compact,
        } => {
            let table = load_csv(&csv)
                .with_context(|| format!("failed to read CSV table from {}", csv.display()))?;
            let context = parse_context(context.as_deref())?;

            let catalog = match &capabilities {
                Some(path) => registry::load_capability_catalog(path),
                None => registry::embedded_capability_catalog().map(|c| c.clone()),
            };
            let spec = match &alias_spec {
                Some(path) => registry::load_alias_spec(path),
                None => registry::embedded_alias_spec().map(|s| s.clone()),
            };

            let orchestrator = Orchestrator::with_registries(catalog, spec);
            let result = orchestrator.execute(&analysis_type, Some(&table), &entity, &context);
            print_result(&result, compact)?;
        }

        Commands::Schema => {
            let schema = schemars::schema_for!(PipelineResult);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }

        Commands::CheckRegistries { dir } => {
            check_registries(dir.as_deref())?;
        }
    }

    Ok(())
}

/// Decode a CSV file into the core table contract. Empty and
/// whitespace-only fields become null cells; fields that parse as
/// numbers become numeric cells.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut table = Table::new(headers)?;

    for record in reader.records() {
        let record = record?;
        let cells = record.iter().map(decode_field).collect();
        table.push_row(cells)?;
    }
    Ok(table)
}

fn decode_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Cell::Null
    } else if let Ok(v) = trimmed.parse::<f64>() {
        Cell::Number(v)
    } else {
        Cell::Text(field.to_string())
    }
}

fn parse_context(raw: Option<&str>) -> Result<serde_json::Map<String, serde_json::Value>> {
    match raw {
        None => Ok(serde_json::Map::new()),
        Some(s) => {
            let value: serde_json::Value =
                serde_json::from_str(s).context("--context must be valid JSON")?;
            value
                .as_object()
                .cloned()
                .context("--context must be a JSON object")
        }
    }
}

fn print_result(result: &PipelineResult, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(result)?
    } else {
        serde_json::to_string_pretty(result)?
    };
    println!("{json}");
    Ok(())
}

fn check_registries(dir: Option<&Path>) -> Result<()> {
    let (catalog, spec) = match dir {
        Some(dir) => {
            println!("🔎 Checking registries in {}", dir.display());
            (
                registry::load_capability_catalog(&dir.join("capabilities.yaml")),
                registry::load_alias_spec(&dir.join("provider_generic_csv.yaml")),
            )
        }
        None => {
            println!("🔎 Checking embedded registries");
            (
                registry::embedded_capability_catalog().map(|c| c.clone()),
                registry::embedded_alias_spec().map(|s| s.clone()),
            )
        }
    };

    match &catalog {
        Ok(c) => {
            println!("✅ capability catalog: {} analyses", c.analyses.len());
            for (analysis, rule) in &c.analyses {
                println!(
                    "   {analysis}: hard={:?} soft={:?}",
                    rule.hard_requires, rule.soft_requires
                );
            }
        }
        Err(e) => println!("❌ capability catalog: {e}"),
    }

    match &spec {
        Ok(s) => {
            let required = s.columns.values().filter(|c| c.required).count();
            println!(
                "✅ alias spec '{}': {} canonical keys ({} required)",
                s.provider_id,
                s.columns.len(),
                required
            );
        }
        Err(e) => println!("❌ alias spec: {e}"),
    }

    if catalog.is_err() || spec.is_err() {
        anyhow::bail!("registry check failed");
    }
    Ok(())
}
