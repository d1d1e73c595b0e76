use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use darbind_codegen::dalf_path::output_basename;
use darbind_codegen::{JsonFiller, Planner, TemplateData, TemplateFiller};
use darbind_core::{ExternalPackage, ExternalPackages};
use darbind_parser::{read_manifest, DarReader};

/// Generate ledger bindings from a DAR archive.
///
/// Extracts the DAML definitions of every package in the archive and writes
/// one template-input file per package, ready for a host-language template.
#[derive(Parser)]
#[command(name = "darbind")]
#[command(about = "Generate ledger bindings from a DAR archive", long_about = None)]
#[command(
    after_help = "Examples:\n  darbind --dar ./contracts.dar --output ./generated --package contracts\n  \
                  darbind --dar ./contracts.dar --output ./generated --package contracts --debug"
)]
struct Cli {
    /// Path to the DAR file
    #[arg(long)]
    dar: PathBuf,

    /// Output directory for generated files
    #[arg(long)]
    output: PathBuf,

    /// Target package identifier passed through to the emitter
    #[arg(long)]
    package: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Emit wire-codec methods for generated types
    #[arg(long = "hex-encoder")]
    hex_encoder: bool,

    /// JSON file mapping package IDs to {"import", "alias"} pairs
    #[arg(long = "external-packages")]
    external_packages: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug)
        .init();

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let external_packages = match &cli.external_packages {
        Some(path) => load_external_packages(path)?,
        None => ExternalPackages::default(),
    };

    let dar_content = fs::read(&cli.dar)
        .with_context(|| format!("failed to read dar file {:?}", cli.dar))?;
    let mut dar = DarReader::new(dar_content).context("failed to open dar archive")?;

    let manifest = read_manifest(&mut dar).context("failed to parse manifest")?;

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create output directory {:?}", cli.output))?;

    let mut planner = Planner::new(&mut dar, &manifest, external_packages);
    let packages = planner.run()?;

    let mut filler = JsonFiller::new();
    for (dalf, package) in &packages {
        let data = TemplateData::assemble(&cli.package, package, cli.hex_encoder);
        let code = filler.fill(&data)?;

        let output_file = cli.output.join(format!("{}.json", output_basename(dalf)));
        fs::write(&output_file, code)
            .with_context(|| format!("failed to write file {:?}", output_file))?;

        info!("successfully generated: {}", output_file.display());
    }

    Ok(())
}

fn load_external_packages(path: &PathBuf) -> Result<ExternalPackages> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read external packages file {path:?}"))?;
    let packages: BTreeMap<String, ExternalPackage> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse external packages file {path:?}"))?;
    Ok(ExternalPackages { packages })
}
