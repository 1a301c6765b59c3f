use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use proxyforge::{
    config::{loader::load_input, validation::PropertiesValidator},
    emit, tracing_setup,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Commands,

    /// Emit logs as JSON instead of human-readable output
    #[clap(long, global = true)]
    json_logs: bool,

    /// Log level filter (e.g. "info", "debug", "proxyforge=trace")
    #[clap(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Validate an input document and exit
    Validate {
        /// Input document to validate
        #[clap(short, long)]
        input: String,
    },
    /// Render all artifacts into an output directory
    Render {
        /// Input document to render
        #[clap(short, long)]
        input: String,

        /// Directory the artifacts are written to
        #[clap(short, long, default_value = "out")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    tracing_setup::init_tracing_with_config(&args.log_level, args.json_logs)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    match args.command {
        Commands::Validate { input } => validate_command(&input),
        Commands::Render { input, output } => render_command(&input, &output),
    }
}

/// Validate an input document and exit
fn validate_command(input_path: &str) -> Result<()> {
    println!("🔍 Validating input document: {input_path}");

    if !Path::new(input_path).exists() {
        eprintln!("❌ Error: Input document '{input_path}' not found");
        std::process::exit(1);
    }

    let input = match load_input(input_path) {
        Ok(input) => {
            println!("✅ Input parsing: OK");
            input
        }
        Err(e) => {
            eprintln!("❌ Input parsing failed:");
            eprintln!("   {e}");
            std::process::exit(1);
        }
    };

    match PropertiesValidator::validate(&input.ha_proxy) {
        Ok(()) => {
            println!("✅ Input validation: OK");
            println!();
            println!("📋 Input Summary:");
            println!("   • Backend servers: {}", input.ha_proxy.backend_servers.len());
            println!("   • Routed backends: {}", input.ha_proxy.routed_backend_servers.len());
            println!("   • TCP backends: {}", input.ha_proxy.tcp.len());
            println!("   • TLS material: {}", input.ha_proxy.ssl_pem.is_some() || input.ha_proxy.crt_list.is_some());
            println!();
            println!("🎉 Input is valid and ready to render!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Input validation failed:");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Render every artifact for an input document into the output directory
fn render_command(input_path: &str, output: &Path) -> Result<()> {
    let span = tracing_setup::create_render_span(input_path, &output.display().to_string());
    let _guard = span.enter();

    let input = load_input(input_path)
        .with_context(|| format!("Failed to load input from {input_path}"))?;

    PropertiesValidator::validate(&input.ha_proxy)
        .map_err(|e| eyre!("{e}"))
        .context("Input validation failed")?;

    let artifacts = emit::render_all(&input.ha_proxy, &input.links, &input.az);
    span.record("artifacts", artifacts.len());

    emit::write_to_dir(&artifacts, output)
        .with_context(|| format!("Failed to write artifacts to {}", output.display()))?;

    tracing::info!(
        count = artifacts.len(),
        output = %output.display(),
        "render complete"
    );
    println!("✅ Wrote {} artifacts to {}", artifacts.len(), output.display());
    Ok(())
}
