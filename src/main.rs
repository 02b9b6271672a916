use std::path::PathBuf;
use std::process;

use clap::Parser;
use packet_id_gen::codegen;
use packet_id_gen::error::{Error, Result};
use packet_id_gen::schema;
use serde_json::Value;
use tracing::Level;

/// Generate Minecraft packet ID constants.
///
/// Downloads the PrismarineJS protocol.json schema and writes one Rust
/// constant per packet, grouped by phase and direction.
#[derive(Parser)]
#[command(name = "packet-id-gen", version, about)]
struct Cli {
    /// URL of the protocol.json schema.
    #[arg(long, default_value = schema::PROTOCOL_URL)]
    url: String,

    /// Read the schema from a local file instead of downloading it.
    #[arg(long, conflicts_with = "url")]
    schema: Option<PathBuf>,

    /// Path of the generated Rust file.
    #[arg(long, default_value = codegen::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Suppress non-error output.
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every resolved name collision.
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let doc = match &cli.schema {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading protocol schema");
            schema::load_protocol(path)?
        }
        None => fetch(&cli.url)?,
    };

    let stats = codegen::generate(&doc, &cli.output)?;
    tracing::info!(
        login = stats.login_packets,
        play = stats.play_packets,
        status = stats.status_packets,
        collisions = stats.collisions_resolved,
        width = stats.name_width,
        "done"
    );
    Ok(())
}

#[cfg(feature = "download")]
fn fetch(url: &str) -> Result<Value> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;
    rt.block_on(schema::fetch_protocol(url))
}

#[cfg(not(feature = "download"))]
fn fetch(url: &str) -> Result<Value> {
    Err(Error::Fetch {
        url: url.to_string(),
        reason: "built without the `download` feature; pass --schema".to_string(),
    })
}
