//! CLI binary for qrstamp.
//!
//! A thin shim over the `stamp` crate: flags map onto `StampConfig` and
//! `PlacementBox`, results go to stdout or a file, and failures are printed
//! to stderr as `{"kind": ..., "message": ...}` with exit code 2.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stamp::{
    document_info, generate, preview_symbol, DocumentInfo, GenerateRequest, PlacementBox,
    RenderMode, StampConfig, StampError,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stamp a QR code onto every page of a PDF, one table row per page.
#[derive(Parser, Debug)]
#[command(
    name = "qrstamp",
    version,
    about = "Stamp a QR code onto every page of a PDF, one table row per page",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging.
    #[arg(short, long, global = true, env = "QRSTAMP_VERBOSE")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, env = "QRSTAMP_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce the stamped PDF.
    Generate(GenerateArgs),

    /// List the table's column names as JSON.
    Headers {
        /// Delimited table file, header row first.
        #[arg(long)]
        csv: PathBuf,
    },

    /// Print page 1 size and page count as JSON.
    Info {
        /// Source PDF file.
        #[arg(long)]
        pdf: PathBuf,

        #[command(flatten)]
        placement: PlacementArgs,
    },

    /// Render the symbol for one page as a PNG at four times the box size.
    PreviewSymbol {
        /// Delimited table file, header row first.
        #[arg(long)]
        csv: PathBuf,

        /// Header name of the payload column.
        #[arg(long)]
        column: String,

        /// Page number, starting at 1.
        #[arg(long)]
        page: usize,

        /// Box size in points.
        #[arg(long, env = "QRSTAMP_SIZE", default_value = "80")]
        size: String,

        /// Where to write the PNG.
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Source PDF file.
    #[arg(long)]
    pdf: PathBuf,

    /// Delimited table file, header row first.
    #[arg(long)]
    csv: PathBuf,

    /// Header name of the payload column.
    #[arg(long)]
    column: String,

    #[command(flatten)]
    placement: PlacementArgs,

    /// Write the PDF to this file instead of stdout.
    #[arg(short, long, env = "QRSTAMP_OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,
}

/// Placement box in points, origin at the page's lower-left corner.
#[derive(Args, Debug)]
struct PlacementArgs {
    /// Box size in points.
    #[arg(long, env = "QRSTAMP_SIZE", default_value = "80")]
    size: String,

    /// Distance of the box from the left edge, in points.
    #[arg(long, env = "QRSTAMP_X", default_value = "36")]
    x: String,

    /// Distance of the box from the bottom edge, in points.
    #[arg(long, env = "QRSTAMP_Y", default_value = "36")]
    y: String,
}

impl PlacementArgs {
    fn to_placement(&self) -> stamp::Result<PlacementBox> {
        PlacementBox::parse(&self.size, &self.x, &self.y)
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Symbol drawing mode: vector or raster.
    #[arg(long, env = "QRSTAMP_RENDER_MODE", default_value = "vector")]
    mode: String,

    /// Worker threads for building overlays (default: available cores).
    #[arg(long, env = "QRSTAMP_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Raster symbol resolution (72-1200).
    #[arg(long, env = "QRSTAMP_RASTER_DPI", default_value_t = 300)]
    raster_dpi: u32,

    /// Raster oversampling factor before downsampling (1-16).
    #[arg(long, env = "QRSTAMP_OVERSAMPLE", default_value_t = 4)]
    oversample: u32,

    /// Light modules around raster symbols (0-8).
    #[arg(long, env = "QRSTAMP_QUIET_ZONE", default_value_t = 1)]
    quiet_zone: u32,

    /// Leave new streams uncompressed.
    #[arg(long, env = "QRSTAMP_NO_COMPRESS")]
    no_compress: bool,
}

impl RenderArgs {
    fn to_config(&self) -> stamp::Result<StampConfig> {
        let mut builder = StampConfig::builder()
            .render_mode(self.mode.parse::<RenderMode>()?)
            .raster_dpi(self.raster_dpi)
            .oversample(self.oversample)
            .quiet_zone(self.quiet_zone)
            .compress(!self.no_compress);
        if let Some(n) = self.concurrency {
            builder = builder.concurrency(n);
        }
        builder.build()
    }
}

#[derive(Serialize)]
struct HeadersOutput {
    headers: Vec<String>,
}

#[derive(Serialize)]
struct InfoOutput {
    #[serde(flatten)]
    document: DocumentInfo,
    placement: PlacementOutput,
}

#[derive(Serialize)]
struct PlacementOutput {
    size: f64,
    x: f64,
    y: f64,
    /// Box top edge measured down from the page's top edge, for canvas previews
    top_left_y: f64,
}

#[derive(Serialize)]
struct EmptyPreview {
    page: usize,
    empty: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        let report = match err.downcast_ref::<StampError>() {
            Some(stamp_err) => serde_json::json!(stamp_err.report()),
            None => serde_json::json!({ "kind": "io_error", "message": format!("{err:#}") }),
        };
        eprintln!("{report}");
        std::process::exit(2);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => {
            let document = read(&args.pdf)?;
            let table = read(&args.csv)?;
            let request = GenerateRequest {
                document: &document,
                table: &table,
                column: &args.column,
                placement: args.placement.to_placement()?,
            };
            let output = generate(&request, &args.render.to_config()?)?;
            write_output(args.output.as_deref(), &output)?;
            info!(bytes = output.len(), "wrote stamped document");
        }
        Command::Headers { csv } => {
            let headers = tabular::headers(&read(&csv)?).map_err(StampError::from)?;
            print_json(&HeadersOutput { headers })?;
        }
        Command::Info { pdf, placement } => {
            let document = document_info(&read(&pdf)?)?;
            let placement = placement.to_placement()?;
            print_json(&InfoOutput {
                document,
                placement: PlacementOutput {
                    size: placement.size(),
                    x: placement.x(),
                    y: placement.y(),
                    top_left_y: placement.top_left_y(document.height),
                },
            })?;
        }
        Command::PreviewSymbol {
            csv,
            column,
            page,
            size,
            output,
            render,
        } => {
            let size = PlacementBox::parse(&size, "0", "0")?.size();
            match preview_symbol(&read(&csv)?, &column, page, size, &render.to_config()?)? {
                Some(png) => write_output(Some(&output), &png)?,
                None => print_json(&EmptyPreview { page, empty: true })?,
            }
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
