//! # Labelsheet CLI
//!
//! Command-line interface for generating QR label sheets.
//!
//! ## Usage
//!
//! ```bash
//! # Prompt for credentials and identifiers
//! labelsheet
//!
//! # Everything on the command line
//! labelsheet --email me@lab.org --api-key KEY -o labels.pdf 12,15 42
//!
//! # Custom header and resolution, plus PNG previews
//! labelsheet --header "COLD ROOM" --dpi 300 --png-dir previews 12
//!
//! # Scripted: never prompt, fail on missing input
//! labelsheet --no-prompt --email me@lab.org --api-key KEY 12
//! ```

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use labelsheet::{
    LabelError,
    collect::{self, CollectedInput, Prefill},
    label::LabelConfig,
    pipeline::{self, RunReport},
    render::Composer,
    report,
    resolve::{LabstepClient, labstep::DEFAULT_API_URL},
    sheet::{PngPreview, SheetWriter},
};

/// Labelsheet - printable 2x2 inch QR labels for Labstep records
#[derive(Parser, Debug)]
#[command(name = "labelsheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Resource or item IDs; comma-separated lists are accepted
    ids: Vec<String>,

    /// Labstep account email (prompted if missing)
    #[arg(long)]
    email: Option<String>,

    /// Labstep API key (prompted if missing)
    #[arg(long)]
    api_key: Option<String>,

    /// Output PDF path
    #[arg(short, long, value_name = "FILE", default_value = "labels.pdf")]
    output: PathBuf,

    /// Label configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raster resolution in dots per inch
    #[arg(long)]
    dpi: Option<u32>,

    /// Gap between QR code and name line, in pixels
    #[arg(long)]
    padding: Option<u32>,

    /// Header text above the QR code
    #[arg(long)]
    header: Option<String>,

    /// Labstep API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Also save every label as a PNG in this directory
    #[arg(long, value_name = "DIR")]
    png_dir: Option<PathBuf>,

    /// Never prompt; fail on missing input and skip the retry question
    #[arg(long)]
    no_prompt: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("labelsheet={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), LabelError> {
    let config = load_config(&cli)?;
    let interactive = !cli.no_prompt && io::stdin().is_terminal();
    let composer = Composer::new(config.clone());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let cli_ids: Vec<u64> = cli.ids.iter().flat_map(|arg| collect::parse_ids(arg)).collect();
    let mut prefill = Prefill {
        email: cli.email.clone(),
        api_key: cli.api_key.clone(),
        ids: collect::dedup_ids(cli_ids),
    };
    let mut first_attempt = true;

    loop {
        let complete = CollectedInput::new(
            prefill.email.as_deref().unwrap_or_default(),
            prefill.api_key.as_deref().unwrap_or_default(),
            prefill.ids.clone(),
        );
        let collected = match complete {
            Ok(collected) if first_attempt => collected,
            _ if interactive => collect::collect_interactive(&mut input, &mut output, &prefill)?,
            Ok(collected) => collected,
            Err(e) => return Err(e),
        };
        first_attempt = false;

        let (client, collected) =
            authenticate(&cli.api_url, collected, interactive, &mut input, &mut output).await?;

        let report = write_sheet(&cli, &config, &composer, &client, &collected.ids).await?;

        if interactive && let Some(invalid) = report::invalid_summary(&report) {
            println!("{}", invalid);
            if collect::confirm(
                &mut input,
                &mut output,
                "Do you want to go back and correct them?",
            )? {
                prefill = collected.retry_prefill(&report.invalid_ids);
                continue;
            }
            let shown = RunReport {
                invalid_ids: Vec::new(),
                ..report
            };
            println!("{}", report::summary(&shown, &cli.output));
            return Ok(());
        }

        println!("{}", report::summary(&report, &cli.output));
        return Ok(());
    }
}

/// Defaults, then the config file, then individual flags.
fn load_config(cli: &Cli) -> Result<LabelConfig, LabelError> {
    let mut config = match &cli.config {
        Some(path) => LabelConfig::from_json_file(path)?,
        None => LabelConfig::default(),
    };
    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }
    if let Some(padding) = cli.padding {
        config.padding = padding;
    }
    if let Some(header) = &cli.header {
        config.header_text = header.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Log in, re-asking for credentials on failure while interactive.
async fn authenticate<R: BufRead, W: Write>(
    api_url: &str,
    mut collected: CollectedInput,
    interactive: bool,
    input: &mut R,
    output: &mut W,
) -> Result<(LabstepClient, CollectedInput), LabelError> {
    loop {
        match LabstepClient::authenticate(api_url, &collected.email, &collected.api_key).await {
            Ok(client) => return Ok((client, collected)),
            Err(e) if interactive => {
                eprintln!("{}\nPlease check your credentials.", e);
                collected = collect::recollect_credentials(input, output, &collected)?;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run the pipeline into a fresh sheet and save it.
async fn write_sheet(
    cli: &Cli,
    config: &LabelConfig,
    composer: &Composer,
    client: &LabstepClient,
    ids: &[u64],
) -> Result<RunReport, LabelError> {
    let mut sheet = SheetWriter::new(config.page_size_pt());

    let report = match &cli.png_dir {
        Some(dir) => {
            let mut preview = PngPreview::new(&mut sheet, dir)?;
            pipeline::generate_sheet(ids, client, composer, &mut preview).await?
        }
        None => pipeline::generate_sheet(ids, client, composer, &mut sheet).await?,
    };

    sheet.save(&cli.output)?;
    Ok(report)
}
