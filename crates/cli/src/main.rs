// ABOUTME: CLI binary that cleans a Squarespace export and localizes its CDN images.
// ABOUTME: Parses arguments, sets up tracing, runs one pipeline over the root and prints the report.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sitescrub_cli::{
    prepare_support_files, run_localize, run_sanitize, BatchOptions, RunReport,
    DEFAULT_STYLESHEET_URL,
};
use sitescrub_localize::{AssetFetcher, Rewriter, DEFAULT_IMAGES_DIR};
use sitescrub_sanitize::Sanitizer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sitescrub")]
#[command(about = "Strip vendor markup from an exported site and serve its images locally")]
struct Args {
    /// Site root to process
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Extension of the documents to process
    #[arg(long = "ext", global = true, default_value = "html")]
    extension: String,

    /// Report what would change without writing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print the run report as JSON instead of progress lines
    #[arg(long = "json", global = true)]
    json_output: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove vendor scripts and metadata line by line
    Clean {
        /// Do not download the stylesheet or write the mobile menu script
        #[arg(long)]
        skip_support_files: bool,

        /// Stylesheet downloaded to css/site.css
        #[arg(long, default_value = DEFAULT_STYLESHEET_URL)]
        stylesheet_url: String,
    },
    /// Download CDN images and point documents at the local copies
    Images {
        /// Image directory, relative to the root unless absolute
        #[arg(long, default_value = DEFAULT_IMAGES_DIR)]
        images_dir: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();
}

fn build_fetcher(images_dir: PathBuf) -> Result<AssetFetcher> {
    AssetFetcher::builder()
        .images_dir(images_dir)
        .build()
        .context("building HTTP client")
}

fn run(args: &Args, out: &mut dyn Write) -> Result<RunReport> {
    let opts = BatchOptions {
        extension: args.extension.clone(),
        dry_run: args.dry_run,
    };
    // Documents and assets must share an absolute base for relative links
    let root = fs::canonicalize(&args.root)
        .with_context(|| format!("cannot read root directory {}", args.root.display()))?;

    match &args.command {
        Command::Clean {
            skip_support_files,
            stylesheet_url,
        } => {
            if !args.dry_run && !skip_support_files {
                let mut fetcher = build_fetcher(root.join(DEFAULT_IMAGES_DIR))?;
                prepare_support_files(&root, &mut fetcher, stylesheet_url, out)?;
            }
            run_sanitize(&root, &Sanitizer::default(), &opts, out)
        }
        Command::Images { images_dir } => {
            let images_dir = resolve_under(&root, images_dir);
            let mut fetcher = build_fetcher(images_dir)?;
            run_localize(&root, &mut fetcher, &Rewriter::default(), &opts, out)
        }
    }
}

/// Absolute form of `path`, taken relative to `root` unless already absolute.
///
/// Existing directories are canonicalized so they compare equal to the
/// canonical root.
fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    fs::canonicalize(&joined).unwrap_or(joined)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let stdout = io::stdout();
    let mut progress: Box<dyn Write> = if args.json_output {
        Box::new(io::sink())
    } else {
        Box::new(stdout.lock())
    };

    let report = match run(&args, progress.as_mut()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(1);
        }
    };
    drop(progress);

    info!(
        scanned = report.documents_scanned,
        modified = report.documents_modified,
        failed = report.documents_failed,
        "run finished"
    );

    if args.json_output {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: serializing report: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        print!("{}", report);
    }

    ExitCode::SUCCESS
}
