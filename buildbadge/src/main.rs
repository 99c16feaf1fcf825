// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the buildbadge binary.
//!
//! The CLI renders single badges through the same route handler a server
//! would use, renders every builder of a status snapshot in one go, and
//! lists the available badge styles.

use std::{
    fs, io,
    io::Write,
    path::{Path, PathBuf},
    process,
    sync::Arc
};

use buildbadge::{
    BadgeFormat, BadgeOptions, BadgeRenderer, BadgeService, Error, FileStatusStore, RasterOptions,
    RequestOverrides, RetryingSource, TemplateSet, badge_io_error, load_options, render_all
};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Command line interface for rendering build status badges.
#[derive(Debug, Parser)]
#[command(name = "buildbadge", version, about = "Render build status badges")]
struct Cli {
    #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
/// Supported commands exposed by the CLI.
enum Command {
    /// Render one badge for a route such as `nightly.svg`.
    Render(RenderArgs),
    /// Render a badge for every builder of a status snapshot.
    Batch(BatchArgs),
    /// List the available badge templates.
    Styles(StylesArgs)
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Badge route, `<builder>.svg` or `<builder>.png`.
    #[arg(value_name = "PATH")]
    path: String,

    /// Query string with badge option overrides.
    #[arg(long = "query", value_name = "QUERY", default_value = "")]
    query: String,

    /// YAML snapshot of builders and builds.
    #[arg(long = "status", value_name = "FILE", env = "BUILDBADGE_STATUS")]
    status: Option<PathBuf>,

    /// YAML file with deployment badge options.
    #[arg(long = "config", value_name = "FILE", env = "BUILDBADGE_CONFIG")]
    config: Option<PathBuf>,

    /// Output file; the badge is written to stdout when omitted.
    #[arg(long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Raster scale applied to PNG output.
    #[arg(long = "scale", value_name = "FACTOR", default_value_t = 1.0)]
    scale: f32
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// YAML snapshot of builders and builds.
    #[arg(long = "status", value_name = "FILE", env = "BUILDBADGE_STATUS")]
    status: PathBuf,

    /// YAML file with deployment badge options.
    #[arg(long = "config", value_name = "FILE", env = "BUILDBADGE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory that will receive the badges and the manifest.
    #[arg(long = "output", value_name = "DIR", default_value = "badges")]
    output: PathBuf,

    /// Badge format, `svg` or `png`.
    #[arg(long = "format", value_name = "FORMAT", default_value = "svg")]
    format: BadgeFormat,

    /// Query string with badge option overrides applied to every badge.
    #[arg(long = "query", value_name = "QUERY", default_value = "")]
    query: String
}

#[derive(Debug, Args)]
struct StylesArgs {
    /// YAML file with deployment badge options.
    #[arg(long = "config", value_name = "FILE", env = "BUILDBADGE_CONFIG")]
    config: Option<PathBuf>
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main() {
    init_tracing();
    if let Err(error) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates configuration, lookup, rendering and output errors.
fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => run_render(args),
        Command::Batch(args) => run_batch(args),
        Command::Styles(args) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            run_styles(&args, &mut handle)
        }
    }
}

fn deployment_options(path: Option<&Path>) -> Result<BadgeOptions, Error> {
    match path {
        Some(path) => load_options(path),
        None => Ok(BadgeOptions::default())
    }
}

fn run_render(args: RenderArgs) -> Result<(), Error> {
    let options = deployment_options(args.config.as_deref())?;
    let store = match args.status.as_deref() {
        Some(path) => FileStatusStore::load(path)?,
        None => FileStatusStore::default()
    };
    let source = RetryingSource::new(store, options.retry.clone());

    let renderer = BadgeRenderer::from_options(options)?.with_raster_options(RasterOptions {
        scale: args.scale
    });
    let service = BadgeService::new(Arc::new(renderer), source);

    let path = route_path(&args.path);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|source| Error::render_backend(format!("failed to start runtime: {source}")))?;
    let response = runtime.block_on(service.render(&path, &args.query))?;

    match args.output.as_deref() {
        Some(output) => {
            fs::write(output, &response.body).map_err(|source| badge_io_error(output, source))?;
            info!(path = %output.display(), "badge written");
            Ok(())
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&response.body)
                .and_then(|()| handle.flush())
                .map_err(|source| badge_io_error(Path::new("<stdout>"), source))
        }
    }
}

/// Accepts routes with or without the leading slash.
fn route_path(path: &str) -> String {
    if path.starts_with('/') { path.to_owned() } else { format!("/{path}") }
}

fn run_batch(args: BatchArgs) -> Result<(), Error> {
    let options = deployment_options(args.config.as_deref())?;
    let store = FileStatusStore::load(&args.status)?;
    let renderer = BadgeRenderer::from_options(options)?;
    let config = renderer.resolve(&RequestOverrides::from_query(&args.query))?;

    let report = render_all(&renderer, &store, &config, args.format, &args.output)?;
    info!(
        count = report.artifacts.len(),
        manifest = %report.manifest_path.display(),
        "batch finished"
    );
    Ok(())
}

fn run_styles<W: io::Write>(args: &StylesArgs, writer: &mut W) -> Result<(), Error> {
    let options = deployment_options(args.config.as_deref())?;
    let mut templates = TemplateSet::builtin()?;
    if let Some(dir) = options.templates_dir.as_deref() {
        templates.load_dir(dir)?;
    }

    for name in templates.names() {
        writeln!(writer, "{name}").map_err(|source| badge_io_error(Path::new("<stdout>"), source))?;
    }
    Ok(())
}
