use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use clickflow_core::render::{RenderConfig, write_dot};
use clickflow_core::report::{OutputFormat, RunSummary, generate_graph_dump, generate_json_report};
use clickflow_core::{Graph, RESERVED_NODE_COUNT};
use clickflow_logs::reader::DEFAULT_STRIP_PREFIX;
use clickflow_logs::{LogReader, VisitEvent, to_sessions};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use url::Url;

use crate::commands::{DEFAULT_INPUT_FILENAME, DEFAULT_LIMIT};

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    /// Screens to keep, not counting `start`/`end`.
    pub limit: usize,
    pub strip_prefix: String,
    pub format: OutputFormat,
    pub render: RenderConfig,
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILENAME),
            limit: DEFAULT_LIMIT,
            strip_prefix: DEFAULT_STRIP_PREFIX.to_string(),
            format: OutputFormat::Dot,
            render: RenderConfig::default(),
            quiet: false,
        }
    }
}

impl RunOptions {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let mut options = RunOptions::default();

        if let Some(input) = args.get_one::<String>("input-filename") {
            options.input = expand_path(input);
        }
        if let Some(limit) = args.get_one::<usize>("limit") {
            options.limit = *limit;
        }
        if let Some(prefix) = args.get_one::<String>("strip-prefix") {
            options.strip_prefix = prefix.clone();
        }
        if let Some(format) = args.get_one::<String>("format") {
            options.format = OutputFormat::from_str(format)
                .ok_or_else(|| anyhow!("Unknown output format '{}'", format))?;
        }

        // Flags override whatever the bands file says.
        if let Some(bands) = args.get_one::<PathBuf>("bands") {
            options.render = RenderConfig::from_json_file(bands)
                .with_context(|| format!("Error reading bands file {}", bands.display()))?;
        }
        if let Some(link_base) = args.get_one::<Url>("link-base") {
            options.render.link_base = link_base.as_str().to_string();
        }
        if let Some(subject) = args.get_one::<String>("subject") {
            options.render.subject = subject.clone();
        }

        options.quiet = args.get_flag("quiet");
        Ok(options)
    }
}

/// Expands a leading `~` in a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

pub fn verbosity_level(occurrences: u8) -> Level {
    match occurrences {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_tracing(occurrences: u8) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(verbosity_level(occurrences))
        .init();
}

/// Reads every visit from `path`, aborting on the first malformed record.
pub fn load_visits(path: &Path, strip_prefix: &str, show_progress: bool) -> Result<Vec<VisitEvent>> {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("Invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Reading {}", path.display()));
        pb
    } else {
        ProgressBar::hidden()
    };

    let pb_clone = spinner.clone();
    let reader = LogReader::new()
        .with_strip_prefix(strip_prefix)
        .with_progress_callback(Arc::new(move |count: usize| {
            pb_clone.set_message(format!("Reading... {} visits", count));
        }));

    let result = reader
        .read_path(path)
        .with_context(|| format!("Error reading file {}", path.display()));
    spinner.finish_and_clear();
    result
}

/// Runs the whole pipeline: read, sessionize, build, reduce, render.
/// The graph goes to `out`, diagnostics to `diag`.
pub fn run<W: Write, E: Write>(options: &RunOptions, out: &mut W, diag: &mut E) -> Result<()> {
    let visits = load_visits(&options.input, &options.strip_prefix, !options.quiet)?;
    let visit_count = visits.len();

    let sessions = to_sessions(visits);
    info!("{} visits in {} sessions", visit_count, sessions.len());

    let graph = Graph::from_sessions(&sessions);
    let reduced = graph.reduce_to(options.limit.saturating_add(RESERVED_NODE_COUNT));
    let summary = RunSummary::new(visit_count, sessions.len(), &graph, &reduced);

    if !options.quiet {
        write!(diag, "{}", summary.to_text())?;
    }

    match options.format {
        OutputFormat::Dot => write_dot(out, &reduced, graph.total_click_count(), &options.render)?,
        OutputFormat::Json => {
            let json = generate_json_report(&reduced, graph.total_click_count())?;
            writeln!(out, "{}", json)?;
        }
    }
    out.flush()?;

    if !options.quiet {
        write!(
            diag,
            "{}",
            generate_graph_dump(&reduced, summary.fraction_represented)
        )?;
    }

    Ok(())
}

pub fn handle_render(args: &ArgMatches) -> Result<()> {
    let options = RunOptions::from_matches(args)?;

    if !options.quiet {
        eprintln!(
            "{} Input: {}",
            "→".blue(),
            options.input.display().to_string().bright_white()
        );
    }

    // stderr stays unlocked: the spinner's tick thread draws to it
    run(&options, &mut io::stdout().lock(), &mut io::stderr())?;

    if !options.quiet {
        eprintln!("{} Graph written", "✓".green().bold());
    }
    Ok(())
}
