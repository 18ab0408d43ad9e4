//! revsweep - prune superseded versioned files and legacy folders.
//!
//! Usage:
//!   revsweep ROOT                      Delete all but the 5 newest versions
//!   revsweep ROOT -v 3 -a /mnt/arc     Keep 3, archive the rest (zipped)
//!   revsweep ROOT -l --dry-run         Also report `_old` folders, touch nothing
//!   revsweep --help                    Show help

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use revsweep_core::normalize_extension;
use revsweep_engine::{
    ArchiveFormat, CleanupPlan, ExecutionReport, LegacySizing, SweepConfig, SweepError,
    SweepOutcome, SweepProfile, SweepReport, Sweeper, VersionPattern,
};

#[derive(Parser)]
#[command(
    name = "revsweep",
    version,
    about = "Prune superseded versioned files and legacy folders",
    long_about = "revsweep keeps the newest N versions of every versioned file \
                  (e.g. scene_v007.blend) per directory and extension, and deletes \
                  or archives the rest.\n\n\
                  Groups containing a file whose version cannot be read are left \
                  alone. With --legacy, folders named like `*_old*` are removed as \
                  a whole."
)]
struct Cli {
    /// Directory to clean
    root: PathBuf,

    /// Versions kept per directory and extension [default: 5]
    #[arg(short = 'v', long)]
    versions: Option<usize>,

    /// Tracked extensions, comma separated [default: blend,blend1,blend2,blend3]
    #[arg(short, long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Regex extracting the version from a file name [default: _v[0-9][0-9][0-9]]
    #[arg(short, long)]
    pattern: Option<String>,

    /// Archive old items under this directory instead of deleting them
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Keep the archive folder uncompressed
    #[arg(short = 'n', long)]
    no_compress: bool,

    /// Container format of the compressed archive [default: zip]
    #[arg(short, long)]
    format: Option<Format>,

    /// Remove folders whose name contains a legacy pattern
    #[arg(short, long)]
    legacy: bool,

    /// Legacy folder name patterns, comma separated [default: _old]
    #[arg(long, value_delimiter = ',')]
    legacy_pattern: Option<Vec<String>>,

    /// Size legacy folders recursively instead of their top level only
    #[arg(long)]
    deep_size: bool,

    /// Send deleted items to the system trash
    #[arg(long)]
    trash: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Report what would happen without touching anything
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging and per-item listing
    #[arg(short, long)]
    debug: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// TOML profile supplying defaults for the options above
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Zip,
    TarGz,
    TarXz,
    TarBz2,
}

impl From<Format> for ArchiveFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Zip => ArchiveFormat::Zip,
            Format::TarGz => ArchiveFormat::TarGz,
            Format::TarXz => ArchiveFormat::TarXz,
            Format::TarBz2 => ArchiveFormat::TarBz2,
        }
    }
}

/// Exit status for invalid input. clap uses the same code for usage errors.
const EXIT_INVALID_INPUT: u8 = 2;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return Ok(ExitCode::from(EXIT_INVALID_INPUT));
        }
    };
    debug!(?config, "configuration");

    let out = Output {
        json: cli.json,
        verbose: cli.debug,
    };
    let sweeper = Sweeper::new(config);

    let result = sweeper.run_with(|plan| {
        out.plan(plan);
        cli.yes || out.confirm()
    });

    match result {
        Ok(report) => {
            out.report(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_invalid_input() => {
            eprintln!("error: {err}");
            Ok(ExitCode::from(EXIT_INVALID_INPUT))
        }
        Err(err) => {
            if let Some(done) = err.completed() {
                out.line("Stopped after a failure:");
                out.execution(done);
            }
            Err(err).context("Sweep failed")
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` when set.
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .init();
}

/// Merge the command line over the profile over the built-in defaults.
fn build_config(cli: &Cli) -> Result<SweepConfig, SweepError> {
    if !cli.root.is_dir() {
        return Err(SweepError::NotADirectory {
            path: cli.root.clone(),
        });
    }

    let profile = match &cli.config {
        Some(path) => SweepProfile::load(path)?,
        None => SweepProfile::default(),
    };

    let mut builder = SweepConfig::builder();
    builder
        .root(cli.root.clone())
        .dry_run(cli.dry_run)
        .legacy(cli.legacy || profile.legacy.unwrap_or(false))
        .use_trash(cli.trash || profile.trash.unwrap_or(false))
        .compress(!cli.no_compress && profile.compress.unwrap_or(true))
        .follow_symlinks(profile.follow_symlinks.unwrap_or(false));

    if let Some(keep) = cli.versions.or(profile.versions) {
        builder.keep(keep);
    }
    if let Some(extensions) = cli.extensions.clone().or(profile.extensions) {
        builder.extensions(normalize_extensions(&extensions));
    }
    if let Some(pattern) = cli.pattern.as_ref().or(profile.pattern.as_ref()) {
        builder.version_pattern(VersionPattern::new(pattern)?);
    }
    if let Some(archive) = cli.archive.clone().or(profile.archive) {
        builder.archive_root(archive);
    }
    if let Some(format) = cli.format.map(ArchiveFormat::from).or(profile.format) {
        builder.archive_format(format);
    }
    if let Some(patterns) = cli.legacy_pattern.clone().or(profile.legacy_patterns) {
        builder.legacy_patterns(patterns);
    }
    if cli.deep_size {
        builder.legacy_sizing(LegacySizing::Recursive);
    } else if let Some(sizing) = profile.legacy_sizing {
        builder.legacy_sizing(sizing);
    }

    Ok(builder.build()?)
}

/// Dot every extension and drop repeats, keeping the first occurrence.
fn normalize_extensions(raw: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(raw.len());
    for ext in raw.iter().map(|e| normalize_extension(e)) {
        if !seen.contains(&ext) {
            seen.push(ext);
        }
    }
    seen
}

/// Human output goes to stdout, or to stderr when stdout carries JSON.
struct Output {
    json: bool,
    verbose: bool,
}

impl Output {
    fn line(&self, text: impl Display) {
        if self.json {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }

    /// Summary shown before anything is touched.
    fn plan(&self, plan: &CleanupPlan) {
        if self.verbose {
            for file in &plan.files {
                self.line(format!("  {} ({})", file.path.display(), format_size(file.size)));
            }
            for dir in &plan.directories {
                self.line(format!(
                    "  {}/ ({}, {} files)",
                    dir.path.display(),
                    format_size(dir.size),
                    dir.file_count
                ));
            }
        }

        self.line(format!(
            "Found {} old file(s) ({}) and {} legacy folder(s) ({})",
            plan.file_count(),
            format_size(plan.file_bytes()),
            plan.dir_count(),
            format_size(plan.dir_bytes())
        ));
        self.line(format!("Total: {} to free", format_size(plan.total_bytes())));
        self.skipped(plan);

        if !plan.warnings.is_empty() {
            self.line(format!("{} warning(s) during scan", plan.warnings.len()));
        }
    }

    fn skipped(&self, plan: &CleanupPlan) {
        if plan.skipped.is_empty() {
            return;
        }
        self.line(format!(
            "Skipped {} group(s) with unversioned files:",
            plan.skipped.len()
        ));
        for group in &plan.skipped {
            self.line(format!(
                "  {} [{}]: {} unversioned",
                group.directory.display(),
                group.extension,
                group.unversioned.len()
            ));
        }
    }

    /// Ask on the terminal. Anything but y/yes declines.
    fn confirm(&self) -> bool {
        let mut stderr = io::stderr();
        let mut stdout = io::stdout();
        let prompt: &mut dyn Write = if self.json { &mut stderr } else { &mut stdout };
        if writeln!(prompt, "Are you sure ? Type yes/y to start").is_err() || prompt.flush().is_err()
        {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }

    fn execution(&self, report: &ExecutionReport) {
        if self.verbose {
            for item in &report.items {
                self.line(format!("  {item}"));
            }
        }

        let prefix = if report.dry_run { "Would free" } else { "Freed" };
        self.line(format!(
            "{prefix} {} ({} file(s), {} folder(s))",
            format_size(report.bytes_freed),
            report.files_removed,
            report.dirs_removed
        ));

        if let Some(archive) = &report.archive {
            let path = archive.container.as_ref().unwrap_or(&archive.folder);
            let verb = if report.dry_run { "Would archive to" } else { "Archived to" };
            self.line(format!("{verb} {}", path.display()));
        }
    }

    /// Summary after the run, and the JSON report when asked for.
    fn report(&self, report: &SweepReport) -> Result<()> {
        match &report.outcome {
            SweepOutcome::NothingToDo => {
                self.line("Nothing to clean.");
                self.skipped(&report.plan);
            }
            SweepOutcome::Declined => self.line("Aborted, nothing was changed."),
            SweepOutcome::Completed(execution) => {
                if execution.dry_run {
                    self.plan(&report.plan);
                    self.line("Dry run, nothing was changed.");
                }
                self.execution(execution);
            }
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(report).context("Failed to encode report")?
            );
        }
        Ok(())
    }
}

/// Format size with decimal units.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::DECIMAL)
}
