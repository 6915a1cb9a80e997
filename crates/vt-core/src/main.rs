//! Vet Triage Core - symptom assessment CLI
//!
//! The main entry point for vt-core, handling:
//! - Catalog discovery, validation and inspection
//! - Interactive and scripted symptom assessments
//! - Raw score classification
//! - Chat and vet finder hand-off payloads

use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use vt_common::error::format_error_human;
use vt_common::{OutputFormat, StructuredError};
use vt_core::config::{
    list_presets, load_catalog, CatalogSnapshot, ConfigError, ConfigOptions,
    PresetName, ResolvedCatalog,
};
use vt_core::exit_codes::ExitCode;
use vt_core::handoff::{
    offer_vet_finder, should_offer_vet_finder, ChatHandoff, ChatHandoffRequest, HandoffPolicy,
    VetFinder,
};
use vt_core::log_event;
use vt_core::logging::{
    event_names, generate_run_id, init_logging, verbosity_filter, LogConfig, LogContext, LogFormat,
    Stage,
};
use vt_core::render::{render_band, render_catalog, render_report, AssessmentReport, OUTPUT_SCHEMA_VERSION};
use vt_core::scoring::assess;
use vt_core::session::{AssessmentSession, DeferredSession};

/// Vet Triage Core - guided symptom checks for pets
#[derive(Parser)]
#[command(name = "vt-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to a catalog.json (skips catalog discovery)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Built-in species catalog to use when no catalog file is given (dog, cat)
    #[arg(long, global = true)]
    preset: Option<PresetName>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a symptom assessment (interactive unless --answer is given)
    Assess(AssessArgs),

    /// Print the risk band a raw score falls into
    Classify {
        /// Total severity score
        score: u32,
    },

    /// Inspect and validate catalogs
    Catalog(CatalogArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct AssessArgs {
    /// Answer as CATEGORY=OPTION, once per category
    #[arg(long = "answer", short = 'a', value_name = "CATEGORY=OPTION")]
    answers: Vec<String>,

    /// Attach the assessment summary to the chat hand-off
    #[arg(long)]
    share_context: bool,

    /// Pause after each interactive answer before the next question (ms)
    #[arg(long, default_value_t = 300)]
    advance_delay_ms: u64,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    #[command(subcommand)]
    command: CatalogCommands,
}

#[derive(Subcommand, Debug)]
enum CatalogCommands {
    /// Show the active catalog
    Show,

    /// Validate a catalog file (the active catalog if no path is given)
    Validate {
        path: Option<PathBuf>,
    },

    /// List built-in presets
    Presets,
}

/// Failures of an assessment run before a result exists.
enum RunError {
    Args(String),
    /// The user quit or closed stdin before the last answer.
    Cancelled(&'static str),
    Engine(vt_common::Error),
    Io(std::io::Error),
}

/// Hand-off collaborators for the CLI: payloads land in the printed report.
#[derive(Default)]
struct ReportHandoffs {
    chat: Option<ChatHandoffRequest>,
    vet_finder_opened: bool,
}

impl ChatHandoff for ReportHandoffs {
    fn open_chat(&mut self, request: ChatHandoffRequest) -> vt_common::Result<()> {
        self.chat = Some(request);
        Ok(())
    }
}

impl VetFinder for ReportHandoffs {
    fn open_vet_finder(&mut self) -> vt_common::Result<()> {
        self.vet_finder_opened = true;
        Ok(())
    }
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        verbosity_filter(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "vt-core started");

    let exit_code = match &cli.command {
        Commands::Assess(args) => run_assess(&cli.global, args, &ctx),
        Commands::Classify { score } => run_classify(&cli.global, *score, &ctx),
        Commands::Catalog(args) => match &args.command {
            CatalogCommands::Show => run_catalog_show(&cli.global, &ctx),
            CatalogCommands::Validate { path } => run_catalog_validate(&cli.global, path.as_ref(), &ctx),
            CatalogCommands::Presets => run_catalog_presets(&cli.global),
        },
        Commands::Version => print_version(&cli.global),
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Init,
        "vt-core finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Commands
// ============================================================================

fn run_assess(global: &GlobalOpts, args: &AssessArgs, ctx: &LogContext) -> ExitCode {
    let resolved = match load(global, ctx) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };

    let session = AssessmentSession::new(Arc::clone(&resolved.catalog));
    let ctx = ctx.clone().with_session_id(session.id().to_string());
    log_event!(ctx, DEBUG, event_names::SESSION_STARTED, Stage::Ask, "assessment started",
        interactive = args.answers.is_empty());

    let outcome = if args.answers.is_empty() {
        run_interactive(session, Duration::from_millis(args.advance_delay_ms))
    } else {
        answer_from_args(session, &args.answers)
    };
    let session = match outcome {
        Ok(session) => session,
        Err(e) => {
            if let RunError::Cancelled(reason) = &e {
                log_event!(ctx, INFO, event_names::SESSION_CANCELLED, Stage::Ask, *reason);
            }
            return report_run_error(global, e);
        }
    };

    let result = match assess(&session) {
        Ok(result) => result,
        Err(e) => return output_error(global, &e),
    };
    let policy = HandoffPolicy {
        share_assessment_context: args.share_context,
    };
    let band = result.band.to_string();
    log_event!(ctx, DEBUG, event_names::SCORE_COMPUTED, Stage::Score, "assessment scored",
        score = result.score, band = band.as_str());

    let mut handoffs = ReportHandoffs::default();
    let handed_off = ChatHandoffRequest::build(&session, policy)
        .and_then(|request| handoffs.open_chat(request))
        .and_then(|()| offer_vet_finder(&session, &mut handoffs));
    if let Err(e) = handed_off {
        return output_error(global, &e);
    }
    let Some(chat_handoff) = handoffs.chat else {
        return ExitCode::InternalError;
    };

    let report = AssessmentReport {
        vet_finder_offered: handoffs.vet_finder_opened,
        result,
        chat_handoff,
        catalog: resolved.snapshot,
    };

    match emit(render_report(&report, global.format)) {
        ExitCode::Clean if report.vet_finder_offered => ExitCode::ReferralAdvised,
        code => code,
    }
}

fn run_classify(global: &GlobalOpts, score: u32, ctx: &LogContext) -> ExitCode {
    let resolved = match load(global, ctx) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let catalog = &resolved.catalog;
    let band = catalog.classify(score);
    let refer = should_offer_vet_finder(catalog, band);
    emit(render_band(score, band, refer, global.format))
}

fn run_catalog_show(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    match load(global, ctx) {
        Ok(resolved) => emit(render_catalog(&resolved.catalog, &resolved.snapshot, global.format)),
        Err(code) => code,
    }
}

fn run_catalog_validate(global: &GlobalOpts, path: Option<&PathBuf>, ctx: &LogContext) -> ExitCode {
    let resolved = match path {
        Some(path) => {
            let options = ConfigOptions {
                catalog_path: Some(path.clone()),
                preset: None,
            };
            match load_catalog(&options) {
                Ok(resolved) => resolved,
                Err(e) => return output_config_error(global, &e),
            }
        }
        None => match load(global, ctx) {
            Ok(resolved) => resolved,
            Err(code) => return code,
        },
    };

    let snapshot = &resolved.snapshot;
    let lints: Vec<String> = resolved.lints.iter().map(|l| l.to_string()).collect();
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": OUTPUT_SCHEMA_VERSION,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "valid",
                "path": snapshot.path,
                "source": snapshot.source,
                "content_hash": snapshot.content_hash,
                "summary": snapshot.summary,
                "warnings": lints,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
        }
        OutputFormat::Summary => {
            println!(
                "catalog validate: OK ({}, {} warnings)",
                snapshot.summary.name,
                lints.len()
            );
        }
        OutputFormat::Md | OutputFormat::Prose => {
            println!("# Catalog Validation");
            println!();
            println!("Status: ✓ Valid");
            match &snapshot.path {
                Some(path) => println!("Catalog: {}", path),
                None => println!("Catalog: built-in preset ({})", snapshot.summary.name),
            }
            for lint in &lints {
                println!("Warning: {}", lint);
            }
        }
    }
    ExitCode::Clean
}

fn run_catalog_presets(global: &GlobalOpts) -> ExitCode {
    let presets = list_presets();
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": OUTPUT_SCHEMA_VERSION,
                "presets": presets,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
        }
        _ => {
            for preset in &presets {
                println!(
                    "{:<6} {} ({} questions, max score {})",
                    preset.name, preset.description, preset.category_count, preset.max_score
                );
            }
        }
    }
    ExitCode::Clean
}

fn print_version(global: &GlobalOpts) -> ExitCode {
    let version = env!("CARGO_PKG_VERSION");
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "version": version,
                "catalog_schema_version": vt_config::CATALOG_SCHEMA_VERSION,
                "output_schema_version": OUTPUT_SCHEMA_VERSION,
            });
            println!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
        }
        _ => println!("vt-core {}", version),
    }
    ExitCode::Clean
}

// ============================================================================
// Assessment drivers
// ============================================================================

/// Apply `CATEGORY=OPTION` answers in catalog order.
fn answer_from_args(
    mut session: AssessmentSession,
    raw: &[String],
) -> Result<AssessmentSession, RunError> {
    let catalog = Arc::clone(session.catalog());

    let mut chosen: HashMap<&str, &str> = HashMap::new();
    for item in raw {
        let (category, option) = item
            .split_once('=')
            .ok_or_else(|| RunError::Args(format!("expected CATEGORY=OPTION, got '{}'", item)))?;
        let (category, option) = (category.trim(), option.trim());
        if catalog.category(category).is_none() {
            return Err(RunError::Args(format!(
                "unknown category '{}' (expected one of: {})",
                category,
                catalog
                    .categories()
                    .iter()
                    .map(|c| c.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        if chosen.insert(category, option).is_some() {
            return Err(RunError::Args(format!(
                "category '{}' answered more than once",
                category
            )));
        }
    }

    for category in catalog.categories() {
        let Some(option) = chosen.get(category.id.as_str()) else {
            return Err(RunError::Args(format!(
                "missing answer for category '{}'",
                category.id
            )));
        };
        if category.option(option).is_none() {
            return Err(RunError::Args(format!(
                "unknown option '{}' for category '{}' (expected one of: {})",
                option,
                category.id,
                category
                    .options
                    .iter()
                    .map(|o| o.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        session
            .answer(category.id.as_str(), option)
            .map_err(RunError::Engine)?;
    }

    Ok(session)
}

/// Ask each question on stderr and read choices from stdin.
///
/// Numbers pick an option, `b` goes back, `r` restarts and `q` quits.
fn run_interactive(session: AssessmentSession, delay: Duration) -> Result<AssessmentSession, RunError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(RunError::Io)?;
    let mut lines = std::io::stdin().lock().lines();

    runtime.block_on(async move {
        let mut deferred = DeferredSession::with_delay(session, delay);
        loop {
            let screen = deferred
                .inspect(|s| {
                    s.current_category().cloned().map(|c| {
                        let previous = s.answer_for(c.id.as_str()).map(|a| a.option.clone());
                        (c, previous, s.progress(), s.can_go_back())
                    })
                })
                .await;
            let Some((category, previous, progress, can_go_back)) = screen else {
                break;
            };

            eprintln!();
            eprintln!(
                "[{}/{}] {}",
                progress.step + 1,
                progress.total,
                category.prompt.as_deref().unwrap_or(&category.label)
            );
            for (i, option) in category.options.iter().enumerate() {
                let marker = if previous.as_ref() == Some(&option.id) { " (current)" } else { "" };
                eprintln!("  {}. {}{}", i + 1, option.label, marker);
            }
            let back = if can_go_back { ", b = back" } else { "" };
            eprint!("Choose 1-{}{}, r = restart, q = quit > ", category.options.len(), back);

            let Some(line) = lines.next() else {
                return Err(RunError::Cancelled(
                    "input ended before the assessment was complete",
                ));
            };
            let line = line.map_err(RunError::Io)?;

            match line.trim() {
                "b" | "back" => deferred.go_back().await,
                "r" | "restart" => deferred.reset().await,
                "q" | "quit" => return Err(RunError::Cancelled("assessment cancelled")),
                choice => {
                    let picked = choice
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| category.options.get(i));
                    match picked {
                        Some(option) => {
                            deferred
                                .select_answer(category.id.as_str(), option.id.as_str())
                                .await
                                .map_err(RunError::Engine)?;
                            eprintln!("  ✓ {}", option.label);
                            deferred.settle().await;
                        }
                        None => eprintln!(
                            "  Please enter a number between 1 and {}.",
                            category.options.len()
                        ),
                    }
                }
            }
        }

        let session = deferred.inspect(|s| s.clone()).await;
        Ok::<_, RunError>(session)
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn load(global: &GlobalOpts, ctx: &LogContext) -> Result<ResolvedCatalog, ExitCode> {
    let options = ConfigOptions {
        catalog_path: global.catalog.clone(),
        preset: global.preset,
    };
    match load_catalog(&options) {
        Ok(resolved) => {
            log_catalog(ctx, &resolved.snapshot);
            for lint in &resolved.lints {
                let field = lint.field.as_str();
                log_event!(ctx, WARN, event_names::CATALOG_LINT, Stage::Catalog, lint.message.as_str(),
                    field = field);
            }
            Ok(resolved)
        }
        Err(e) => {
            let message = e.to_string();
            log_event!(ctx, ERROR, event_names::CATALOG_ERROR, Stage::Catalog, message.as_str());
            Err(output_config_error(global, &e))
        }
    }
}

fn log_catalog(ctx: &LogContext, snapshot: &CatalogSnapshot) {
    let name = snapshot.summary.name.as_str();
    let source = snapshot.source.as_str();
    if snapshot.path.is_some() {
        log_event!(ctx, DEBUG, event_names::CATALOG_LOADED, Stage::Catalog, "catalog loaded",
            name = name, source = source, hash = snapshot.short_id());
    } else {
        log_event!(ctx, DEBUG, event_names::CATALOG_PRESET_USED, Stage::Catalog, "using built-in preset",
            name = name, hash = snapshot.short_id());
    }
}

/// Print a rendered payload on stdout.
fn emit(rendered: vt_common::Result<String>) -> ExitCode {
    match rendered {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("{}", format_error_human(&e, std::io::stderr().is_terminal()));
            ExitCode::from_error(&e)
        }
    }
}

fn report_run_error(global: &GlobalOpts, err: RunError) -> ExitCode {
    match err {
        RunError::Engine(e) => output_error(global, &e),
        RunError::Io(e) => output_error(global, &vt_common::Error::Io(e)),
        RunError::Cancelled(reason) => {
            match global.format {
                OutputFormat::Json => {
                    let response = serde_json::json!({
                        "schema_version": OUTPUT_SCHEMA_VERSION,
                        "status": "cancelled",
                        "reason": reason,
                    });
                    eprintln!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
                }
                _ => eprintln!("{}", reason),
            }
            ExitCode::Cancelled
        }
        RunError::Args(message) => {
            match global.format {
                OutputFormat::Json => {
                    let response = serde_json::json!({
                        "schema_version": OUTPUT_SCHEMA_VERSION,
                        "status": "error",
                        "error": {
                            "code": ExitCode::ArgsError.as_i32(),
                            "message": message,
                        }
                    });
                    eprintln!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
                }
                _ => eprintln!("error: {}", message),
            }
            ExitCode::ArgsError
        }
    }
}

/// Output an engine error in the appropriate format.
fn output_error(global: &GlobalOpts, error: &vt_common::Error) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": OUTPUT_SCHEMA_VERSION,
                "status": "error",
                "error": StructuredError::from(error),
            });
            eprintln!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
        }
        _ => eprintln!("{}", format_error_human(error, std::io::stderr().is_terminal())),
    }
    ExitCode::from_error(error)
}

/// Output a catalog loading error in the appropriate format.
fn output_config_error(global: &GlobalOpts, error: &ConfigError) -> ExitCode {
    if let Some(common) = error.catalog_error() {
        return output_error(global, &common);
    }
    let exit_code = match error {
        e if e.is_io() => ExitCode::IoError,
        ConfigError::Snapshot(_) => ExitCode::InternalError,
        _ => ExitCode::ConfigError,
    };

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": OUTPUT_SCHEMA_VERSION,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "error",
                "error": {
                    "code": exit_code.as_i32(),
                    "kind": exit_code.code_name(),
                    "message": error.to_string(),
                }
            });
            eprintln!("{}", serde_json::to_string_pretty(&response).unwrap_or_default());
        }
        OutputFormat::Summary => eprintln!("catalog error: {}", error),
        OutputFormat::Md | OutputFormat::Prose => {
            eprintln!("# Catalog Error");
            eprintln!();
            eprintln!("Error: {}", error);
        }
    }

    exit_code
}
