//! CLI entrypoint for Signal Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    AnalysisWorker, CompositeTelemetry, CouncilParams, MAX_DEBATE_ROUNDS, MAX_PIPELINE_TIMEOUT,
    ReasoningEngine, RunCouncilInput, RunCouncilUseCase, SpecialistWorker, TelemetrySink,
    ToolGateway,
};
use council_domain::{ConfigIssue, IntentClassifier, InvestigationMode, Query, WorkerId};
use council_infrastructure::{
    CircuitBreakerToolGateway, ConfigLoader, DisabledToolGateway, FileConfig,
    HttpReasoningEngine, HttpToolGateway, JsonlTelemetrySink,
};
use council_presentation::{
    Cli, ConsoleFormatter, OutputFormatter, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?
    };

    for warning in config.check()? {
        warn!("{}", warning.message);
    }

    let Some(query) = cli.query.as_deref().and_then(Query::try_new) else {
        bail!("Query is required and cannot be empty");
    };

    let (rules, _) = config.intent.to_rules();
    let classifier = IntentClassifier::new(rules);

    if cli.classify_only {
        let intent = classifier.classify(&query);
        print!("{}", ConsoleFormatter::format_intent(&query, &intent));
        return Ok(());
    }

    info!("Starting Signal Council");

    let params = apply_overrides(config.council.to_params(), &cli);
    let forced_mode = cli
        .mode
        .map(InvestigationMode::from)
        .or_else(|| config.council.parse_mode().0);

    // === Dependency Injection ===
    let engine: Arc<dyn ReasoningEngine> =
        Arc::new(HttpReasoningEngine::from_config(&config.engine)?);
    let gateway = build_gateway(&config)?;
    let workers = build_workers(&config, gateway, engine.clone())?;

    let telemetry = build_telemetry(&cli, &config);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with partial results");
            ctrl_c.cancel();
        }
    });

    let investigation_id = cli
        .investigation_id
        .clone()
        .unwrap_or_else(|| format!("inv-{}", chrono::Local::now().format("%Y%m%d-%H%M%S")));

    let mut input = RunCouncilInput::new(query, investigation_id);
    if let Some(mode) = forced_mode {
        input = input.with_mode(mode);
    }

    let use_case = RunCouncilUseCase::new(workers, engine, params)
        .with_classifier(classifier)
        .with_telemetry(telemetry)
        .with_cancellation(cancel);

    let result = use_case.execute(input).await?;
    drop(use_case);

    println!("{}", ConsoleFormatter.render(&result, cli.output));

    Ok(())
}

/// Install the tracing subscriber; logs go to `--log-file` when given.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn apply_overrides(mut params: CouncilParams, cli: &Cli) -> CouncilParams {
    if let Some(rounds) = cli.max_rounds {
        params = params.with_max_rounds(rounds.min(MAX_DEBATE_ROUNDS));
    }
    if let Some(threshold) = cli.threshold {
        params = params.with_confidence_threshold(threshold.clamp(0.0, 1.0));
    }
    if let Some(secs) = cli.timeout {
        let secs = secs.clamp(1, MAX_PIPELINE_TIMEOUT.as_secs());
        params = params.with_pipeline_timeout(Duration::from_secs(secs));
    }
    params
}

fn build_gateway(config: &FileConfig) -> Result<Arc<dyn ToolGateway>> {
    let Some(endpoint) = &config.tools.endpoint else {
        if config.workers.iter().any(|w| !w.tools.is_empty()) {
            warn!("Workers declare tools but [tools].endpoint is unset; tool calls will fail");
        }
        return Ok(Arc::new(DisabledToolGateway));
    };

    let http = HttpToolGateway::new(
        endpoint.clone(),
        Duration::from_secs(config.tools.request_timeout_secs),
    )?;
    Ok(Arc::new(CircuitBreakerToolGateway::new(
        Arc::new(http),
        config.tools.failure_threshold,
        Duration::from_secs(config.tools.cooldown_secs),
    )))
}

fn build_workers(
    config: &FileConfig,
    gateway: Arc<dyn ToolGateway>,
    engine: Arc<dyn ReasoningEngine>,
) -> Result<Vec<Arc<dyn AnalysisWorker>>> {
    config
        .effective_workers()
        .iter()
        .map(|worker| {
            let domain = worker
                .parse_domain()
                .map_err(|issue: ConfigIssue| anyhow::anyhow!(issue.message))?;
            let specialist = SpecialistWorker::new(
                WorkerId::new(worker.worker_id()),
                domain,
                gateway.clone(),
                engine.clone(),
            )
            .with_tools(worker.tool_bindings());
            Ok(Arc::new(specialist) as Arc<dyn AnalysisWorker>)
        })
        .collect()
}

fn build_telemetry(cli: &Cli, config: &FileConfig) -> Arc<dyn TelemetrySink> {
    let mut telemetry = CompositeTelemetry::new();

    let jsonl_path = cli
        .telemetry_log
        .clone()
        .or_else(|| config.telemetry.jsonl_path.clone());
    if let Some(path) = jsonl_path {
        match JsonlTelemetrySink::new(&path) {
            Some(sink) => telemetry = telemetry.with_sink(Arc::new(sink)),
            None => warn!("Cannot open telemetry log {}, events not recorded", path.display()),
        }
    }

    if !cli.quiet {
        if std::io::stderr().is_terminal() {
            telemetry = telemetry.with_sink(Arc::new(ProgressReporter::new()));
        } else {
            telemetry = telemetry.with_sink(Arc::new(SimpleProgress));
        }
    }

    Arc::new(telemetry)
}
