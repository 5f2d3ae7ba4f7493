use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

use intake_triage::adapters::{
    InMemorySessionRepository, LoggingEventPublisher, TracingNotificationGateway,
    YamlProtocolSource,
};
use intake_triage::application::{
    EscalationService, EscalationServiceConfig, IntakeOrchestrator, ProtocolRegistry,
    ProtocolReloader, ProtocolReloaderConfig,
};
use intake_triage::config::{init_tracing, AppConfig, ConfigError};
use intake_triage::domain::assessment::{
    AdaptiveAdjustment, AnswerSet, IncompleteAnswerSet, QuestionSequence, Scorer, TriageOutcome,
    TriageResolver,
};
use intake_triage::domain::catalog::{QuestionCatalog, Stage};
use intake_triage::domain::escalation::{CrisisAlert, Protocol};
use intake_triage::domain::foundation::PatientRef;
use intake_triage::domain::intake::{FinalReport, IntakeError, IntakeStage, StageOutcome};
use intake_triage::ports::{ProtocolSource, ProtocolSourceError};

#[derive(Parser, Debug)]
#[command(
    name = "intake-triage",
    about = "Score intake questionnaires, triage risk and manage crisis escalation",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score one screening stage from a JSON answer file
    Score(ScoreArgs),
    /// Run a full intake and print the final report
    Report(ReportArgs),
    /// Validate a protocol file and print its table
    Protocols {
        /// YAML protocol file
        file: PathBuf,
    },
    /// Watch a protocol file and log every reload until interrupted
    WatchProtocols {
        /// YAML protocol file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScoredStage {
    Short,
    Deep,
}

impl From<ScoredStage> for Stage {
    fn from(stage: ScoredStage) -> Self {
        match stage {
            ScoredStage::Short => Stage::Short,
            ScoredStage::Deep => Stage::Deep,
        }
    }
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Questionnaire stage the answers belong to
    #[arg(long, value_enum)]
    stage: ScoredStage,
    /// JSON object mapping question ids to answers
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// History stage answers (JSON)
    #[arg(long)]
    history: PathBuf,
    /// Short screening answers (JSON)
    #[arg(long)]
    short: PathBuf,
    /// Deep screening answers (JSON); deep screening is skipped without it
    #[arg(long)]
    deep: Option<PathBuf>,
    /// Patient reference recorded on the session
    #[arg(long, default_value = "cli-patient")]
    patient: String,
    /// Protocol file; overrides the configured one
    #[arg(long)]
    protocols: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("{path} is not a valid answer set: {source}")]
    Answers {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Incomplete(#[from] IncompleteAnswerSet),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Protocol(#[from] ProtocolSourceError),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("failed to wait for interrupt: {0}")]
    Signal(std::io::Error),
}

#[derive(Serialize)]
struct ScoreOutput {
    stage: Stage,
    max_total: u32,
    #[serde(flatten)]
    detail: serde_json::Value,
    triage: TriageOutcome,
    adjustments: Vec<AdaptiveAdjustment>,
}

#[derive(Serialize)]
struct ReportOutput {
    report: FinalReport,
    crisis_alerts: Vec<CrisisAlert>,
}

#[derive(Serialize)]
struct ProtocolsOutput<'a> {
    source: String,
    version: u64,
    protocols: Vec<&'a Protocol>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("intake-triage: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    init_tracing(&config.logging)?;

    match cli.command {
        Command::Score(args) => score(args).await,
        Command::Report(args) => report(args, &config).await,
        Command::Protocols { file } => protocols(&file).await,
        Command::WatchProtocols { file } => watch_protocols(file, &config).await,
    }
}

async fn read_answers(path: &Path) -> Result<AnswerSet, CliError> {
    let display = path.display().to_string();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: display.clone(),
            source,
        })?;
    serde_json::from_str(&json).map_err(|source| CliError::Answers {
        path: display,
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn score(args: ScoreArgs) -> Result<(), CliError> {
    let stage = Stage::from(args.stage);
    let answers = read_answers(&args.file).await?;
    let catalog = QuestionCatalog::global();

    let mut sequence = QuestionSequence::for_stage(stage);
    let adjustments = sequence.apply_all(&answers);
    answers.validate(stage, sequence.ids(), catalog)?;

    let output = match stage {
        Stage::Deep => {
            let result = Scorer::score_deep(&answers);
            ScoreOutput {
                stage,
                max_total: catalog.max_total(stage),
                triage: TriageResolver::resolve(result.severity, &result.risk_flags),
                detail: serde_json::to_value(&result)?,
                adjustments,
            }
        }
        _ => {
            let result = Scorer::score_short(&answers);
            ScoreOutput {
                stage,
                max_total: catalog.max_total(stage),
                triage: TriageResolver::resolve(result.severity, &result.auto_flags),
                detail: serde_json::to_value(&result)?,
                adjustments,
            }
        }
    };
    print_json(&output)
}

async fn load_registry(path: Option<&Path>) -> Arc<ProtocolRegistry> {
    let Some(path) = path else {
        tracing::warn!("no protocol file configured; every alert uses the conservative default");
        return Arc::new(ProtocolRegistry::empty());
    };
    let source = YamlProtocolSource::new(path);
    match source.load().await {
        Ok(table) => {
            tracing::info!(source = %source.describe(), version = table.version(), protocols = table.len(), "protocol table loaded");
            Arc::new(ProtocolRegistry::new(table))
        }
        Err(e) => {
            tracing::error!(source = %source.describe(), error = %e, "protocol table unavailable; every alert uses the conservative default");
            Arc::new(ProtocolRegistry::empty())
        }
    }
}

async fn report(args: ReportArgs, config: &AppConfig) -> Result<(), CliError> {
    let history = read_answers(&args.history).await?;
    let short = read_answers(&args.short).await?;
    let deep = match &args.deep {
        Some(path) => Some(read_answers(path).await?),
        None => None,
    };

    let protocol_file = args
        .protocols
        .as_deref()
        .or(config.escalation.protocol_file.as_deref());
    let registry = load_registry(protocol_file).await;
    let escalation = EscalationService::new(
        registry,
        Arc::new(TracingNotificationGateway::new()),
        Arc::new(LoggingEventPublisher::new()),
        EscalationServiceConfig {
            fallback_group: config.escalation.fallback_group(),
        },
    );
    let orchestrator = IntakeOrchestrator::new(
        Arc::new(InMemorySessionRepository::new()),
        escalation.clone(),
    );

    let patient_ref = PatientRef::new(args.patient).map_err(IntakeError::from)?;
    let session_id = orchestrator.start_intake(patient_ref).await?;
    orchestrator.submit_stage(session_id, &history).await?;
    let short_result = orchestrator.submit_stage(session_id, &short).await?;

    if short_result.next_stage == IntakeStage::Deep {
        match &deep {
            Some(answers) => {
                orchestrator.submit_stage(session_id, answers).await?;
            }
            None => orchestrator.skip_deep_screening(session_id).await?,
        }
    } else if deep.is_some() {
        if let StageOutcome::Short(result) = &short_result.outcome {
            tracing::warn!(severity = %result.severity, "deep screening not indicated; deep answers ignored");
        }
    }

    let report = orchestrator.final_report(session_id).await?;
    escalation.flush_deliveries().await;
    let crisis_alerts = escalation.alerts_for_session(session_id).await;
    escalation.shutdown().await;

    print_json(&ReportOutput {
        report,
        crisis_alerts,
    })
}

async fn protocols(file: &Path) -> Result<(), CliError> {
    let source = YamlProtocolSource::new(file);
    let table = source.load().await?;
    print_json(&ProtocolsOutput {
        source: source.describe(),
        version: table.version(),
        protocols: table.sorted(),
    })
}

async fn watch_protocols(file: PathBuf, config: &AppConfig) -> Result<(), CliError> {
    let source = Arc::new(YamlProtocolSource::new(&file));
    let table = source.load().await?;
    tracing::info!(source = %source.describe(), version = table.version(), "watching protocol file");

    let registry = Arc::new(ProtocolRegistry::new(table));
    let reloader = ProtocolReloader::with_config(
        source,
        registry,
        ProtocolReloaderConfig::default().with_poll_interval(config.escalation.reload_interval()),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { reloader.run(shutdown_rx).await });

    tokio::signal::ctrl_c().await.map_err(CliError::Signal)?;
    let _ = shutdown_tx.send(true);
    let _ = handle.await;
    Ok(())
}
