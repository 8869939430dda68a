//! CLI entry point for the data quality copilot.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use dq_copilot::ai::{
    AzureOpenAiBackend, AzureOpenAiConfig, OpenRouterBackend, OpenRouterConfig,
    TextCompletionBackend,
};
use dq_copilot::session::load_files;
use dq_copilot::utils::truncate_str;
use dq_copilot::warehouse::{DatabricksConfig, DatabricksConnector};
use dq_copilot::{
    AnalysisReport, AnalysisScope, Auditor, CopilotConfig, IssueRecord, NarrativeRequester,
    RemediationAdvisor, RemediationStrategy, Session, Table, parse_issues_file,
    render_markdown_table,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// CLI-compatible text-generation provider
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    /// Azure OpenAI deployment (AZURE_OPENAI_* variables)
    Azure,
    /// OpenRouter API (OPENROUTER_API_KEY)
    Openrouter,
}

/// CLI-compatible analysis scope
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliScope {
    /// Cross-table narrative followed by per-table sections
    Both,
    /// One global narrative over all tables
    Cross,
    /// One narrative section per table
    PerTable,
}

impl From<CliScope> for AnalysisScope {
    fn from(cli: CliScope) -> Self {
        match cli {
            CliScope::Both => AnalysisScope::Both,
            CliScope::Cross => AnalysisScope::CrossTable,
            CliScope::PerTable => AnalysisScope::PerTable,
        }
    }
}

/// CLI-compatible remediation strategy
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStrategy {
    /// Ask the backend for a recommended fix
    AutoFix,
    /// Annotate the issue with its details
    Annotate,
    /// Use the text given with --text
    Custom,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Data quality auditing assistant",
    long_about = "Computes column quality metrics, asks an LLM for a data quality narrative, \
                  and turns the narrative into structured issues with proposed fixes.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  AZURE_OPENAI_API_KEY      API key of the Azure OpenAI resource\n  \
                  AZURE_OPENAI_ENDPOINT     e.g. https://my-resource.openai.azure.com\n  \
                  AZURE_OPENAI_DEPLOYMENT   chat model deployment name\n  \
                  OPENROUTER_API_KEY        API key for OpenRouter (--provider openrouter)\n  \
                  DATABRICKS_TOKEN          access token for the warehouse command\n\n\
                  EXAMPLES:\n  \
                  # Analyze two CSV files\n  \
                  dq-copilot analyze customers.csv orders.csv\n\n  \
                  # Analyze every table of a warehouse schema\n  \
                  dq-copilot warehouse --host adb-1.azuredatabricks.net --http-path /sql/1.0/warehouses/abc --schema sales\n\n  \
                  # Browse the parsed issues, then propose a fix for the first one\n  \
                  dq-copilot issues\n  \
                  dq-copilot fix 0 --strategy auto-fix"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Output directory for the narrative and metrics files
    #[arg(short, long, global = true, default_value = "output")]
    output: PathBuf,

    /// Text-generation provider
    #[arg(long, global = true, value_enum, default_value = "azure")]
    provider: CliProvider,

    /// Model for OpenRouter (ignored for Azure, which uses the deployment)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Maximum tokens per completion
    #[arg(long, global = true, default_value = "2000")]
    max_tokens: u32,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long, global = true, default_value = "0.7")]
    temperature: f32,

    /// Request timeout in seconds for backend and warehouse calls
    ///
    /// Unset by default: the remote service decides how long a call may take
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and results)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze CSV files
    Analyze {
        /// CSV files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Analyze every table of a warehouse schema
    Warehouse {
        /// Server hostname of the workspace
        #[arg(long)]
        host: String,

        /// HTTP path of the SQL warehouse
        #[arg(long)]
        http_path: String,

        /// Schema to list and load tables from
        #[arg(long, default_value = "default")]
        schema: String,

        /// Load at most this many rows per table
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// List the issues parsed from a narrative file
    Issues {
        /// Narrative file (defaults to the one in the output directory)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output the issues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Propose a remediation for one issue
    Fix {
        /// Index of the issue, as shown by `issues`
        index: usize,

        /// Remediation strategy
        #[arg(long, value_enum, default_value = "annotate")]
        strategy: CliStrategy,

        /// Fix text for the custom strategy (may be empty)
        #[arg(long, default_value = "")]
        text: String,

        /// Narrative file (defaults to the one in the output directory)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct AnalysisArgs {
    /// Which narratives to request
    #[arg(long, value_enum, default_value = "both")]
    scope: CliScope,

    /// Rows shown per table preview (0 disables previews)
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Output the analysis report as JSON instead of a summary
    ///
    /// Disables all logging and previews
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// only carries the JSON document.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = match &cli.command {
        Command::Analyze { analysis, .. } | Command::Warehouse { analysis, .. } => analysis.json,
        Command::Issues { json, .. } => *json,
        Command::Fix { .. } => false,
    };
    init_logging(&cli.common.log_level, cli.common.quiet, json_output);

    dotenv().ok();

    match &cli.command {
        Command::Analyze { files, analysis } => {
            let config = build_config(&cli.common, analysis.scope, None, None)?;
            let requester = build_requester(&cli.common, &config)?;
            let auditor = Auditor::new(&requester, &config);
            let mut session = Session::new();

            let report = if analysis.json {
                auditor.analyze_files(&mut session, files.as_slice())?
            } else {
                let (tables, failures) = load_files(files.as_slice())?;
                print_previews(&tables, analysis.preview_rows)?;
                let mut report = auditor.analyze(&mut session, &tables)?;
                report.prepend_load_failures(failures);
                report
            };
            print_report(&report, &session, analysis.json)
        }
        Command::Warehouse {
            host,
            http_path,
            schema,
            limit,
            analysis,
        } => {
            let config = build_config(&cli.common, analysis.scope, Some(schema), *limit)?;
            let token = env::var("DATABRICKS_TOKEN")
                .map_err(|_| anyhow!("DATABRICKS_TOKEN environment variable not set"))?;

            let mut warehouse = DatabricksConfig::new(host, http_path);
            if let Some(secs) = cli.common.timeout_secs {
                warehouse = warehouse.with_timeout_secs(secs);
            }
            let connector = DatabricksConnector::new(warehouse, token)?;

            let requester = build_requester(&cli.common, &config)?;
            let auditor = Auditor::new(&requester, &config);
            let mut session = Session::new();

            let report = if analysis.json {
                auditor.analyze_warehouse(&mut session, &connector)?
            } else {
                let (tables, failures) = auditor.load_warehouse_tables(&connector)?;
                print_previews(&tables, analysis.preview_rows)?;
                let mut report = auditor.analyze(&mut session, &tables)?;
                report.prepend_load_failures(failures);
                report
            };
            print_report(&report, &session, analysis.json)
        }
        Command::Issues { file, json } => {
            let path = narrative_file(&cli.common, file.as_ref());
            let issues = parse_issues_file(&path)
                .with_context(|| format!("No narrative to browse at {}", path.display()))?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&issues)?);
            } else {
                print_issues(&issues);
            }
            Ok(())
        }
        Command::Fix {
            index,
            strategy,
            text,
            file,
        } => {
            let path = narrative_file(&cli.common, file.as_ref());
            let narrative = std::fs::read_to_string(&path)
                .with_context(|| format!("No narrative at {}", path.display()))?;
            let session = Session::from_narrative(narrative);
            let issue = session.select(*index).ok_or_else(|| {
                anyhow!(
                    "No issue at index {} ({} issues available)",
                    index,
                    session.issues().len()
                )
            })?;

            let strategy = match strategy {
                CliStrategy::AutoFix => RemediationStrategy::AutoFix,
                CliStrategy::Annotate => RemediationStrategy::Annotate,
                CliStrategy::Custom => RemediationStrategy::Custom(text.clone()),
            };

            let fix = if matches!(strategy, RemediationStrategy::AutoFix) {
                let config = build_config(&cli.common, CliScope::Both, None, None)?;
                let requester = build_requester(&cli.common, &config)?;
                RemediationAdvisor::new(&requester).propose(issue, &strategy)
            } else {
                RemediationAdvisor::offline().propose(issue, &strategy)
            };

            println!("{fix}");
            Ok(())
        }
    }
}

fn build_config(
    common: &CommonArgs,
    scope: CliScope,
    schema: Option<&String>,
    row_limit: Option<usize>,
) -> Result<CopilotConfig> {
    let mut builder = CopilotConfig::builder()
        .output_dir(&common.output)
        .max_tokens(common.max_tokens)
        .temperature(common.temperature)
        .analysis_scope(scope.into());

    if let Some(schema) = schema {
        builder = builder.default_schema(schema);
    }
    if let Some(limit) = row_limit {
        builder = builder.row_limit(limit);
    }

    Ok(builder.build()?)
}

fn build_requester(common: &CommonArgs, config: &CopilotConfig) -> Result<NarrativeRequester> {
    let backend: Arc<dyn TextCompletionBackend> = match common.provider {
        CliProvider::Azure => {
            let api_key = required_env("AZURE_OPENAI_API_KEY")?;
            let mut azure = AzureOpenAiConfig::builder()
                .endpoint(required_env("AZURE_OPENAI_ENDPOINT")?)
                .deployment(required_env("AZURE_OPENAI_DEPLOYMENT")?);
            if let Some(secs) = common.timeout_secs {
                azure = azure.timeout_secs(secs);
            }
            Arc::new(AzureOpenAiBackend::new(api_key, azure.build())?)
        }
        CliProvider::Openrouter => {
            let api_key = required_env("OPENROUTER_API_KEY")?;
            let mut openrouter = OpenRouterConfig::builder();
            if let Some(model) = &common.model {
                openrouter = openrouter.model(model);
            }
            if let Some(secs) = common.timeout_secs {
                openrouter = openrouter.timeout_secs(secs);
            }
            Arc::new(OpenRouterBackend::with_config(api_key, openrouter.build())?)
        }
    };

    info!(
        "Using {} backend{}",
        backend.name(),
        backend
            .model()
            .map(|m| format!(" ({m})"))
            .unwrap_or_default()
    );
    Ok(NarrativeRequester::new(backend, config))
}

fn required_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{name} environment variable not set"),
    }
}

fn narrative_file(common: &CommonArgs, file: Option<&PathBuf>) -> PathBuf {
    file.cloned()
        .unwrap_or_else(|| common.output.join(CopilotConfig::default().narrative_file_name))
}

/// Print the head of every table.
///
/// Uses `println!` intentionally: previews are user-facing output and must
/// not depend on the log level.
fn print_previews(tables: &[Table], rows: usize) -> Result<()> {
    if rows == 0 {
        return Ok(());
    }

    for table in tables {
        println!("\n{}", "=".repeat(80));
        println!(
            "{} ({} rows x {} columns)",
            table.section_header(),
            table.height(),
            table.data().width()
        );
        println!("{}", "=".repeat(80));
        println!("{}", render_markdown_table(table.data(), Some(rows))?);
    }
    Ok(())
}

fn print_report(report: &AnalysisReport, session: &Session, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("ANALYSIS SUMMARY");
    println!("{}", "=".repeat(80));
    println!("  Tables:        {}", report.tables_analyzed);
    println!("  Metric rows:   {}", report.metrics.len());
    println!("  Issues found:  {}", report.issues_found);
    println!("  Narrative:     {}", report.narrative_path.display());
    println!("  Metrics:       {}", report.metrics_path.display());
    println!();

    if !report.failures.is_empty() {
        println!("Failures:");
        for failure in &report.failures {
            println!("  ! {}: {}", failure.table, failure.error);
        }
        println!();
    }

    print_issues(session.issues());
    println!("Use `issues --json` for machine-readable output");
    println!("Use `fix <index> --strategy auto-fix` to propose a fix");
    Ok(())
}

fn print_issues(issues: &[IssueRecord]) {
    println!("ISSUES ({})", issues.len());
    println!("{}", "-".repeat(40));

    if issues.is_empty() {
        println!("  No issues found in the narrative");
    }
    for (index, issue) in issues.iter().enumerate() {
        println!(
            "[{}] {}: {}",
            index,
            issue.owning_table,
            truncate_str(&issue.title, 70)
        );
        for (label, value) in issue.display_fields().iter().skip(2) {
            println!("      {label}: {value}");
        }
    }
    println!();
}
