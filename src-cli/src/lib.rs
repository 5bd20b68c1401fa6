use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use cw_ai::llm::gemini_llm::GeminiLlm;
use cw_ai::llm::ModelBackend;
use cw_ai::schema::analysis_response_schema;
use cw_ai::session::{AppState, Session};
use cw_core::domain::{AnalysisMode, ContractAnalysis};
use cw_core::error::{AppError, CONFIG_ERROR};
use cw_core::ingest::ingest_path;
use cw_core::report::render_markdown;
use cw_core::validate::decode_analysis;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

pub mod config;

use config::AppConfig;

pub const EXIT_ERROR: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;

const IO_ERROR: &str = "IO_ERROR";

#[derive(Parser)]
#[command(name = "clausewise")]
#[command(about = "Contract risk analysis backed by a hosted model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a contract (PDF or image) and print the report
    #[command(after_help = "\
Examples:
  clausewise analyze lease.pdf
  clausewise analyze v1.pdf --compare v2.pdf --mode compare
  clausewise analyze scan.jpg --mode explain --query 'What happens if I move out early?'
  clausewise analyze msa.pdf --format json -o msa.analysis.json --chat")]
    Analyze {
        /// Contract file
        file: PathBuf,

        /// Revised version of the contract (compare mode)
        #[arg(long, value_name = "FILE")]
        compare: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ModeArg::Audit)]
        mode: ModeArg,

        /// Question or specific instructions for the model
        #[arg(long, short = 'q', default_value = "")]
        query: String,

        /// Override the media type detected from the file extension
        #[arg(long, value_name = "TYPE")]
        mime: Option<String>,

        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Ask follow-up questions on stdin after the report
        #[arg(long)]
        chat: bool,
    },

    /// Validate a saved analysis (JSON) and render it as Markdown
    Report {
        analysis: PathBuf,

        #[arg(long, value_enum, default_value_t = ModeArg::Audit)]
        mode: ModeArg,
    },

    /// Print the response schema sent with every analysis
    Schema,

    /// Check that the model endpoint is reachable with the configured key
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Audit,
    Compare,
    Rewrite,
    Explain,
}

impl From<ModeArg> for AnalysisMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Audit => AnalysisMode::Audit,
            ModeArg::Compare => AnalysisMode::Compare,
            ModeArg::Rewrite => AnalysisMode::Rewrite,
            ModeArg::Explain => AnalysisMode::Explain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn now_rfc3339_utc() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| AppError::new(IO_ERROR, "Failed to format time").with_details(e.to_string()))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), AppError> {
    match path {
        Some(p) => fs::write(p, text).map_err(|e| {
            AppError::new(IO_ERROR, "Failed to write output file")
                .with_details(format!("path={}; err={e}", p.display()))
        }),
        None => {
            let mut out = io::stdout().lock();
            out.write_all(text.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|e| AppError::new(IO_ERROR, "Failed to write to stdout").with_details(e.to_string()))
        }
    }
}

/// Render a result for output. Markdown gets a provenance footer; JSON stays reloadable.
fn format_analysis(
    analysis: &ContractAnalysis,
    mode: AnalysisMode,
    format: OutputFormat,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(analysis)
            .map(|s| s + "\n")
            .map_err(|e| AppError::new(IO_ERROR, "Failed to serialize analysis").with_details(e.to_string())),
        OutputFormat::Markdown => {
            let mut md = render_markdown(analysis, mode);
            md.push_str(&format!(
                "\n---\n_Generated by clausewise {} at {}_\n",
                env!("CARGO_PKG_VERSION"),
                now_rfc3339_utc()?
            ));
            Ok(md)
        }
    }
}

struct AnalyzeArgs {
    file: PathBuf,
    compare: Option<PathBuf>,
    mode: AnalysisMode,
    query: String,
    mime: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
    chat: bool,
}

/// Load the inputs into a fresh session.
fn prepare_session(args: &AnalyzeArgs) -> Result<Session, AppError> {
    let mut session = Session::new();
    session.set_mode(args.mode);
    session.set_contract_file(ingest_path(&args.file, args.mime.as_deref())?);

    if let Some(path) = args.compare.as_deref() {
        if args.mode == AnalysisMode::Compare {
            session.set_comparison_file(ingest_path(path, None)?)?;
        } else {
            tracing::warn!(
                mode = args.mode.as_str(),
                "--compare is only used with --mode compare; ignoring it"
            );
        }
    }
    session.set_user_query(args.query.clone());
    Ok(session)
}

fn analyze_cmd(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let backend = GeminiLlm::new(config.client()?);
    let mut session = prepare_session(&args)?;

    if session.run_analysis(&backend, &config.model) != AppState::Results {
        let message = session.error_message().unwrap_or_default().to_string();
        return Err(match session.last_error() {
            Some(cause) => AppError::new(cause.code.clone(), message)
                .with_details(match &cause.details {
                    Some(d) => format!("{}: {d}", cause.message),
                    None => cause.message.clone(),
                })
                .with_retryable(cause.retryable),
            None => AppError::validation(message),
        });
    }

    if let Some(analysis) = session.analysis() {
        let text = format_analysis(analysis, args.mode, args.format)?;
        write_output(args.output.as_deref(), &text)?;
        if let Some(p) = args.output.as_deref() {
            eprintln!("Wrote {}", p.display());
        }
    }

    if args.chat {
        chat_loop(&mut session, &backend, &config.model, io::stdin().lock())?;
    }
    Ok(())
}

/// Read questions line by line until EOF, a blank line, or `exit`.
fn chat_loop(
    session: &mut Session,
    backend: &dyn ModelBackend,
    model: &str,
    input: impl BufRead,
) -> Result<(), AppError> {
    eprintln!("Ask a question about the contract (blank line or `exit` to quit).");
    for line in input.lines() {
        let line = line.map_err(|e| {
            AppError::new(IO_ERROR, "Failed to read from stdin").with_details(e.to_string())
        })?;
        let question = line.trim();
        if question.is_empty() || question.eq_ignore_ascii_case("exit") {
            break;
        }
        let turn = session.ask(backend, model, question)?;
        write_output(None, &format!("\n{}\n\n", turn.text))?;
    }
    Ok(())
}

fn report_cmd(path: &Path, mode: AnalysisMode) -> Result<(), AppError> {
    let text = fs::read_to_string(path).map_err(|e| {
        AppError::new(IO_ERROR, "Failed to read analysis file")
            .with_details(format!("path={}; err={e}", path.display()))
    })?;
    let analysis = decode_analysis(&text)?;
    write_output(None, &format_analysis(&analysis, mode, OutputFormat::Markdown)?)
}

fn schema_cmd() -> Result<(), AppError> {
    let schema = serde_json::to_string_pretty(&analysis_response_schema())
        .map_err(|e| AppError::new(IO_ERROR, "Failed to serialize schema").with_details(e.to_string()))?;
    write_output(None, &(schema + "\n"))
}

fn health_cmd() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let client = config.client()?;
    client.health_check()?;
    write_output(
        None,
        &format!("Model API reachable at {} (model {})\n", client.base_url(), config.model),
    )
}

fn exit_code_for(err: &AppError) -> ExitCode {
    if err.is(CONFIG_ERROR) {
        ExitCode::from(EXIT_CONFIG)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

pub fn run() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            file,
            compare,
            mode,
            query,
            mime,
            format,
            output,
            chat,
        } => analyze_cmd(AnalyzeArgs {
            file,
            compare,
            mode: mode.into(),
            query,
            mime,
            format,
            output,
            chat,
        }),
        Commands::Report { analysis, mode } => report_cmd(&analysis, mode.into()),
        Commands::Schema => schema_cmd(),
        Commands::Health => health_cmd(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(details) = e.details.as_deref() {
                eprintln!("  {details}");
            }
            exit_code_for(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    use cw_ai::chat::CHAT_FALLBACK_TEXT;
    use cw_ai::llm::ModelRequest;
    use pretty_assertions::assert_eq;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "clausewise", "analyze", "v1.pdf", "--compare", "v2.pdf", "--mode", "compare",
            "-q", "Is it worse?", "--format", "json",
        ])
        .expect("parse");
        match cli.command {
            Commands::Analyze {
                file,
                compare,
                mode,
                query,
                format,
                chat,
                ..
            } => {
                assert_eq!(file, PathBuf::from("v1.pdf"));
                assert_eq!(compare, Some(PathBuf::from("v2.pdf")));
                assert_eq!(AnalysisMode::from(mode), AnalysisMode::Compare);
                assert_eq!(query, "Is it worse?");
                assert_eq!(format, OutputFormat::Json);
                assert!(!chat);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn config_requires_an_api_key() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.code, "CONFIG_ERROR");

        let err = AppConfig::from_lookup(lookup(&[("CLAUSEWISE_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err.code, "CONFIG_ERROR");
    }

    #[test]
    fn config_key_fallbacks_and_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[("API_KEY", "c"), ("GEMINI_API_KEY", "b")]))
            .expect("config");
        assert_eq!(cfg.api_key, "b");
        assert_eq!(cfg.model, "gemini-3-pro-preview");
        assert_eq!(cfg.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.timeout, None);
        assert!(!format!("{cfg:?}").contains("\"b\""));

        let cfg = AppConfig::from_lookup(lookup(&[
            ("CLAUSEWISE_API_KEY", "a"),
            ("GEMINI_API_KEY", "b"),
            ("CLAUSEWISE_MODEL", "gemini-2.5-flash"),
            ("CLAUSEWISE_TIMEOUT_SECS", "90"),
        ]))
        .expect("config");
        assert_eq!(cfg.api_key, "a");
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(cfg.timeout, Some(std::time::Duration::from_secs(90)));
        assert_eq!(cfg.client().expect("client").timeout(), cfg.timeout);
    }

    #[test]
    fn config_rejects_bad_timeout_and_base_url() {
        let err = AppConfig::from_lookup(lookup(&[
            ("API_KEY", "k"),
            ("CLAUSEWISE_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert_eq!(err.code, "CONFIG_ERROR");

        let cfg = AppConfig::from_lookup(lookup(&[
            ("API_KEY", "k"),
            ("CLAUSEWISE_BASE_URL", "http://example.com"),
        ]))
        .expect("config");
        assert_eq!(cfg.client().unwrap_err().code, "CONFIG_ERROR");
        assert_eq!(exit_code_for(&cfg.client().unwrap_err()), ExitCode::from(EXIT_CONFIG));
    }

    #[test]
    fn prepare_session_ingests_files_per_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let v1 = dir.path().join("v1.pdf");
        let v2 = dir.path().join("v2.pdf");
        fs::write(&v1, b"%PDF-1.7 one").expect("write");
        fs::write(&v2, b"%PDF-1.7 two").expect("write");

        let mut args = AnalyzeArgs {
            file: v1.clone(),
            compare: Some(v2.clone()),
            mode: AnalysisMode::Compare,
            query: "Is it worse?".to_string(),
            mime: None,
            format: OutputFormat::Markdown,
            output: None,
            chat: false,
        };
        let s = prepare_session(&args).expect("session");
        assert!(s.can_submit());
        assert_eq!(s.contract_file().map(|f| f.mime_type.as_str()), Some("application/pdf"));
        assert_eq!(s.comparison_file().map(|f| f.name.as_str()), Some("v2.pdf"));
        assert_eq!(s.user_query(), "Is it worse?");

        args.mode = AnalysisMode::Audit;
        let s = prepare_session(&args).expect("session");
        assert!(s.comparison_file().is_none());

        args.file = dir.path().join("missing.pdf");
        assert_eq!(prepare_session(&args).unwrap_err().code, "INGESTION_ERROR");
    }

    struct ScriptedLlm {
        analysis: String,
        calls: Cell<usize>,
    }

    impl ModelBackend for ScriptedLlm {
        fn generate(&self, _model: &str, request: &ModelRequest) -> Result<String, AppError> {
            self.calls.set(self.calls.get() + 1);
            if request.generation.response_schema.is_some() {
                Ok(self.analysis.clone())
            } else {
                Err(AppError::new("TRANSPORT_ERROR", "offline"))
            }
        }
    }

    #[test]
    fn chat_loop_stops_at_blank_line() {
        let llm = ScriptedLlm {
            analysis: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../crates/cw_core/tests/fixtures/analysis_minimal.json"
            ))
            .to_string(),
            calls: Cell::new(0),
        };
        let mut session = Session::new();
        let file = cw_core::ingest::ingest_bytes("nda.pdf", "application/pdf", b"%PDF").expect("ingest");
        session.set_contract_file(file);
        assert_eq!(session.run_analysis(&llm, "mock"), AppState::Results);

        let input = io::Cursor::new("What is the term?\n\nignored?\n");
        chat_loop(&mut session, &llm, "mock", input).expect("chat");

        assert_eq!(llm.calls.get(), 2);
        assert_eq!(session.chat_history().len(), 2);
        assert_eq!(session.chat_history()[1].text, CHAT_FALLBACK_TEXT);
    }

    #[test]
    fn json_output_reloads_through_the_validator() {
        let analysis = decode_analysis(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../crates/cw_core/tests/fixtures/analysis_full.json"
        )))
        .expect("fixture");
        let json = format_analysis(&analysis, AnalysisMode::Audit, OutputFormat::Json).expect("json");
        assert_eq!(decode_analysis(&json).expect("reload"), analysis);

        let md = format_analysis(&analysis, AnalysisMode::Audit, OutputFormat::Markdown).expect("md");
        assert!(md.starts_with("# Contract analysis: SaaS Contract"));
        assert!(md.contains("_Generated by clausewise "));
    }
}
