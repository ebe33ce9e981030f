use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sports_classifier::render::{self, OutputFormat};
use sports_classifier::{Config, CustomCategoryForm, DynController, TaxonomyStore};

fn custom_arg() -> Arg {
    Arg::new("custom")
        .long("custom")
        .value_name("NAME=PROMPTS")
        .help("Add a custom category, e.g. \"Surfing=big wave surfing,longboard\"")
        .action(ArgAction::Append)
}

fn cli() -> Command {
    let cmd = Command::new("Sports Classifier")
        .version(env!("CARGO_PKG_VERSION"))
        .author("TigreRoll")
        .about("Classify indexed videos into Olympic sport categories")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("categories")
                .about("List the available categories")
                .arg(custom_arg()),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify the index against selected categories")
                .arg(
                    Arg::new("category")
                        .short('c')
                        .long("category")
                        .value_name("NAME")
                        .help("Category to classify against (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(custom_arg())
                .arg(
                    Arg::new("no-clips")
                        .long("no-clips")
                        .help("Do not request per-clip detail")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Output format")
                        .value_parser(["text", "json", "html"])
                        .default_value("text"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write the report to a file instead of stdout"),
                ),
        );

    #[cfg(feature = "api")]
    let cmd = cmd.subcommand(
        Command::new("serve").about("Run the HTTP API").arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on")
                .value_parser(clap::value_parser!(u16))
                .default_value("8080"),
        ),
    );

    cmd
}

fn log_filter(verbose: bool) -> EnvFilter {
    let default_filter = if verbose {
        "sports_classifier=debug,info"
    } else {
        "sports_classifier=info,warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Log subscriber writing to `writer`; stdout is reserved for command output
fn log_subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish()
}

fn init_logging(verbose: bool) {
    log_subscriber(log_filter(verbose), std::io::stderr).init();
}

fn emit_report(rendered: &str, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", rendered)?;
    out.flush()?;
    Ok(())
}

/// Session store seeded with any --custom categories
fn session_from_args(matches: &ArgMatches) -> Result<TaxonomyStore> {
    let mut session = TaxonomyStore::new();
    for spec in matches.get_many::<String>("custom").into_iter().flatten() {
        let category = CustomCategoryForm::from_assignment(spec)?.parse()?;
        session.add_custom(category.name, category.prompts);
    }
    Ok(session)
}

async fn run_classify(config: Config, matches: &ArgMatches) -> Result<()> {
    let mut config = config;
    if matches.get_flag("no-clips") {
        config.service.include_clips = false;
    }

    let session = session_from_args(matches)?;
    let selected: Vec<String> = matches
        .get_many::<String>("category")
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    let format: OutputFormat = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        .parse()?;

    let controller = DynController::from_config(&config)?;
    let report = controller.classify(&session, &selected).await?;
    let rendered = render::render(&report, format)?;

    match matches.get_one::<String>("output") {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("failed to write report to {}", path))?;
            info!("📂 Report written to {}", path);
        }
        None => emit_report(&rendered, &mut std::io::stdout().lock())?,
    }

    let warnings = report.warnings();
    if !warnings.is_empty() {
        warn!("{} of {} videos have no playable stream", warnings.len(), report.total());
    }

    Ok(())
}

#[cfg(feature = "api")]
async fn run_server(config: Config, matches: &ArgMatches) -> Result<()> {
    use std::sync::Arc;

    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let controller = Arc::new(DynController::from_config(&config)?);
    sports_classifier::api::ApiServer::new(controller, &config.api, port)
        .start()
        .await
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    if let Some(("categories", sub)) = matches.subcommand() {
        let session = session_from_args(sub)?;
        print!(
            "{}",
            render::render_categories(&session.merged(), session.list_builtin().len())
        );
        return Ok(());
    }

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    info!("🚀 Sports Classifier starting...");
    tracing::debug!("{}", config.summary());

    match matches.subcommand() {
        Some(("classify", sub)) => run_classify(config, sub).await,
        #[cfg(feature = "api")]
        Some(("serve", sub)) => run_server(config, sub).await,
        _ => Err(anyhow::anyhow!("unknown command")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sports_classifier::{ClassificationReport, ResolveFailure, ResolvedMatch};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_report() -> ClassificationReport {
        ClassificationReport {
            index_id: "idx".to_string(),
            categories: vec!["CombatSports".to_string()],
            matches: vec![ResolvedMatch {
                position: 1,
                video_id: "v1".to_string(),
                classes: vec![],
                stream_url: None,
                unavailable_reason: Some(ResolveFailure::MissingUrl),
            }],
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_json_report_is_not_mixed_with_logs() {
        let logs = SharedBuffer::default();
        let sink = logs.clone();
        let subscriber = log_subscriber(EnvFilter::new("sports_classifier=info"), move || sink.clone());

        let mut stdout = Vec::new();
        tracing::subscriber::with_default(subscriber, || {
            info!("🚀 Sports Classifier starting...");
            let rendered = render::render(&sample_report(), OutputFormat::Json).unwrap();
            emit_report(&rendered, &mut stdout).unwrap();
            warn!("1 of 1 videos have no playable stream");
        });

        let parsed: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
        assert_eq!(parsed["matches"][0]["video_id"], "v1");

        let logged = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("Sports Classifier starting"));
        assert!(logged.contains("no playable stream"));
    }
}
