use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use translate_relay::mt::{Backend, MockMode, MockTranslator};
use translate_relay::{
    AppConfig, DispatchEngine, LanguageGuard, MessageComposer, ProviderRegistry, Route,
    TranslationPipeline, WhatlangDetector, should_translate,
};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("translate-relay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate a chat message into several languages and print the composed message")
        .arg(
            Arg::new("message")
                .help("Message text to translate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("workspace")
                .long("workspace")
                .short('w')
                .help("Directory containing config.json")
                .default_value("."),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Source language code (overrides target_config)"),
        )
        .arg(
            Arg::new("targets")
                .long("targets")
                .short('t')
                .help("Target languages separated by '|', e.g. en|ja"),
        )
        .arg(
            Arg::new("chat")
                .long("chat")
                .help("Chat id used to look up target_config")
                .value_parser(clap::value_parser!(i64))
                .allow_hyphen_values(true)
                .default_value("0"),
        )
        .arg(
            Arg::new("sender")
                .long("sender")
                .help("Sender id used to look up target_config")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock translator instead of the configured backends")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every backend call")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    let message = matches
        .get_one::<String>("message")
        .cloned()
        .unwrap_or_default();
    let workspace = matches
        .get_one::<String>("workspace")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let use_mock = matches.get_flag("mock");

    let config = match AppConfig::load_from_workspace(&workspace) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let registry = if use_mock {
        ProviderRegistry::new(Backend::Mock(MockTranslator::new(MockMode::Suffix)))
    } else {
        // Missing credentials stop us here, before any message is touched
        ProviderRegistry::from_config(&config, &reqwest::Client::new()).map_err(|e| {
            error!("{}", e);
            e
        })?
    };

    let route = match (
        matches.get_one::<String>("source"),
        matches.get_one::<String>("targets"),
    ) {
        (Some(source), Some(targets)) => Route::from_pipe_list(source, targets)?,
        _ => {
            let chat = matches.get_one::<i64>("chat").copied().unwrap_or(0);
            let Some(sender) = matches.get_one::<i64>("sender").copied() else {
                return Err("either --source and --targets, or --sender, is required".into());
            };
            match config.target_config.route_for(chat, sender) {
                Some(route) => route.clone(),
                None => {
                    info!(chat, sender, "No translation configured for this chat");
                    return Ok(());
                }
            }
        }
    };

    if !should_translate(&message) {
        info!("Message is a command or blank, leaving it alone");
        return Ok(());
    }

    let pipeline = TranslationPipeline::new(
        LanguageGuard::new(WhatlangDetector::new()),
        DispatchEngine::new(Arc::new(registry)),
        MessageComposer::new(config.collapsed_length),
    );

    match pipeline.translate(message.trim(), &route).await {
        Some(composed) => {
            let output = serde_json::json!({
                "text": composed.full_text,
                "annotation": composed.annotation(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        None => info!("Nothing to send"),
    }

    Ok(())
}
