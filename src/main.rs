use clap::Parser;
use news_grammar_monitor::checker::{RuleBook, ViolationChecker};
use news_grammar_monitor::fetch::NewsSiteFetcher;
use news_grammar_monitor::health::{self, HealthState, ServiceInfo};
use news_grammar_monitor::notify::{
    EmailNotifier, FanoutNotifier, NoopNotifier, WhatsAppNotifier,
};
use news_grammar_monitor::review::OpenAiReviewer;
use news_grammar_monitor::store::SqliteStore;
use news_grammar_monitor::{Config, Monitor, MonitorError, Notifier};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

/// Watch a news site and report grammar and style-guide problems in new articles.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON configuration file, used when the environment does not configure the monitor
    #[arg(short, long, env = "MONITOR_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Run a single check and exit
    #[arg(long)]
    once: bool,

    /// Serve /health and /status on this port (overrides the configuration)
    #[arg(long)]
    health_port: Option<u16>,
}

fn build_notifier(config: &Config) -> Result<(Box<dyn Notifier>, Vec<String>), MonitorError> {
    let mut targets: Vec<Box<dyn Notifier>> = Vec::new();
    if let Some(email) = &config.email {
        targets.push(Box::new(EmailNotifier::new(email)?));
    }
    if let Some(whatsapp) = &config.whatsapp {
        targets.push(Box::new(WhatsAppNotifier::new(whatsapp.clone())));
    }

    let fanout = FanoutNotifier::new(targets);
    if fanout.is_empty() {
        warn!("No email or WhatsApp settings found, reports will only be logged");
        return Ok((Box::new(NoopNotifier), Vec::new()));
    }
    let names = fanout.names().into_iter().map(String::from).collect();
    Ok((Box::new(fanout), names))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    config.log_redacted();

    let rules = RuleBook::load(config.rules_path.as_deref())?;
    let checker = ViolationChecker::new(rules);
    info!(
        names = checker.rules().official_names.len(),
        regions = checker.rules().regions.len(),
        "Rule tables ready"
    );
    let reviewer = OpenAiReviewer::new(&config.openai_api_key, &config.openai_model)
        .with_base_url(&config.openai_base_url);
    info!(model = reviewer.model(), "Grammar reviewer ready");
    let fetcher = NewsSiteFetcher::new(&config.target_url, &config.base_url)?;
    let (notifier, notifier_names) = build_notifier(&config)?;
    let store = Arc::new(SqliteStore::new(&config.database_path).await?);
    info!("Database holds {} processed articles", store.count().await?);

    if let Some(port) = args.health_port.or(config.health_port) {
        let state = HealthState::new(
            Arc::clone(&store),
            ServiceInfo {
                target_url: config.target_url.clone(),
                model: reviewer.model().to_string(),
                notifiers: notifier_names,
                check_interval_minutes: config.check_interval_minutes,
            },
        );
        tokio::spawn(async move {
            if let Err(e) = health::serve(port, state).await {
                error!(error = %e, "Health check server stopped");
            }
        });
    }

    let monitor = Monitor::new(fetcher, reviewer, notifier, store, checker)
        .with_visit_policy(config.visit_policy)
        .with_notify_on_clean(config.notify_on_clean)
        .with_article_delay(config.article_delay());

    if args.once {
        let summary = monitor.run_once().await?;
        info!(?summary, "Single check finished");
        return Ok(());
    }

    info!(
        "Starting news monitor, checking every {} minutes",
        config.check_interval_minutes
    );
    tokio::select! {
        _ = monitor.run_forever(config.check_interval()) => {}
        _ = tokio::signal::ctrl_c() => info!("Monitor stopped by user"),
    }

    Ok(())
}
