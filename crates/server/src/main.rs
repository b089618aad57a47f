use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use poise::serenity_prelude as serenity;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warnbot_core::{
    load_config, validate_config, ControlDispatcher, EscalationPolicy, LifecycleSettings,
    NoticeParser, TicketLifecycle, TicketRegistry, WarningCounter,
};
use warnbot_server::api::serve_liveness;
use warnbot_server::bot::{self, Data, SerenityPlatform};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,serenity=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting warnbot {}", VERSION);

    let config_path = std::env::var("WARNBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let token = std::env::var("DISCORD_TOKEN").context("DISCORD_TOKEN is not set")?;

    info!("Warn counts stored in {:?}", config.storage.warns_path);
    info!("Tickets stored in {:?}", config.storage.tickets_path);

    let registry = Arc::new(TicketRegistry::new(&config.storage.tickets_path));
    let dispatcher = Arc::new(ControlDispatcher::new());
    let warnings = Arc::new(WarningCounter::new(
        &config.storage.warns_path,
        EscalationPolicy::from_config(&config.warnings),
        NoticeParser::from_config(&config.warnings),
    ));
    let settings = LifecycleSettings::from_config(&config);

    if config.liveness.enabled {
        tokio::spawn(serve_liveness(config.liveness.clone()));
    } else {
        info!("Liveness endpoint disabled");
    }

    let framework = poise::Framework::builder()
        .options(bot::framework_options())
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let platform = Arc::new(SerenityPlatform::new(ctx.http.clone(), ready.user.id));
                let lifecycle = Arc::new(TicketLifecycle::new(
                    registry,
                    dispatcher,
                    platform.clone(),
                    settings,
                ));

                // Buttons issued before the restart become live again
                let report = lifecycle
                    .rehydrate()
                    .context("Failed to rehydrate ticket controls")?;
                info!(
                    bound = report.bound(),
                    inactive = report.inactive,
                    "Logged in as {}",
                    ready.user.name
                );

                Ok(Data {
                    lifecycle,
                    warnings,
                    platform,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, disconnecting");
        shard_manager.shutdown_all().await;
    });

    client.start().await.context("Discord client stopped")?;

    info!("Bot stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
