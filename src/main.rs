//! Daemon entrypoint: load the config file, mirror it into Redis, and keep
//! mirroring until terminated.

use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use twitch_bot_config::document;
use twitch_bot_config::prelude::*;

#[tokio::main]
async fn main() {
    // Startup errors are fatal and happen before the subscriber exists.
    let path = document::resolve_config_file().unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    let initial = Document::load(&path).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });

    let raw_level = initial.get_string("log.level");
    let level: tracing::Level = raw_level.parse().unwrap_or_else(|_| {
        eprintln!("{}", SyncError::InvalidLogLevel { raw: raw_level });
        std::process::exit(1);
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::new(level.to_string()))
        .init();

    let settings = StoreSettings::from_env();
    let store = RedisStore::connect(&settings).unwrap_or_else(|e| {
        error!(error = %e, "failed to build store handle");
        std::process::exit(1);
    });

    let sync = ConfigSync::new(&path, initial, store);

    tokio::select! {
        result = sync.run() => {
            if let Err(e) = result {
                error!(error = %e, "configuration sync stopped");
                std::process::exit(1);
            }
        }
        _ = shutdown_signal() => {
            // Immediate exit, no drain of in-flight publishes.
            warn!("termination signal received, closing program");
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
