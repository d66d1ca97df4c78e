use clap::Parser;
use etherea_core::{EmotionVector, EthereaConfig, ProactiveTrigger, SignalSink};
use etherea_ei::{load_last_emotion, save_emotion, EiEngine};
use etherea_memory::SqlitePreferences;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod input;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "etherea.toml")]
    config: PathBuf,

    /// Override the preference database path
    #[arg(long)]
    db: Option<String>,

    /// Run without persisting the emotion vector
    #[arg(long)]
    no_store: bool,
}

/// Prints triggers to stdout as JSON lines; snapshots go to the trace log.
struct StdoutSink;

impl SignalSink for StdoutSink {
    fn emotion_updated(&self, vector: EmotionVector) {
        tracing::trace!(
            "focus={:.2} stress={:.2} energy={:.2} curiosity={:.2} flow={:.2}",
            vector.focus,
            vector.stress,
            vector.energy,
            vector.curiosity,
            vector.flow
        );
    }

    fn proactive_trigger(&self, trigger: ProactiveTrigger) {
        info!("Proactive trigger: {}", trigger);
        println!("{}", serde_json::json!({ "kind": trigger.as_str() }));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = EthereaConfig::load_or_default(&args.config);
    if let Some(db) = args.db {
        config.storage.db_path = db;
    }

    // Persistence is best-effort: a broken database degrades to no store.
    let store: Option<Arc<SqlitePreferences>> = if config.storage.enabled && !args.no_store {
        info!("Opening preference store at {}...", config.storage.db_path);
        match SqlitePreferences::new(&config.storage.db_path).await {
            Ok(s) => Some(Arc::new(s)),
            Err(e) => {
                warn!("Preference store unavailable, continuing without it: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let mut builder = EiEngine::builder()
        .config(config.engine.clone())
        .dynamics(config.dynamics.clone())
        .sink(Arc::new(StdoutSink));
    if let Some(store) = &store {
        builder = builder.store(store.clone());
    }
    let engine = builder.build();

    if let Some(store) = &store {
        if let Some(last) = load_last_emotion(&**store).await {
            info!("Restoring last emotion {:?}", last);
            engine.restore(last);
        }
    }

    engine.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = input::apply_line(&engine, &line) {
                        warn!("Skipping input line: {:#}", e);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            },
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }

    engine.stop().await;
    let last = engine.snapshot();

    if let Some(store) = &store {
        if let Err(e) = save_emotion(&**store, &last).await {
            warn!("Final emotion not saved: {}", e);
        }
    }

    println!("{}", serde_json::to_string(&last)?);
    Ok(())
}
