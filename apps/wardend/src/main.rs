use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod backup;
mod config;
mod supervisor;

use config::Settings;

#[derive(Parser)]
#[command(name = "wardend")]
#[command(about = "Supervises a Minecraft server and snapshots its world to object storage", long_about = None)]
struct Cli {
    /// Path to a JSON settings file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Object storage endpoint (host:port)
    #[arg(long)]
    endpoint: Option<String>,
    /// Object storage access key
    #[arg(long)]
    access_key: Option<String>,
    /// Object storage secret key
    #[arg(long)]
    secret_key: Option<String>,
    /// Talk to the object store over plain HTTP
    #[arg(long)]
    no_ssl: bool,
    /// Bucket holding the world archive
    #[arg(long)]
    bucket: Option<String>,
    /// Object key for the world archive
    #[arg(long)]
    object: Option<String>,
    /// Server working directory
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Java heap size in megabytes
    #[arg(long)]
    memory: Option<u32>,
    /// Server jar to launch
    #[arg(long)]
    jar: Option<String>,
    /// Seconds between autosave requests
    #[arg(long)]
    save_interval: Option<u64>,
    /// Backup attempts before giving up
    #[arg(long)]
    max_backup_attempts: Option<u32>,
}

impl Cli {
    fn into_settings(self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(endpoint) = self.endpoint {
            settings.endpoint = endpoint;
        }
        if let Some(access_key) = self.access_key {
            settings.access_key = access_key;
        }
        if let Some(secret_key) = self.secret_key {
            settings.secret_key = secret_key;
        }
        if self.no_ssl {
            settings.use_ssl = false;
        }
        if let Some(bucket) = self.bucket {
            settings.bucket = bucket;
        }
        if let Some(object) = self.object {
            settings.object_key = object;
        }
        if let Some(dir) = self.dir {
            settings.dir = dir;
        }
        if let Some(memory) = self.memory {
            settings.memory_mb = memory;
        }
        if let Some(jar) = self.jar {
            settings.jar = jar;
        }
        if let Some(save_interval) = self.save_interval {
            settings.save_interval_secs = save_interval;
        }
        if let Some(attempts) = self.max_backup_attempts {
            settings.max_backup_attempts = attempts;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Cli::parse().into_settings()?;
    supervisor::run(settings).await
}
