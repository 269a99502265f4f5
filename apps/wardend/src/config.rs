use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use backup_store::S3Settings;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub use_ssl: bool,
    pub bucket: String,
    pub object_key: String,
    pub dir: PathBuf,
    pub memory_mb: u32,
    pub jar: String,
    pub save_interval_secs: u64,
    pub max_backup_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            use_ssl: true,
            bucket: String::new(),
            object_key: "world.tar.gz".to_string(),
            dir: PathBuf::from("."),
            memory_mb: 1024,
            jar: "minecraft_server.jar".to_string(),
            save_interval_secs: 30,
            max_backup_attempts: 5,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            bail!("object storage endpoint is required");
        }
        if self.bucket.is_empty() {
            bail!("backup bucket is required");
        }
        if self.save_interval_secs == 0 {
            bail!("save interval must be at least one second");
        }
        Ok(())
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs)
    }

    /// Idle checks run at twice the autosave period.
    pub fn idle_interval(&self) -> Duration {
        self.save_interval() * 2
    }

    pub fn launch_command(&self) -> (String, Vec<String>) {
        (
            "java".to_string(),
            vec![
                format!("-Xmx{}M", self.memory_mb),
                format!("-Xms{}M", self.memory_mb),
                "-jar".to_string(),
                self.jar.clone(),
                "nogui".to_string(),
            ],
        )
    }

    pub fn store_settings(&self) -> S3Settings {
        S3Settings {
            endpoint: self.endpoint.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            use_ssl: self.use_ssl,
            bucket: self.bucket.clone(),
            object_key: self.object_key.clone(),
        }
    }
}
