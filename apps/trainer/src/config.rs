use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stickwork_audio::SchedulerConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainerConfig {
    pub samples_dir: PathBuf,
    /// Defaults to `<config dir>/stickwork/progress.json`.
    pub state_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub scheduler: SchedulerConfig,
    /// 0 disables the periodic save.
    pub autosave_secs: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            samples_dir: PathBuf::from("samples"),
            state_path: None,
            catalog_path: None,
            scheduler: SchedulerConfig::default(),
            autosave_secs: 30,
        }
    }
}

impl TrainerConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .or_else(default_state_path)
            .unwrap_or_else(|| PathBuf::from("progress.json"))
    }

    pub fn autosave_interval(&self) -> Option<std::time::Duration> {
        (self.autosave_secs > 0).then(|| std::time::Duration::from_secs(self.autosave_secs))
    }
}

fn default_state_path() -> Option<PathBuf> {
    let base = dirs::config_dir()?;
    Some(base.join("stickwork").join("progress.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let config = TrainerConfig::load(None).unwrap();
        assert_eq!(config, TrainerConfig::default());
        assert_eq!(config.scheduler.pool_size, 10);
        assert_eq!(config.autosave_interval(), Some(std::time::Duration::from_secs(30)));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = TrainerConfig::from_yaml_str(
            "samples_dir: /opt/kits\nscheduler:\n  pool_size: 4\n  velocity:\n    edge: 0.3\nautosave_secs: 0\n",
        )
        .unwrap();
        assert_eq!(config.samples_dir, PathBuf::from("/opt/kits"));
        assert_eq!(config.scheduler.pool_size, 4);
        assert_eq!(config.scheduler.release_ms, 500);
        assert_eq!(config.scheduler.velocity.edge, 0.3);
        assert_eq!(config.scheduler.velocity.mid, 0.7);
        assert_eq!(config.autosave_interval(), None);
    }

    #[test]
    fn explicit_state_path_wins() {
        let config = TrainerConfig {
            state_path: Some(PathBuf::from("/tmp/mine.json")),
            ..Default::default()
        };
        assert_eq!(config.state_path(), PathBuf::from("/tmp/mine.json"));
    }

    #[test]
    fn unreadable_config_is_an_error() {
        assert!(TrainerConfig::load(Some(Path::new("/nonexistent/stickwork.yaml"))).is_err());
    }
}
