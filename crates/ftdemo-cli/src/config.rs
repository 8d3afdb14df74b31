//! Configuration of the `ftdemo` binary.
//!
//! Precedence, lowest first: built-in defaults, the YAML file
//! (`--config`, else `~/.ftdemo/config.yaml` when present), then `FTDEMO_*`
//! environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ftdemo_adapter_sim::SimulatorConfig;
use ftdemo_analysis::DEFAULT_CONFIDENCE;
use ftdemo_analysis::tdist::check_confidence;
use ftdemo_catalog::{BitOrder, Mapping, QubitPair, default_pairs};
use ftdemo_hal::WaitPolicy;

/// Full configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of every data artifact.
    pub data_dir: PathBuf,
    /// Physical pairs used for bare circuits.
    pub pairs: Vec<QubitPair>,
    /// Physical qubit of each code role.
    pub mapping: Mapping,
    /// Bit layout of the backend's bitstrings.
    pub bit_order: BitOrder,
    /// Shots per circuit.
    pub shots: u32,
    /// Confidence level of the aggregated error bars.
    pub confidence: f64,
    /// Local simulator settings.
    pub simulator: SimulatorSection,
    /// Polling and re-fetch settings.
    pub wait: WaitSection,
}

/// Simulator settings plus the artificial queue delay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSection {
    /// Seed and noise.
    #[serde(flatten)]
    pub backend: SimulatorConfig,
    /// Status queries a job stays queued for.
    pub queue_polls: u32,
}

/// How long to wait for a job and how often to retry timed-out ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSection {
    /// Delay between status queries, in milliseconds.
    pub poll_interval_ms: u64,
    /// Give up on a job after this many seconds.
    pub timeout_secs: u64,
    /// Re-fetch passes over timed-out jobs after a run.
    pub refetch_rounds: u32,
}

impl Default for WaitSection {
    fn default() -> Self {
        let policy = WaitPolicy::default();
        Self {
            poll_interval_ms: policy.poll_interval.as_millis() as u64,
            timeout_secs: policy.timeout.as_secs(),
            refetch_rounds: 3,
        }
    }
}

impl WaitSection {
    /// The polling schedule for [`ftdemo_hal::Backend::wait`].
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pairs: default_pairs(),
            mapping: Mapping::default(),
            bit_order: BitOrder::default(),
            shots: 8192,
            confidence: DEFAULT_CONFIDENCE,
            simulator: SimulatorSection::default(),
            wait: WaitSection::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ftdemo").join("data"))
        .unwrap_or_else(|| PathBuf::from("ftdemo-data"))
}

/// `~/.ftdemo/config.yaml`, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ftdemo").join("config.yaml"))
}

impl Config {
    /// Load a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml_ng::from_str(&contents).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load with file, environment and validation applied in order.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "using default configuration file");
                    Self::from_file(&path)?
                }
                _ => Self::default(),
            },
        };
        let config = config.merge_vars(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `FTDEMO_*` overrides looked up through `lookup`.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("FTDEMO_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(v) = lookup("FTDEMO_SHOTS") {
            match v.parse() {
                Ok(shots) => self.shots = shots,
                Err(_) => warn!(value = %v, "ignoring invalid FTDEMO_SHOTS"),
            }
        }
        if let Some(v) = lookup("FTDEMO_CONFIDENCE") {
            match v.parse() {
                Ok(confidence) => self.confidence = confidence,
                Err(_) => warn!(value = %v, "ignoring invalid FTDEMO_CONFIDENCE"),
            }
        }
        self
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            bail!("At least one qubit pair is required");
        }
        for (i, pair) in self.pairs.iter().enumerate() {
            if self.pairs[..i].contains(pair) {
                bail!("Qubit pair {pair} listed twice");
            }
        }
        if self.mapping != Mapping::default() {
            warn!(
                mapping = ?<[u32; 4]>::from(self.mapping),
                "state preparations assume the default mapping [3, 2, 1, 4]"
            );
        }
        if self.shots == 0 {
            bail!("shots must be greater than 0");
        }
        check_confidence(self.confidence).context("Invalid confidence")?;
        if self.wait.poll_interval_ms == 0 {
            bail!("wait.poll_interval_ms must be greater than 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pairs.len(), 6);
        assert_eq!(config.confidence, 0.99);
        assert_eq!(config.wait.policy(), WaitPolicy::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
data_dir: /tmp/ftdemo
pairs: [[2, 0], [3, 4]]
bit_order: qubit_zero_last
simulator:
  seed: 7
  gate_error: 0.01
  queue_polls: 2
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/ftdemo"));
        assert_eq!(config.pairs[1], QubitPair::new(3, 4).unwrap());
        assert_eq!(config.bit_order, BitOrder::QubitZeroLast);
        assert_eq!(config.simulator.backend.seed, Some(7));
        assert_eq!(config.simulator.queue_polls, 2);
        assert_eq!(config.shots, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_pair_fails_to_parse() {
        assert!(serde_yaml_ng::from_str::<Config>("pairs: [[1, 1]]").is_err());
        assert!(serde_yaml_ng::from_str::<Config>("pairs: [[0, 5]]").is_err());
        assert!(serde_yaml_ng::from_str::<Config>("mapping: [3, 2, 1, 1]").is_err());
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = Config::default();
        config.pairs = vec![];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pairs.push(config.pairs[0]);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.confidence = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.shots = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.mapping = Mapping::new([1, 2, 3, 4]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars = |key: &str| match key {
            "FTDEMO_DATA_DIR" => Some("/data".to_string()),
            "FTDEMO_SHOTS" => Some("100".to_string()),
            "FTDEMO_CONFIDENCE" => Some("not a number".to_string()),
            _ => None,
        };
        let config = Config::default().merge_vars(vars);
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.shots, 100);
        assert_eq!(config.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "shots: 64\nconfidence: 0.95\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.shots, 64);
        assert_eq!(config.confidence, 0.95);

        std::fs::write(&path, "shots: many\n").unwrap();
        assert!(Config::from_file(&path).is_err());
        assert!(Config::from_file(&dir.path().join("missing.yaml")).is_err());
    }
}
