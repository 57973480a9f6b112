//! Provider configuration loaded from TOML.
//!
//! ```toml
//! region = "us-east-1"
//! invocation_budget_secs = 600
//!
//! [stabilization."AWS::QBusiness::Index/Create"]
//! strategy = "exponential"
//! delay_secs = 5
//! max_delay_secs = 60
//! timeout_secs = 7200
//! ```

use crate::error::{ProviderError, ProviderResult};
use crate::request::Action;
use crate::stabilize::{BackoffScheduler, DelayStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "QBUSINESS_PROVIDER_CONFIG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Constant,
    Exponential,
}

/// Overrides for one `<ResourceType>/<Action>` stabilization budget.
/// Unset fields keep the handler's built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StabilizationSettings {
    pub strategy: Option<StrategyKind>,
    pub delay_secs: Option<u64>,
    pub max_delay_secs: Option<u64>,
    pub multiplier: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl StabilizationSettings {
    /// Zero delays would poll the service back to back; zero timeouts and
    /// multipliers never make progress.
    fn validate(&self, key: &str) -> ProviderResult<()> {
        let zero = [
            ("delay_secs", self.delay_secs == Some(0)),
            ("max_delay_secs", self.max_delay_secs == Some(0)),
            ("multiplier", self.multiplier == Some(0)),
            ("timeout_secs", self.timeout_secs == Some(0)),
            ("max_attempts", self.max_attempts == Some(0)),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(ProviderError::config(format!(
                "Invalid stabilization settings for '{key}': {field} must be greater than zero"
            ))),
            None => Ok(()),
        }
    }

    pub fn apply_to(&self, base: BackoffScheduler) -> BackoffScheduler {
        let (base_delay, base_max, base_multiplier) = match base.strategy() {
            DelayStrategy::Constant(delay) => (delay, delay, 2),
            DelayStrategy::Exponential {
                initial,
                max,
                multiplier,
            } => (initial, max, multiplier),
        };
        let delay = self.delay_secs.map_or(base_delay, Duration::from_secs);

        let strategy = match self.strategy {
            None => match base.strategy() {
                DelayStrategy::Constant(_) => DelayStrategy::Constant(delay),
                DelayStrategy::Exponential { .. } => DelayStrategy::Exponential {
                    initial: delay,
                    max: self.max_delay_secs.map_or(base_max, Duration::from_secs),
                    multiplier: self.multiplier.unwrap_or(base_multiplier),
                },
            },
            Some(StrategyKind::Constant) => DelayStrategy::Constant(delay),
            Some(StrategyKind::Exponential) => DelayStrategy::Exponential {
                initial: delay,
                max: self
                    .max_delay_secs
                    .map_or(base_max.max(delay), Duration::from_secs),
                multiplier: self.multiplier.unwrap_or(base_multiplier),
            },
        };

        let mut scheduler = base.with_strategy(strategy);
        if let Some(timeout) = self.timeout_secs {
            scheduler = scheduler.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(max_attempts) = self.max_attempts {
            scheduler = scheduler.with_max_attempts(max_attempts);
        }
        scheduler
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Overrides the region resolved by the AWS default provider chain.
    pub region: Option<String>,
    /// Longest time one invocation may spend sleeping between probes before
    /// handing back an IN_PROGRESS event with a callback context.
    pub invocation_budget_secs: Option<u64>,
    #[serde(default)]
    pub stabilization: BTreeMap<String, StabilizationSettings>,
}

impl ProviderConfig {
    pub fn from_toml_str(content: &str) -> ProviderResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ProviderError::config(format!("Failed to parse provider config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ProviderResult<()> {
        for (key, settings) in &self.stabilization {
            settings.validate(key)?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> ProviderResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::config(format!(
                "Failed to read provider config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn invocation_budget(&self) -> Option<Duration> {
        self.invocation_budget_secs.map(Duration::from_secs)
    }

    /// Scheduler for `type_name`/`action`, starting from the handler's default.
    pub fn scheduler_for(
        &self,
        type_name: &str,
        action: Action,
        default: BackoffScheduler,
    ) -> BackoffScheduler {
        let key = format!("{type_name}/{action}");
        match self.stabilization.get(&key) {
            Some(settings) => settings.apply_to(default),
            None => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const DEFAULT: BackoffScheduler =
        BackoffScheduler::constant(Duration::from_secs(30), Duration::from_secs(4 * 3600));

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = ProviderConfig::from_toml_str("").unwrap();
        assert_eq!(
            config.scheduler_for("AWS::QBusiness::Index", Action::Create, DEFAULT),
            DEFAULT
        );
        assert_eq!(config.invocation_budget(), None);
    }

    #[test]
    fn test_override_for_resource_and_action() {
        let config = ProviderConfig::from_toml_str(
            r#"
            invocation_budget_secs = 600

            [stabilization."AWS::QBusiness::Index/Create"]
            strategy = "exponential"
            delay_secs = 2
            max_delay_secs = 60
            timeout_secs = 120
            max_attempts = 10
            "#,
        )
        .unwrap();

        let scheduler = config.scheduler_for("AWS::QBusiness::Index", Action::Create, DEFAULT);
        assert_eq!(
            scheduler.strategy(),
            DelayStrategy::Exponential {
                initial: Duration::from_secs(2),
                max: Duration::from_secs(60),
                multiplier: 2,
            }
        );
        assert_eq!(scheduler.timeout(), Duration::from_secs(120));
        assert_eq!(scheduler.max_attempts(), Some(10));
        assert_eq!(config.invocation_budget(), Some(Duration::from_secs(600)));

        // Other actions are untouched.
        assert_eq!(
            config.scheduler_for("AWS::QBusiness::Index", Action::Delete, DEFAULT),
            DEFAULT
        );
    }

    #[test]
    fn test_partial_override_keeps_strategy() {
        let settings = StabilizationSettings {
            timeout_secs: Some(60),
            ..StabilizationSettings::default()
        };
        let scheduler = settings.apply_to(DEFAULT);
        assert_eq!(
            scheduler.strategy(),
            DelayStrategy::Constant(Duration::from_secs(30))
        );
        assert_eq!(scheduler.timeout(), Duration::from_secs(60));
    }

    #[rstest]
    #[case("delay_secs = 0", "delay_secs")]
    #[case("strategy = \"exponential\"\nmultiplier = 0", "multiplier")]
    #[case("timeout_secs = 0", "timeout_secs")]
    #[case("max_delay_secs = 0", "max_delay_secs")]
    #[case("max_attempts = 0", "max_attempts")]
    fn test_zero_valued_settings_are_rejected(#[case] settings: &str, #[case] field: &str) {
        let content = format!("[stabilization.\"AWS::QBusiness::Index/Create\"]\n{settings}\n");
        let error = ProviderConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(error, ProviderError::Config(_)));
        assert!(error.to_string().contains(field), "{error}");
        assert!(error.to_string().contains("AWS::QBusiness::Index/Create"));
    }

    #[test]
    fn test_zero_delay_in_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stabilization.\"AWS::QBusiness::Plugin/Update\"]").unwrap();
        writeln!(file, "delay_secs = 0").unwrap();
        writeln!(file, "timeout_secs = 1").unwrap();
        assert!(matches!(
            ProviderConfig::load(file.path()),
            Err(ProviderError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(ProviderConfig::from_toml_str("retries = 3").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "region = \"eu-west-1\"").unwrap();
        let config = ProviderConfig::load(file.path()).unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = ProviderConfig::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ProviderError::Config(_))));
    }
}
