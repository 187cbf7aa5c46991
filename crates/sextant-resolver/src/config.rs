use crate::error::ConfigError;
use crate::table::StrategyTable;
use serde::{Deserialize, Serialize};
use sextant_core::{ClientScheme, QuorumRule};
use std::time::Duration;

/// Resolver configuration, usually loaded from the test harness' JSON.
///
/// ```json
/// { "schemes": ["hyperledger-besu-ibft2"], "request_timeout_ms": 10000, "quorum": "two-thirds" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Scheme identifiers this resolver accepts. Unknown identifiers are rejected on load.
    pub schemes: Vec<String>,
    /// Deadline for a whole resolve call, across all collaborator calls.
    pub request_timeout_ms: Option<u64>,
    /// Quorum rule for committee seals.
    pub quorum: QuorumRule,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            schemes: ClientScheme::ALL.iter().map(|s| s.id().to_string()).collect(),
            request_timeout_ms: None,
            quorum: QuorumRule::default(),
        }
    }
}

impl ResolverConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.enabled_schemes()?;
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Parse the configured identifiers.
    pub fn enabled_schemes(&self) -> Result<Vec<ClientScheme>, ConfigError> {
        if self.schemes.is_empty() {
            return Err(ConfigError::NoSchemes);
        }
        let mut schemes = Vec::with_capacity(self.schemes.len());
        for id in &self.schemes {
            let scheme: ClientScheme = id.parse()?;
            if schemes.contains(&scheme) {
                return Err(ConfigError::DuplicateScheme { scheme });
            }
            schemes.push(scheme);
        }
        Ok(schemes)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn strategy_table(&self) -> Result<StrategyTable, ConfigError> {
        StrategyTable::with_defaults(self.enabled_schemes()?, self.quorum)
    }
}
