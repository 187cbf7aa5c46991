use crate::error::ConfigError;
use crate::strategy::{CommitteeStrategy, ResolveStrategy, SimpleStrategy};
use sextant_core::{ClientScheme, Ibft2HeaderParser, QuorumRule, QuorumSealValidator};
use std::collections::BTreeMap;

/// The closed mapping from client scheme to the strategy that resolves it.
///
/// Built once and validated at registration: every entry is keyed by a
/// known [`ClientScheme`] and no scheme appears twice. Lookups of schemes
/// that were not registered fail instead of falling back to another entry.
pub struct StrategyTable {
    strategies: BTreeMap<ClientScheme, Box<dyn ResolveStrategy>>,
}

impl StrategyTable {
    pub fn builder() -> StrategyTableBuilder {
        StrategyTableBuilder::default()
    }

    /// A table with the default strategy for each of `schemes`.
    pub fn with_defaults(
        schemes: impl IntoIterator<Item = ClientScheme>,
        quorum: QuorumRule,
    ) -> Result<Self, ConfigError> {
        schemes
            .into_iter()
            .try_fold(Self::builder(), |builder, scheme| {
                builder.register_boxed(default_strategy(scheme, quorum))
            })?
            .build()
    }

    pub fn get(&self, scheme: ClientScheme) -> Option<&dyn ResolveStrategy> {
        self.strategies.get(&scheme).map(|s| &**s)
    }

    pub fn contains(&self, scheme: ClientScheme) -> bool {
        self.strategies.contains_key(&scheme)
    }

    /// Registered schemes in a stable order.
    pub fn schemes(&self) -> impl Iterator<Item = ClientScheme> + '_ {
        self.strategies.keys().copied()
    }
}

impl Default for StrategyTable {
    /// Every supported scheme with its default strategy.
    fn default() -> Self {
        let strategies = ClientScheme::ALL
            .into_iter()
            .map(|scheme| (scheme, default_strategy(scheme, QuorumRule::default())))
            .collect();
        Self { strategies }
    }
}

/// The stock strategy for a scheme. Exhaustive, so a new scheme cannot be
/// added without deciding how it resolves.
pub fn default_strategy(scheme: ClientScheme, quorum: QuorumRule) -> Box<dyn ResolveStrategy> {
    match scheme {
        ClientScheme::BesuIbft2 => Box::new(CommitteeStrategy::new(
            Ibft2HeaderParser,
            QuorumSealValidator::new(quorum),
        )),
        ClientScheme::Mock => Box::new(SimpleStrategy),
    }
}

#[derive(Default)]
pub struct StrategyTableBuilder {
    strategies: BTreeMap<ClientScheme, Box<dyn ResolveStrategy>>,
}

impl StrategyTableBuilder {
    pub fn register<S: ResolveStrategy + 'static>(self, strategy: S) -> Result<Self, ConfigError> {
        self.register_boxed(Box::new(strategy))
    }

    pub fn register_boxed(mut self, strategy: Box<dyn ResolveStrategy>) -> Result<Self, ConfigError> {
        let scheme = strategy.scheme();
        if self.strategies.contains_key(&scheme) {
            return Err(ConfigError::DuplicateScheme { scheme });
        }
        self.strategies.insert(scheme, strategy);
        Ok(self)
    }

    pub fn build(self) -> Result<StrategyTable, ConfigError> {
        if self.strategies.is_empty() {
            return Err(ConfigError::NoSchemes);
        }
        Ok(StrategyTable {
            strategies: self.strategies,
        })
    }
}
