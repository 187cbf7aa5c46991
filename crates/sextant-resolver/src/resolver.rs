use crate::config::ResolverConfig;
use crate::deadline::Deadline;
use crate::error::{ConfigError, ResolveError};
use crate::source::ProofSource;
use crate::strategy::StateRequest;
use crate::table::StrategyTable;
use alloy_primitives::{Address, Bytes};
use sextant_core::{BlockNumber, ClientScheme, LightClientState};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Resolves light client states by dispatching on the client scheme.
///
/// Holds no per-call state: every `resolve` fetches fresh data, nothing is
/// cached, and concurrent calls on a shared `&StateResolver` are independent.
pub struct StateResolver<S> {
    source: S,
    table: StrategyTable,
    request_timeout: Option<Duration>,
}

impl<S: ProofSource> StateResolver<S> {
    /// A resolver with the default strategy for every supported scheme.
    pub fn new(source: S) -> Self {
        Self::with_table(source, StrategyTable::default())
    }

    pub fn with_table(source: S, table: StrategyTable) -> Self {
        Self {
            source,
            table,
            request_timeout: None,
        }
    }

    /// Build from configuration. Unknown scheme identifiers fail here,
    /// before any state is ever requested.
    pub fn from_config(source: S, config: &ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = config.strategy_table()?;
        Ok(Self::with_table(source, table).with_request_timeout(config.request_timeout()))
    }

    /// Bound each resolve call, across all of its collaborator calls.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn schemes(&self) -> impl Iterator<Item = ClientScheme> + '_ {
        self.table.schemes()
    }

    /// Resolve the state of `address` at `height` for the scheme named `scheme`.
    ///
    /// An identifier that is unknown or not enabled fails with a
    /// configuration error before the proof source is contacted.
    pub async fn resolve(
        &self,
        scheme: &str,
        address: Address,
        storage_keys: &[Bytes],
        height: impl Into<BlockNumber>,
    ) -> Result<LightClientState, ResolveError> {
        let scheme = parse_scheme(scheme)?;
        self.resolve_scheme(scheme, address, storage_keys, height).await
    }

    /// Like [`resolve`](Self::resolve) for an already parsed scheme.
    pub async fn resolve_scheme(
        &self,
        scheme: ClientScheme,
        address: Address,
        storage_keys: &[Bytes],
        height: impl Into<BlockNumber>,
    ) -> Result<LightClientState, ResolveError> {
        let strategy = self.table.get(scheme).ok_or_else(|| {
            warn!(%scheme, "client scheme not enabled");
            ResolveError::SchemeNotRegistered { scheme }
        })?;

        let request = StateRequest {
            address,
            storage_keys,
            height: height.into(),
        };
        let deadline = Deadline::after(self.request_timeout);

        debug!(
            %scheme,
            authenticated = scheme.authenticates_consensus(),
            %address,
            height = %request.height,
            keys = storage_keys.len(),
            "resolving light client state"
        );

        match strategy.resolve(&self.source, &request, &deadline).await {
            Ok(state) => {
                info!(
                    %scheme,
                    number = state.header().number,
                    proofs = state.proof().len(),
                    seals = state.commit_seals().map_or(0, <[_]>::len),
                    "resolved light client state"
                );
                Ok(state)
            }
            Err(e) => {
                warn!(
                    %scheme,
                    height = %request.height,
                    kind = ?e.kind(),
                    error = %e,
                    "failed to resolve light client state"
                );
                Err(e)
            }
        }
    }

    /// Fix the scheme once, validating it now rather than on every call.
    pub fn bind(&self, scheme: &str) -> Result<BoundResolver<'_, S>, ResolveError> {
        let scheme = parse_scheme(scheme)?;
        if !self.table.contains(scheme) {
            return Err(ResolveError::SchemeNotRegistered { scheme });
        }
        Ok(BoundResolver {
            resolver: self,
            scheme,
        })
    }
}

fn parse_scheme(id: &str) -> Result<ClientScheme, ResolveError> {
    id.parse().map_err(|e| {
        warn!(scheme = id, "unknown client scheme");
        ResolveError::UnknownScheme(e)
    })
}

/// A resolver tied to one validated scheme.
pub struct BoundResolver<'r, S> {
    resolver: &'r StateResolver<S>,
    scheme: ClientScheme,
}

impl<'r, S: ProofSource> BoundResolver<'r, S> {
    pub fn scheme(&self) -> ClientScheme {
        self.scheme
    }

    pub async fn state(
        &self,
        address: Address,
        storage_keys: &[Bytes],
        height: impl Into<BlockNumber>,
    ) -> Result<LightClientState, ResolveError> {
        self.resolver
            .resolve_scheme(self.scheme, address, storage_keys, height)
            .await
    }
}
