//! Config source descriptors and their normalization.
//!
//! A [`ConfigSource`] tells the subscription layer where a resource type is
//! fetched from. The only variant this crate interprets is the
//! [`ApiConfigSource`], which names the mechanism, the backing clusters and
//! the polling cadence. The deprecated single-cluster polling descriptor,
//! [`LegacyPollConfig`], is translated into that form by
//! [`translate_legacy`].

use std::time::Duration;

use crate::error::{Error, Result};

/// Request timeout used when an [`ApiConfigSource`] does not set one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(1000);

/// The mechanism used to fetch resources from the management server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiType {
    /// The deprecated v1 REST polling API.
    RestLegacy,
    /// REST-JSON polling of the v2+ discovery API.
    Rest,
    /// Per-type gRPC streams.
    Grpc,
    /// A single aggregated gRPC stream for all types.
    AggregatedGrpc,
}

impl ApiType {
    /// Returns true for the polling (non-streaming) mechanisms.
    pub fn is_rest(self) -> bool {
        matches!(self, Self::RestLegacy | Self::Rest)
    }

    /// The wire name of this API type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RestLegacy => "REST_LEGACY",
            Self::Rest => "REST",
            Self::Grpc => "GRPC",
            Self::AggregatedGrpc => "AGGREGATED_GRPC",
        }
    }
}

/// Describes how and from where a resource type is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfigSource {
    /// The fetch mechanism.
    pub api_type: ApiType,
    /// Clusters hosting the management server, in priority order.
    pub cluster_names: Vec<String>,
    /// Polling interval for REST mechanisms.
    pub refresh_delay: Option<Duration>,
    /// Per-request timeout for REST mechanisms.
    pub request_timeout: Option<Duration>,
}

impl ApiConfigSource {
    /// Create a source of the given type with no clusters or timings.
    pub fn new(api_type: ApiType) -> Self {
        Self {
            api_type,
            cluster_names: Vec::new(),
            refresh_delay: None,
            request_timeout: None,
        }
    }

    /// Append a backing cluster.
    pub fn with_cluster_name(mut self, cluster_name: impl Into<String>) -> Self {
        self.cluster_names.push(cluster_name.into());
        self
    }

    /// Set the polling interval.
    pub fn with_refresh_delay(mut self, refresh_delay: Duration) -> Self {
        self.refresh_delay = Some(refresh_delay);
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = Some(request_timeout);
        self
    }
}

/// The specifier of a [`ConfigSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSourceSpecifier {
    /// Fetch through the described API.
    ApiConfigSource(ApiConfigSource),
    /// Fetch over the aggregated discovery stream.
    Ads,
}

/// Where a resource type is fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    /// How to fetch; `None` if the source has not been configured.
    pub specifier: Option<ConfigSourceSpecifier>,
    /// How long to wait for the first response before giving up on it.
    pub initial_fetch_timeout: Option<Duration>,
}

impl ConfigSource {
    /// Returns the API source, if this is one.
    pub fn api_config_source(&self) -> Option<&ApiConfigSource> {
        match &self.specifier {
            Some(ConfigSourceSpecifier::ApiConfigSource(source)) => Some(source),
            _ => None,
        }
    }

    /// Returns true if this source holds an [`ApiConfigSource`].
    pub fn has_api_config_source(&self) -> bool {
        self.api_config_source().is_some()
    }
}

impl From<ApiConfigSource> for ConfigSource {
    fn from(source: ApiConfigSource) -> Self {
        Self {
            specifier: Some(ConfigSourceSpecifier::ApiConfigSource(source)),
            initial_fetch_timeout: None,
        }
    }
}

/// The deprecated single-cluster polling descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyPollConfig {
    /// The cluster serving the legacy discovery API.
    pub cluster_name: String,
    /// Polling interval.
    pub refresh_delay: Duration,
}

impl LegacyPollConfig {
    /// Create a legacy descriptor.
    pub fn new(cluster_name: impl Into<String>, refresh_delay: Duration) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            refresh_delay,
        }
    }
}

impl From<LegacyPollConfig> for ConfigSource {
    fn from(legacy: LegacyPollConfig) -> Self {
        let mut out = ConfigSource::default();
        translate_legacy(&legacy, &mut out);
        out
    }
}

/// Returns the polling interval of `source`.
///
/// # Errors
///
/// Returns [`Error::MissingField`] if `refresh_delay` is unset. There is no
/// default: a missing interval is a configuration error.
pub fn refresh_delay(source: &ApiConfigSource) -> Result<Duration> {
    source.refresh_delay.ok_or(Error::MissingField {
        field: "ApiConfigSource.refresh_delay",
    })
}

/// Returns the per-request timeout of `source`, or
/// [`DEFAULT_REQUEST_TIMEOUT`] if unset.
pub fn request_timeout(source: &ApiConfigSource) -> Duration {
    source.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT)
}

/// Checks the cluster list of `source`.
///
/// At least one non-empty cluster name is required, and REST mechanisms
/// poll a single cluster, so they must name exactly one.
pub fn check_api_config_source(source: &ApiConfigSource) -> Result<()> {
    if source.cluster_names.is_empty() {
        return Err(Error::Validation(format!(
            "API configs of type {} must name at least one cluster",
            source.api_type.as_str()
        )));
    }

    if source.api_type.is_rest() && source.cluster_names.len() != 1 {
        return Err(Error::Validation(format!(
            "API configs of type {} must have exactly one cluster, found {}",
            source.api_type.as_str(),
            source.cluster_names.len()
        )));
    }

    if let Some(index) = source.cluster_names.iter().position(String::is_empty) {
        return Err(Error::Validation(format!(
            "ApiConfigSource.cluster_names[{index}] is empty"
        )));
    }

    Ok(())
}

/// Overwrites `out` with the canonical form of `legacy`: a
/// [`ApiType::RestLegacy`] source polling `legacy.cluster_name` every
/// `legacy.refresh_delay`.
///
/// Only the specifier of `out` is replaced.
pub fn translate_legacy(legacy: &LegacyPollConfig, out: &mut ConfigSource) {
    tracing::debug!(
        cluster = %legacy.cluster_name,
        refresh_delay = ?legacy.refresh_delay,
        "translating legacy poll config"
    );

    let source = ApiConfigSource::new(ApiType::RestLegacy)
        .with_cluster_name(legacy.cluster_name.clone())
        .with_refresh_delay(legacy.refresh_delay);
    out.specifier = Some(ConfigSourceSpecifier::ApiConfigSource(source));
}
