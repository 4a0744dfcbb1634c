//! Resource extraction and config-source normalization for
//! [xDS](https://www.envoyproxy.io/docs/envoy/latest/api-docs/xds_protocol) clients.
//!
//! This crate is the layer between an xDS transport and the code that
//! applies configuration. It handles:
//! - Unpacking the type-erased resources of a discovery response into typed
//!   values, enforcing that every entry has the requested type
//! - Normalizing API config sources (refresh delay, request timeout) and
//!   translating the legacy polling descriptor into the canonical form
//! - Stamping the local node identity onto outgoing requests
//!
//! It does NOT contain:
//! - Transports, streams or the subscription/ACK/NACK state machine
//! - Semantic validation of the decoded resources
//!
//! Every operation is synchronous and holds no state between calls.
//!
//! # Example
//!
//! ```ignore
//! use xds_config::{ProstCodec, XdsCodec, extract_typed, local_info_to_node};
//!
//! // Before each request, stamp the node with the current identity.
//! local_info_to_node(&local_info, &mut node);
//!
//! // When a response arrives, decode it and extract its resources.
//! let response = ProstCodec.decode_response(bytes)?;
//! let assignments = extract_typed::<ClusterLoadAssignment>(&response)?;
//! ```
//!
//! # Feature Flags
//!
//! - `codegen-prost`: Enables the prost codec and the [`Resource`]
//!   implementations for the `envoy-types` Listener, RouteConfiguration,
//!   Cluster and ClusterLoadAssignment messages. Enabled by default.

pub mod codec;
pub mod config_source;
pub mod error;
pub mod extract;
pub mod local_info;
pub mod message;
pub mod resource;

pub use codec::XdsCodec;
pub use config_source::{
    ApiConfigSource, ApiType, ConfigSource, ConfigSourceSpecifier, LegacyPollConfig,
    check_api_config_source, refresh_delay, request_timeout, translate_legacy,
};
pub use error::{BoxError, Error, Result};
pub use extract::{ExtractPolicy, TypedExtractor, extract_typed};
pub use local_info::{LocalIdentity, LocalInfo, check_local_info, local_info_to_node};
pub use message::{
    DiscoveryRequest, DiscoveryResponse, ErrorDetail, Locality, Metadata, MetadataValue, Node,
    ResourceAny,
};
pub use resource::{DecodedResource, Resource, ResourceRegistry};

// Prost codec
#[cfg(feature = "codegen-prost")]
pub use codec::prost::ProstCodec;
