//! Prost-based codec using envoy-types.
//!
//! Besides [`ProstCodec`], this module converts config-source descriptors
//! between their Envoy v3 protobuf form and the crate-owned types. The
//! wire → crate direction is fallible: negative durations, unknown API types
//! and config-source variants this crate does not interpret are rejected
//! with [`Error::InvalidField`].

use std::time::Duration;

use bytes::Bytes;
use envoy_types::pb::envoy::config::core::v3 as core;
use envoy_types::pb::google::protobuf::{self as pbuf, value::Kind};
use prost::Message;

use crate::codec::XdsCodec;
use crate::config_source::{ApiConfigSource, ApiType, ConfigSource, ConfigSourceSpecifier};
use crate::error::{Error, Result};
use crate::message::{DiscoveryRequest, DiscoveryResponse, Metadata, MetadataValue, ResourceAny};

/// Wire value of the deprecated REST_LEGACY API type.
const REST_LEGACY_WIRE_VALUE: i32 = 0;

/// Largest `seconds` value a `google.protobuf.Duration` may carry (10,000 years).
const MAX_DURATION_SECONDS: u64 = 315_576_000_000;

/// A codec that uses prost/envoy-types for serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProstCodec;

impl XdsCodec for ProstCodec {
    fn encode_request(&self, request: &DiscoveryRequest<'_>) -> Result<Bytes> {
        use envoy_types::pb::envoy::service::discovery::v3 as discovery;
        use envoy_types::pb::google::rpc::Status;

        let node = request.node;
        let proto_request = discovery::DiscoveryRequest {
            version_info: request.version_info.to_owned(),
            node: Some(core::Node {
                id: node.id.clone().unwrap_or_default(),
                cluster: node.cluster.clone().unwrap_or_default(),
                metadata: (!node.metadata.is_empty()).then(|| metadata_to_proto(&node.metadata)),
                user_agent_name: node.user_agent_name.clone(),
                user_agent_version_type: Some(core::node::UserAgentVersionType::UserAgentVersion(
                    node.user_agent_version.clone(),
                )),
                locality: node.locality.as_ref().map(|l| core::Locality {
                    region: l.region.clone(),
                    zone: l.zone.clone(),
                    sub_zone: l.sub_zone.clone(),
                }),
                ..Default::default()
            }),
            resource_names: request.resource_names.to_vec(),
            type_url: request.type_url.to_owned(),
            response_nonce: request.response_nonce.to_owned(),
            error_detail: request.error_detail.as_ref().map(|e| Status {
                code: e.code,
                message: e.message.clone(),
                details: vec![],
            }),
            ..Default::default()
        };

        Ok(proto_request.encode_to_vec().into())
    }

    fn decode_response(&self, bytes: Bytes) -> Result<DiscoveryResponse> {
        use envoy_types::pb::envoy::service::discovery::v3 as discovery;

        let proto_response = discovery::DiscoveryResponse::decode(bytes).map_err(|e| {
            Error::decode(
                "type.googleapis.com/envoy.service.discovery.v3.DiscoveryResponse",
                e,
            )
        })?;

        Ok(DiscoveryResponse {
            version_info: proto_response.version_info,
            resources: proto_response
                .resources
                .into_iter()
                .map(|any| ResourceAny::new(any.type_url, any.value))
                .collect(),
            type_url: proto_response.type_url,
            nonce: proto_response.nonce,
        })
    }
}

fn duration_from_proto(field: &'static str, duration: &pbuf::Duration) -> Result<Duration> {
    if duration.seconds < 0 || !(0..1_000_000_000).contains(&duration.nanos) {
        return Err(Error::InvalidField {
            field,
            reason: format!(
                "expected a non-negative duration, got {}s {}ns",
                duration.seconds, duration.nanos
            ),
        });
    }
    Ok(Duration::new(duration.seconds as u64, duration.nanos as u32))
}

/// Durations beyond the protobuf range saturate at its maximum.
fn duration_to_proto(duration: Duration) -> pbuf::Duration {
    if duration.as_secs() > MAX_DURATION_SECONDS {
        return pbuf::Duration {
            seconds: MAX_DURATION_SECONDS as i64,
            nanos: 999_999_999,
        };
    }
    pbuf::Duration {
        seconds: duration.as_secs() as i64,
        nanos: duration.subsec_nanos() as i32,
    }
}

fn api_type_from_proto(value: i32) -> Result<ApiType> {
    use core::api_config_source::ApiType as Proto;

    if value == REST_LEGACY_WIRE_VALUE {
        return Ok(ApiType::RestLegacy);
    }
    match Proto::try_from(value) {
        Ok(Proto::Rest) => Ok(ApiType::Rest),
        Ok(Proto::Grpc) => Ok(ApiType::Grpc),
        Ok(Proto::AggregatedGrpc) => Ok(ApiType::AggregatedGrpc),
        Ok(other) => Err(Error::InvalidField {
            field: "ApiConfigSource.api_type",
            reason: format!("unsupported api type {}", other.as_str_name()),
        }),
        Err(_) => Err(Error::InvalidField {
            field: "ApiConfigSource.api_type",
            reason: format!("unknown api type value {value}"),
        }),
    }
}

fn api_type_to_proto(api_type: ApiType) -> i32 {
    use core::api_config_source::ApiType as Proto;

    match api_type {
        ApiType::RestLegacy => REST_LEGACY_WIRE_VALUE,
        ApiType::Rest => Proto::Rest as i32,
        ApiType::Grpc => Proto::Grpc as i32,
        ApiType::AggregatedGrpc => Proto::AggregatedGrpc as i32,
    }
}

impl TryFrom<core::ApiConfigSource> for ApiConfigSource {
    type Error = Error;

    fn try_from(proto: core::ApiConfigSource) -> Result<Self> {
        Ok(Self {
            api_type: api_type_from_proto(proto.api_type)?,
            cluster_names: proto.cluster_names,
            refresh_delay: proto
                .refresh_delay
                .as_ref()
                .map(|d| duration_from_proto("ApiConfigSource.refresh_delay", d))
                .transpose()?,
            request_timeout: proto
                .request_timeout
                .as_ref()
                .map(|d| duration_from_proto("ApiConfigSource.request_timeout", d))
                .transpose()?,
        })
    }
}

impl From<&ApiConfigSource> for core::ApiConfigSource {
    fn from(source: &ApiConfigSource) -> Self {
        Self {
            api_type: api_type_to_proto(source.api_type),
            cluster_names: source.cluster_names.clone(),
            refresh_delay: source.refresh_delay.map(duration_to_proto),
            request_timeout: source.request_timeout.map(duration_to_proto),
            ..Default::default()
        }
    }
}

impl TryFrom<core::ConfigSource> for ConfigSource {
    type Error = Error;

    fn try_from(proto: core::ConfigSource) -> Result<Self> {
        use core::config_source::ConfigSourceSpecifier as Proto;

        let specifier = match proto.config_source_specifier {
            None => None,
            Some(Proto::ApiConfigSource(source)) => Some(ConfigSourceSpecifier::ApiConfigSource(
                source.try_into()?,
            )),
            Some(Proto::Ads(_)) => Some(ConfigSourceSpecifier::Ads),
            Some(_) => {
                return Err(Error::InvalidField {
                    field: "ConfigSource.config_source_specifier",
                    reason: "only api_config_source and ads are supported".to_owned(),
                });
            }
        };

        Ok(Self {
            specifier,
            initial_fetch_timeout: proto
                .initial_fetch_timeout
                .as_ref()
                .map(|d| duration_from_proto("ConfigSource.initial_fetch_timeout", d))
                .transpose()?,
        })
    }
}

impl From<&ConfigSource> for core::ConfigSource {
    fn from(source: &ConfigSource) -> Self {
        use core::config_source::ConfigSourceSpecifier as Proto;

        Self {
            config_source_specifier: source.specifier.as_ref().map(|specifier| match specifier {
                ConfigSourceSpecifier::ApiConfigSource(api) => Proto::ApiConfigSource(api.into()),
                ConfigSourceSpecifier::Ads => Proto::Ads(core::AggregatedConfigSource::default()),
            }),
            initial_fetch_timeout: source.initial_fetch_timeout.map(duration_to_proto),
            ..Default::default()
        }
    }
}

/// Converts node metadata to a `google.protobuf.Struct`.
pub fn metadata_to_proto(metadata: &Metadata) -> pbuf::Struct {
    pbuf::Struct {
        fields: metadata
            .iter()
            .map(|(key, value)| (key.clone(), value_to_proto(value)))
            .collect(),
    }
}

/// Converts a `google.protobuf.Struct` to node metadata.
pub fn metadata_from_proto(proto: &pbuf::Struct) -> Metadata {
    proto
        .fields
        .iter()
        .map(|(key, value)| (key.clone(), value_from_proto(value)))
        .collect()
}

fn value_to_proto(value: &MetadataValue) -> pbuf::Value {
    let kind = match value {
        MetadataValue::Null => Kind::NullValue(pbuf::NullValue::NullValue as i32),
        MetadataValue::Bool(b) => Kind::BoolValue(*b),
        MetadataValue::Number(n) => Kind::NumberValue(*n),
        MetadataValue::String(s) => Kind::StringValue(s.clone()),
        MetadataValue::List(values) => Kind::ListValue(pbuf::ListValue {
            values: values.iter().map(value_to_proto).collect(),
        }),
        MetadataValue::Struct(fields) => Kind::StructValue(metadata_to_proto(fields)),
    };
    pbuf::Value { kind: Some(kind) }
}

fn value_from_proto(value: &pbuf::Value) -> MetadataValue {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => MetadataValue::Null,
        Some(Kind::BoolValue(b)) => MetadataValue::Bool(*b),
        Some(Kind::NumberValue(n)) => MetadataValue::Number(*n),
        Some(Kind::StringValue(s)) => MetadataValue::String(s.clone()),
        Some(Kind::ListValue(list)) => {
            MetadataValue::List(list.values.iter().map(value_from_proto).collect())
        }
        Some(Kind::StructValue(fields)) => MetadataValue::Struct(metadata_from_proto(fields)),
    }
}
