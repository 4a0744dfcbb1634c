//! [`Resource`] implementations for the Envoy v3 messages in `envoy-types`.

use bytes::Bytes;
use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::endpoint::v3::ClusterLoadAssignment;
use envoy_types::pb::envoy::config::listener::v3::Listener;
use envoy_types::pb::envoy::config::route::v3::RouteConfiguration;
use prost::Message;

use crate::error::{Error, Result};
use crate::resource::{Resource, type_url};

macro_rules! impl_resource {
    ($ty:ty, $type_url:expr, $name:ident) => {
        impl Resource for $ty {
            const TYPE_URL: &'static str = $type_url;

            fn decode(bytes: Bytes) -> Result<Self> {
                <$ty as Message>::decode(bytes).map_err(|e| Error::decode(Self::TYPE_URL, e))
            }

            fn name(&self) -> &str {
                &self.$name
            }
        }
    };
}

impl_resource!(Listener, type_url::LISTENER, name);
impl_resource!(RouteConfiguration, type_url::ROUTE_CONFIGURATION, name);
impl_resource!(Cluster, type_url::CLUSTER, name);
impl_resource!(ClusterLoadAssignment, type_url::CLUSTER_LOAD_ASSIGNMENT, cluster_name);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_load_assignment_is_named_by_cluster() {
        let proto = ClusterLoadAssignment {
            cluster_name: "backend".to_string(),
            ..Default::default()
        };
        let bytes: Bytes = proto.encode_to_vec().into();

        let decoded = <ClusterLoadAssignment as Resource>::decode(bytes).unwrap();
        assert_eq!(Resource::name(&decoded), "backend");
    }

    #[test]
    fn listener_decode_error_names_type() {
        // Field 1 (name) declared as a 10-byte string with only 1 byte present.
        let truncated = Bytes::from_static(&[0x0a, 0x0a, b'x']);
        let err = <Listener as Resource>::decode(truncated).unwrap_err();
        match err {
            Error::Decode { type_url: url, .. } => assert_eq!(url, type_url::LISTENER),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn type_urls_match_proto_names() {
        assert!(<Cluster as Resource>::TYPE_URL.ends_with("envoy.config.cluster.v3.Cluster"));
        assert!(
            <RouteConfiguration as Resource>::TYPE_URL
                .ends_with("envoy.config.route.v3.RouteConfiguration")
        );
    }
}
