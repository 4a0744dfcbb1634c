use std::time::Duration;

use bytes::Bytes;
use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::endpoint::v3::ClusterLoadAssignment;
use envoy_types::pb::envoy::service::discovery::v3 as discovery;
use envoy_types::pb::google::protobuf::Any;
use prost::Message;

use xds_config::resource::type_url;
use xds_config::{
    ApiConfigSource, ApiType, ConfigSource, DiscoveryResponse, Error, ExtractPolicy,
    LegacyPollConfig, LocalIdentity, MetadataValue, Node, ProstCodec, ResourceAny,
    ResourceRegistry, TypedExtractor, XdsCodec, extract_typed, local_info_to_node, refresh_delay,
    translate_legacy,
};

fn pack<M: Message>(type_url: &str, message: &M) -> ResourceAny {
    ResourceAny::new(type_url, message.encode_to_vec())
}

fn load_assignment(cluster_name: &str) -> ResourceAny {
    pack(
        type_url::CLUSTER_LOAD_ASSIGNMENT,
        &ClusterLoadAssignment {
            cluster_name: cluster_name.to_string(),
            ..Default::default()
        },
    )
}

#[test]
fn get_typed_resources() {
    let mut response = DiscoveryResponse::default();
    assert!(
        extract_typed::<ClusterLoadAssignment>(&response)
            .unwrap()
            .is_empty()
    );

    response.resources.push(load_assignment("0"));
    response.resources.push(load_assignment("1"));

    let typed = extract_typed::<ClusterLoadAssignment>(&response).unwrap();
    assert_eq!(typed.len(), 2);
    assert_eq!(typed[0].cluster_name, "0");
    assert_eq!(typed[1].cluster_name, "1");
}

#[test]
fn get_typed_resources_rejects_foreign_type() {
    let cluster = pack(
        type_url::CLUSTER,
        &Cluster {
            name: "c".to_string(),
            ..Default::default()
        },
    );
    let response = DiscoveryResponse {
        resources: vec![load_assignment("0"), cluster],
        ..Default::default()
    };

    let err = extract_typed::<ClusterLoadAssignment>(&response).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { index: 1, .. }));

    let kept: Vec<ClusterLoadAssignment> = TypedExtractor::new()
        .with_policy(ExtractPolicy::Permissive)
        .extract(&response)
        .unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].cluster_name, "0");
}

#[test]
fn get_typed_resources_from_wire() {
    let proto_response = discovery::DiscoveryResponse {
        version_info: "7".to_string(),
        type_url: type_url::CLUSTER_LOAD_ASSIGNMENT.to_string(),
        resources: ["a", "b", "c"]
            .into_iter()
            .map(|name| Any {
                type_url: type_url::CLUSTER_LOAD_ASSIGNMENT.to_string(),
                value: ClusterLoadAssignment {
                    cluster_name: name.to_string(),
                    ..Default::default()
                }
                .encode_to_vec(),
            })
            .collect(),
        ..Default::default()
    };
    let bytes: Bytes = proto_response.encode_to_vec().into();

    let typed: Vec<ClusterLoadAssignment> = ProstCodec
        .decode_typed(bytes.clone(), &TypedExtractor::new())
        .unwrap();
    let names: Vec<_> = typed.iter().map(|c| c.cluster_name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c"]);

    let registry = ResourceRegistry::new()
        .register::<ClusterLoadAssignment>()
        .register::<Cluster>();
    let response = ProstCodec.decode_response(bytes).unwrap();
    let decoded = registry.decode_response(&response).unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(
        decoded[2]
            .downcast_ref::<ClusterLoadAssignment>()
            .map(|c| c.cluster_name.as_str()),
        Some("c")
    );
}

#[test]
fn malformed_resource_is_decode_error() {
    let response = DiscoveryResponse {
        resources: vec![ResourceAny::new(
            type_url::CLUSTER_LOAD_ASSIGNMENT,
            Bytes::from_static(&[0x0a, 0x05, b'x']),
        )],
        ..Default::default()
    };
    let err = extract_typed::<ClusterLoadAssignment>(&response).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn api_config_source_refresh_delay() {
    let source =
        ApiConfigSource::new(ApiType::Rest).with_refresh_delay(Duration::from_millis(1234));
    assert_eq!(refresh_delay(&source).unwrap().as_millis(), 1234);

    let unset = ApiConfigSource::new(ApiType::Rest);
    assert!(matches!(
        refresh_delay(&unset),
        Err(Error::MissingField { .. })
    ));
}

#[test]
fn local_info_to_node_sets_identity() {
    let local_info = LocalIdentity::new("foo_id", "foo_zone", "foo_cluster");
    let mut node = Node::new("envoy", "1.0");
    local_info_to_node(&local_info, &mut node);

    assert_eq!(node.id.as_deref(), Some("foo_id"));
    assert_eq!(node.locality.as_ref().map(|l| l.zone.as_str()), Some("foo_zone"));
    assert_eq!(
        node.metadata.get("cluster"),
        Some(&MetadataValue::String("foo_cluster".to_string()))
    );

    let snapshot = node.clone();
    local_info_to_node(&local_info, &mut node);
    assert_eq!(node, snapshot);
}

#[test]
fn sds_config_to_eds_config() {
    let sds_config = LegacyPollConfig::new("sds", Duration::from_millis(30000));
    let mut config = ConfigSource::default();
    translate_legacy(&sds_config, &mut config);

    assert!(config.has_api_config_source());
    let api_config_source = config.api_config_source().unwrap();
    assert_eq!(api_config_source.api_type, ApiType::RestLegacy);
    assert_eq!(api_config_source.cluster_names.len(), 1);
    assert_eq!(api_config_source.cluster_names[0], "sds");
    assert_eq!(
        refresh_delay(api_config_source).unwrap().as_millis(),
        30000
    );
}
