//! Local node identity.

use crate::error::{Error, Result};
use crate::message::{MetadataValue, NODE_CLUSTER_METADATA_KEY, Node};

/// Read access to the identity of the local proxy.
///
/// Implementations must return stable values for the duration of a call.
pub trait LocalInfo {
    /// The node id.
    fn node_name(&self) -> &str;
    /// The zone the node runs in.
    fn zone_name(&self) -> &str;
    /// The cluster the node belongs to.
    fn cluster_name(&self) -> &str;
}

/// A fixed snapshot of the local identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIdentity {
    /// The node id.
    pub node_id: String,
    /// The zone the node runs in.
    pub zone: String,
    /// The cluster the node belongs to.
    pub cluster_name: String,
}

impl LocalIdentity {
    /// Create an identity snapshot.
    pub fn new(
        node_id: impl Into<String>,
        zone: impl Into<String>,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            zone: zone.into(),
            cluster_name: cluster_name.into(),
        }
    }
}

impl LocalInfo for LocalIdentity {
    fn node_name(&self) -> &str {
        &self.node_id
    }

    fn zone_name(&self) -> &str {
        &self.zone
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }
}

/// Stamps `node` with the current local identity.
///
/// Sets `id`, `locality.zone` and the `cluster` metadata entry. All other
/// fields, including the other locality fields, are left as they are, so
/// calling this again with the same identity does not change `node`.
pub fn local_info_to_node<L>(local_info: &L, node: &mut Node)
where
    L: LocalInfo + ?Sized,
{
    node.id = Some(local_info.node_name().to_owned());
    node.locality.get_or_insert_with(Default::default).zone = local_info.zone_name().to_owned();
    node.metadata.insert(
        NODE_CLUSTER_METADATA_KEY.to_owned(),
        MetadataValue::String(local_info.cluster_name().to_owned()),
    );
}

/// Checks that the local identity names both a node and a cluster.
///
/// `error_prefix` names the component that needs the identity, e.g.
/// `"cds: node 'id' and 'cluster'"`.
pub fn check_local_info<L>(error_prefix: &str, local_info: &L) -> Result<()>
where
    L: LocalInfo + ?Sized,
{
    if local_info.cluster_name().is_empty() || local_info.node_name().is_empty() {
        return Err(Error::Validation(format!(
            "{error_prefix}: node 'id' and 'cluster' are required, got id {:?} and cluster {:?}",
            local_info.node_name(),
            local_info.cluster_name(),
        )));
    }
    Ok(())
}
