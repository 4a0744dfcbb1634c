//! Provides abstraction for xDS resources.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;

#[cfg(feature = "codegen-prost")]
pub mod prost;
pub mod registry;

pub use registry::ResourceRegistry;

/// Well-known Envoy v3 resource type URLs.
pub mod type_url {
    /// Listener type URL (LDS).
    pub const LISTENER: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";
    /// RouteConfiguration type URL (RDS).
    pub const ROUTE_CONFIGURATION: &str =
        "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";
    /// Cluster type URL (CDS).
    pub const CLUSTER: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
    /// ClusterLoadAssignment type URL (EDS).
    pub const CLUSTER_LOAD_ASSIGNMENT: &str =
        "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";
}

/// Trait for xDS resources.
///
/// # Decoding
///
/// The `decode` method should parse the raw bytes based on the
/// serialization format, such as Protobuf, and return
/// [`Error::Decode`](crate::Error::Decode) if parsing fails. Semantic
/// validation of the decoded resource is left to the consumer.
///
/// # Example
///
/// ```ignore
/// impl Resource for Listener {
///     const TYPE_URL: &'static str = "type.googleapis.com/envoy.config.listener.v3.Listener";
///
///     fn decode(bytes: Bytes) -> Result<Self> {
///         let proto = ListenerProto::decode(bytes)
///             .map_err(|e| Error::decode(Self::TYPE_URL, e))?;
///         Ok(Self { name: proto.name, /* ... */ })
///     }
///
///     fn name(&self) -> &str {
///         &self.name
///     }
/// }
/// ```
pub trait Resource: Send + Sync + Clone + fmt::Debug + 'static {
    /// The xDS type URL for this resource type.
    ///
    /// Example: `"type.googleapis.com/envoy.config.listener.v3.Listener"`
    const TYPE_URL: &'static str;

    /// Decode a resource from its serialized bytes.
    fn decode(bytes: Bytes) -> Result<Self>;

    /// Returns the resource name.
    ///
    /// The resource name combined with the type URL uniquely identifies a resource.
    fn name(&self) -> &str;
}

/// Type-erased decoder for a single resource type.
pub type DecoderFn = Box<dyn Fn(Bytes) -> Result<DecodedResource> + Send + Sync>;

/// A decoded resource whose concrete type is only known at runtime.
///
/// Produced by [`ResourceRegistry`]. Use [`DecodedResource::downcast_ref`]
/// to recover the concrete [`Resource`].
#[derive(Clone)]
pub struct DecodedResource {
    type_url: &'static str,
    name: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl DecodedResource {
    /// Wrap a decoded resource.
    pub fn new<T: Resource>(resource: T) -> Self {
        Self {
            type_url: T::TYPE_URL,
            name: resource.name().to_owned(),
            inner: Arc::new(resource),
        }
    }

    /// The type URL of the wrapped resource.
    pub fn type_url(&self) -> &'static str {
        self.type_url
    }

    /// The name of the wrapped resource.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the wrapped resource as `T`, if it is one.
    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for DecodedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedResource")
            .field("type_url", &self.type_url)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Builds the [`DecoderFn`] for `T`.
pub fn decoder_for<T: Resource>() -> DecoderFn {
    Box::new(|bytes| {
        let resource = T::decode(bytes)?;
        Ok(DecodedResource::new(resource))
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn decoded_resource_downcasts_to_its_own_type() {
        let decoded = DecodedResource::new(Named("a".to_string()));
        assert_eq!(decoded.type_url(), NAMED_TYPE_URL);
        assert_eq!(decoded.name(), "a");
        assert_eq!(decoded.downcast_ref::<Named>(), Some(&Named("a".to_string())));
        assert!(decoded.downcast_ref::<Other>().is_none());
    }

    #[test]
    fn decoder_for_propagates_decode_errors() {
        let decoder = decoder_for::<Named>();
        let err = decoder(Bytes::from_static(&[0xff, 0xfe])).unwrap_err();
        assert!(matches!(err, crate::Error::Decode { .. }));
    }
}
