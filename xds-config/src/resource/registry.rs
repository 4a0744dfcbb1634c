//! Runtime lookup from type URL to decoder.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::message::{DiscoveryResponse, ResourceAny};
use crate::resource::{DecodedResource, DecoderFn, Resource, decoder_for};

/// Maps type URLs to the decoders of the [`Resource`] types registered
/// for them.
///
/// Used when the schema of a response is only known at runtime, e.g. by
/// a subscription worker that multiplexes several resource types over one
/// aggregated stream. New resource types are supported by registering
/// them; the registry itself never changes.
///
/// ```
/// # #[cfg(feature = "codegen-prost")] {
/// use envoy_types::pb::envoy::config::endpoint::v3::ClusterLoadAssignment;
/// use xds_config::ResourceRegistry;
///
/// let registry = ResourceRegistry::new().register::<ClusterLoadAssignment>();
/// assert!(registry.contains(
///     "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment"
/// ));
/// # }
/// ```
#[derive(Default)]
pub struct ResourceRegistry {
    decoders: HashMap<&'static str, DecoderFn>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under [`Resource::TYPE_URL`].
    ///
    /// Registering a type URL twice replaces the earlier decoder.
    pub fn register<T: Resource>(mut self) -> Self {
        if self.decoders.insert(T::TYPE_URL, decoder_for::<T>()).is_some() {
            tracing::debug!(type_url = T::TYPE_URL, "replacing registered decoder");
        }
        self
    }

    /// Returns true if a decoder is registered for `type_url`.
    pub fn contains(&self, type_url: &str) -> bool {
        self.decoders.contains_key(type_url)
    }

    /// Decode a single resource with the decoder registered for its type URL.
    pub fn decode(&self, resource: &ResourceAny) -> Result<DecodedResource> {
        let decoder = self
            .decoders
            .get(resource.type_url.as_str())
            .ok_or_else(|| Error::UnknownType(resource.type_url.clone()))?;
        decoder(resource.value.clone())
    }

    /// Decode every resource of a response, in order.
    ///
    /// The response must be homogeneous: every entry has to carry the
    /// response's `type_url`, or the type of the first entry when the
    /// response does not declare one. Nothing is decoded unless all
    /// entries pass that check. A response without resources decodes to an
    /// empty list whatever type it declares.
    pub fn decode_response(&self, response: &DiscoveryResponse) -> Result<Vec<DecodedResource>> {
        let Some(first) = response.resources.first() else {
            return Ok(Vec::new());
        };
        let expected = if response.type_url.is_empty() {
            first.type_url.as_str()
        } else {
            response.type_url.as_str()
        };

        if !self.contains(expected) {
            return Err(Error::UnknownType(expected.to_owned()));
        }

        if let Some((index, resource)) = response
            .resources
            .iter()
            .enumerate()
            .find(|(_, r)| r.type_url != expected)
        {
            return Err(Error::TypeMismatch {
                index,
                expected: expected.to_owned(),
                actual: resource.type_url.clone(),
            });
        }

        let decoded = response
            .resources
            .iter()
            .map(|resource| self.decode(resource))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(type_url = %expected, count = decoded.len(), "decoded resources");
        Ok(decoded)
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut type_urls: Vec<_> = self.decoders.keys().collect();
        type_urls.sort();
        f.debug_struct("ResourceRegistry")
            .field("type_urls", &type_urls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::*;

    fn response(resources: Vec<ResourceAny>) -> DiscoveryResponse {
        DiscoveryResponse {
            resources,
            ..Default::default()
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let registry = ResourceRegistry::new().register::<Named>();
        let err = registry.decode(&other("x")).unwrap_err();
        assert!(matches!(err, Error::UnknownType(url) if url == OTHER_TYPE_URL));
    }

    #[test]
    fn decodes_each_registered_type() {
        let registry = ResourceRegistry::new()
            .register::<Named>()
            .register::<Other>();

        let a = registry.decode(&named("a")).unwrap();
        let b = registry.decode(&other("b")).unwrap();
        assert_eq!(a.downcast_ref::<Named>(), Some(&Named("a".to_string())));
        assert_eq!(b.downcast_ref::<Other>(), Some(&Other("b".to_string())));
    }

    #[test]
    fn decode_response_preserves_order() {
        let registry = ResourceRegistry::new().register::<Named>();
        let decoded = registry
            .decode_response(&response(vec![named("0"), named("1"), named("2")]))
            .unwrap();
        let names: Vec<_> = decoded.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["0", "1", "2"]);
    }

    #[test]
    fn decode_response_empty() {
        let registry = ResourceRegistry::new();
        assert!(registry.decode_response(&response(vec![])).unwrap().is_empty());
    }

    #[test]
    fn decode_response_empty_with_unregistered_type() {
        let registry = ResourceRegistry::new().register::<Named>();
        let mut resp = response(vec![]);
        resp.type_url = OTHER_TYPE_URL.to_string();
        assert!(registry.decode_response(&resp).unwrap().is_empty());
    }

    #[test]
    fn decode_response_rejects_mixed_types() {
        let registry = ResourceRegistry::new()
            .register::<Named>()
            .register::<Other>();
        let err = registry
            .decode_response(&response(vec![named("0"), other("1")]))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { index: 1, .. }));
    }

    #[test]
    fn decode_response_checks_declared_type() {
        let registry = ResourceRegistry::new()
            .register::<Named>()
            .register::<Other>();
        let mut resp = response(vec![named("0")]);
        resp.type_url = OTHER_TYPE_URL.to_string();
        let err = registry.decode_response(&resp).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { index: 0, .. }));
    }
}
