//! Typed extraction of resources from a [`DiscoveryResponse`].
//!
//! A discovery response carries its resources as `(type_url, bytes)` pairs.
//! Extraction checks every entry against [`Resource::TYPE_URL`] and decodes
//! the payloads into `T`, keeping the order of the response.

use crate::error::{Error, Result};
use crate::message::DiscoveryResponse;
use crate::resource::Resource;

/// How entries whose type URL differs from the requested type are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractPolicy {
    /// Reject the whole response with [`Error::TypeMismatch`].
    #[default]
    Strict,
    /// Skip the entry and keep extracting the rest.
    Permissive,
}

/// Extracts typed resources from discovery responses.
///
/// # Example
///
/// ```
/// use xds_config::{ExtractPolicy, TypedExtractor};
///
/// let extractor = TypedExtractor::new().with_policy(ExtractPolicy::Permissive);
/// assert_eq!(extractor.policy(), ExtractPolicy::Permissive);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedExtractor {
    policy: ExtractPolicy,
}

impl TypedExtractor {
    /// Create an extractor with the [`ExtractPolicy::Strict`] policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for mismatched entries.
    pub fn with_policy(mut self, policy: ExtractPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The configured policy.
    pub fn policy(&self) -> ExtractPolicy {
        self.policy
    }

    /// Decode the resources of `response` as `T`.
    ///
    /// Element `i` of the result is decoded from the `i`-th resource kept
    /// under the configured policy. Type URLs are checked before anything
    /// is decoded, so a strict extraction that fails with
    /// [`Error::TypeMismatch`] has not parsed any payload.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] if an entry's type URL is not
    ///   `T::TYPE_URL` and the policy is [`ExtractPolicy::Strict`].
    /// - [`Error::Decode`] if a kept entry cannot be parsed as `T`.
    pub fn extract<T: Resource>(&self, response: &DiscoveryResponse) -> Result<Vec<T>> {
        let mut kept = Vec::with_capacity(response.resources.len());

        for (index, resource) in response.resources.iter().enumerate() {
            if resource.type_url == T::TYPE_URL {
                kept.push(resource);
                continue;
            }

            match self.policy {
                ExtractPolicy::Strict => {
                    return Err(Error::TypeMismatch {
                        index,
                        expected: T::TYPE_URL.to_owned(),
                        actual: resource.type_url.clone(),
                    });
                }
                ExtractPolicy::Permissive => {
                    tracing::warn!(
                        index,
                        expected = T::TYPE_URL,
                        actual = %resource.type_url,
                        "skipping resource with unexpected type"
                    );
                }
            }
        }

        let resources = kept
            .into_iter()
            .map(|resource| T::decode(resource.value.clone()))
            .collect::<Result<Vec<T>>>()?;

        tracing::trace!(
            type_url = T::TYPE_URL,
            version = %response.version_info,
            count = resources.len(),
            "extracted typed resources"
        );
        Ok(resources)
    }
}

/// Decode every resource of `response` as `T`, rejecting the response if
/// any entry carries a different type URL.
///
/// Shorthand for [`TypedExtractor::new().extract::<T>(response)`](TypedExtractor::extract).
pub fn extract_typed<T: Resource>(response: &DiscoveryResponse) -> Result<Vec<T>> {
    TypedExtractor::new().extract(response)
}
