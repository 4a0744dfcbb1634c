//! Wire codec for discovery messages.
//!
//! Transports hand over raw bytes. A codec turns them into the crate-owned
//! [`DiscoveryResponse`] that the extractor and registry work on, and turns
//! an outgoing [`DiscoveryRequest`], stamped with the local node, back into
//! bytes. Keeping this behind a trait leaves the protobuf binding (prost
//! today) replaceable.

use bytes::Bytes;

use crate::error::Result;
use crate::extract::TypedExtractor;
use crate::message::{DiscoveryRequest, DiscoveryResponse};
use crate::resource::Resource;

#[cfg(feature = "codegen-prost")]
pub mod prost;

/// Converts discovery messages to and from their serialized form.
pub trait XdsCodec: Send + Sync + 'static {
    /// Encode a [`DiscoveryRequest`] to bytes.
    fn encode_request(&self, request: &DiscoveryRequest<'_>) -> Result<Bytes>;

    /// Decode bytes into a [`DiscoveryResponse`].
    fn decode_response(&self, bytes: Bytes) -> Result<DiscoveryResponse>;

    /// Decode a serialized response and extract its resources as `T`.
    fn decode_typed<T: Resource>(
        &self,
        bytes: Bytes,
        extractor: &TypedExtractor,
    ) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        let response = self.decode_response(bytes)?;
        extractor.extract(&response)
    }
}
