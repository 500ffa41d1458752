//! Call metadata for outgoing Transaction Gateway requests
//!
//! Every call carries an explicit [`CallContext`] rather than ambient request-scoped
//! state. The gateway requires `x-request-service` on every call and accepts an
//! optional `x-request-id` for tracing.

use crate::error::MetadataError;
use tonic::metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue};
use tonic::{Request, Status};

/// Header identifying the calling application (required)
pub const REQUEST_SERVICE_HEADER: &str = "x-request-service";

/// Header carrying a caller-chosen trace identifier (optional)
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ordered multimap of metadata attached to exactly one outbound call
///
/// Keys are lowercased on insertion. Repeated keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    entries: Vec<(String, String)>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with the gateway headers, `x-request-service` first
    pub fn for_service(request_service: impl Into<String>, request_id: Option<String>) -> Self {
        let mut context = Self::new().with(REQUEST_SERVICE_HEADER, request_service);
        if let Some(id) = request_id {
            context.insert(REQUEST_ID_HEADER, id);
        }
        context
    }

    /// Append an entry, keeping any earlier values for the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into().to_ascii_lowercase(), value.into()));
    }

    /// Builder form of [`CallContext::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// All values recorded for `key`, in insertion order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .filter(move |(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into gRPC metadata, appending entries in insertion order
    ///
    /// Only ASCII metadata is supported; binary (`-bin`) keys are rejected.
    pub fn into_metadata(self) -> Result<MetadataMap, MetadataError> {
        let mut metadata = MetadataMap::with_capacity(self.entries.len());

        for (key, value) in self.entries {
            let metadata_key = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
                .map_err(|_| MetadataError::InvalidKey(key.clone()))?;
            let metadata_value = MetadataValue::<Ascii>::try_from(value.as_str())
                .map_err(|_| MetadataError::InvalidValue { key: key.clone() })?;

            metadata.append(metadata_key, metadata_value);
        }

        Ok(metadata)
    }
}

impl<K, V> FromIterator<(K, V)> for CallContext
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

/// Check that a received request names its calling service
///
/// Intended for gateway service implementations and test doubles.
pub fn check_request_service<T>(request: &Request<T>) -> Result<(), Status> {
    let header = request.metadata().get(REQUEST_SERVICE_HEADER).ok_or_else(|| {
        Status::unauthenticated(
            "Missing x-request-service header. Include 'x-request-service: <service-name>' in gRPC metadata.",
        )
    })?;

    let service = header
        .to_str()
        .map_err(|_| Status::unauthenticated("Invalid x-request-service header encoding"))?;

    if service.trim().is_empty() {
        return Err(Status::unauthenticated("Empty x-request-service header"));
    }

    Ok(())
}
