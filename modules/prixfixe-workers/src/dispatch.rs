//! Envelope header decoding and the dispatch outcome shared by all workers.

use prixfixe_common::{DataType, EnvelopeHeader};
use serde::de::DeserializeOwned;

use crate::error::WorkerError;

/// What a worker does with a recognized data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handled by the named handler.
    Handle(&'static str),
    /// Known, delivered, and deliberately ignored.
    Noop,
}

/// A header that parsed and named a known data type.
pub(crate) struct Routed {
    pub data_type: DataType,
    pub user_id: String,
}

/// Read just enough of the envelope to route it.
pub(crate) fn route(envelope: &'static str, bytes: &[u8]) -> Result<Routed, WorkerError> {
    let header: EnvelopeHeader = serde_json::from_slice(bytes)
        .map_err(|source| WorkerError::Decode { envelope, source })?;

    let data_type = header
        .data_type
        .parse::<DataType>()
        .map_err(|_| WorkerError::UnknownDataType(header.data_type.clone()))?;

    Ok(Routed {
        data_type,
        user_id: header.attributable_to_user_id.unwrap_or_default(),
    })
}

/// Decode the full envelope once routing has picked a handler.
pub(crate) fn decode<T: DeserializeOwned>(envelope: &'static str, bytes: &[u8]) -> Result<T, WorkerError> {
    serde_json::from_slice(bytes).map_err(|source| WorkerError::Decode { envelope, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_is_a_dispatch_miss() {
        let err = route("pre-update", br#"{"dataType":"nonexistent"}"#)
            .err()
            .unwrap();
        assert!(matches!(err, WorkerError::UnknownDataType(ref tag) if tag == "nonexistent"));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = route("pre-write", b"{not json").err().unwrap();
        assert!(matches!(err, WorkerError::Decode { envelope: "pre-write", .. }));
    }

    #[test]
    fn missing_tag_is_a_decode_error() {
        let err = route("pre-archive", br#"{"attributableToUserID":"u1"}"#)
            .err()
            .unwrap();
        assert!(matches!(err, WorkerError::Decode { .. }));
    }

    #[test]
    fn known_tag_routes_without_attribution() {
        let routed = route("pre-archive", br#"{"dataType":"user_membership"}"#).unwrap();
        assert_eq!(routed.data_type, DataType::UserMembership);
        assert!(routed.user_id.is_empty());
    }
}
