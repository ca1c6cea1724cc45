use updinfo_backend::{DeserializeError, PayloadDeserializer, WireManifest};

/// Parses the JSON update info document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl PayloadDeserializer for JsonDeserializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, payload: &[u8]) -> Result<WireManifest, DeserializeError> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Err(DeserializeError::Empty);
        }

        serde_json::from_slice(payload).map_err(|error| DeserializeError::Malformed {
            line: error.line(),
            column: error.column(),
            details: error.to_string(),
        })
    }
}
