//! Payload validation applied to bridge output before it is broadcast

use std::borrow::Cow;

use serde_json::value::RawValue;
use tracing::warn;

/// Shape a payload is expected to have, which picks its fallback literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Player lists (`player_data`)
    Array,
    /// Single objects (`bomb_state`)
    Object,
}

impl PayloadShape {
    /// "Empty" literal substituted for a payload that is not valid JSON
    pub fn fallback(self) -> &'static str {
        match self {
            PayloadShape::Array => "[]",
            PayloadShape::Object => "{}",
        }
    }
}

/// Return `raw` as valid UTF-8 JSON, or the fallback for `shape`.
///
/// Invalid UTF-8 byte sequences are dropped and every valid run kept.
/// Whatever remains must parse as JSON or it is replaced wholesale.
pub fn sanitize_json(raw: &[u8], shape: PayloadShape) -> String {
    let text = strip_invalid_utf8(raw);

    match serde_json::from_str::<&RawValue>(&text) {
        Ok(_) => text.into_owned(),
        Err(e) => {
            warn!(
                "Invalid JSON from telemetry bridge ({} bytes): {}; using {}",
                raw.len(),
                e,
                shape.fallback()
            );
            shape.fallback().to_string()
        }
    }
}

fn strip_invalid_utf8(raw: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(raw) {
        return Cow::Borrowed(text);
    }

    let mut cleaned = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        cleaned.push_str(chunk.valid());
    }

    warn!("Dropped {} invalid UTF-8 bytes from telemetry payload", raw.len() - cleaned.len());
    Cow::Owned(cleaned)
}
