//! # Body Decoders
//!
//! Media type → function turning body bytes into a [`Field`] plus the `raw`
//! flag to validate it with. Lookup falls back through wildcards:
//! `type/subtype`, `type/*`, `*/subtype`, `*/*`.
//!
//! Built in:
//!
//! | Media type                          | Output                          | raw   |
//! |-------------------------------------|---------------------------------|-------|
//! | `application/json`                  | parsed JSON                     | false |
//! | `application/x-www-form-urlencoded` | object of strings, repeats → list | true |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use oasv_core::{CompileError, Field};
use serde_json::{Map, Value};

/// A decoded body ready for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBody {
    /// The decoded value.
    pub value: Field,
    /// Whether the value holds text that still needs coercion.
    pub raw: bool,
}

type DecodeFn = dyn Fn(&[u8]) -> Result<DecodedBody, String> + Send + Sync;

/// A registered body decoder. `Err` carries the message reported under
/// `"body"`.
#[derive(Clone)]
pub struct Decoder {
    media_type: String,
    decode: Arc<DecodeFn>,
}

impl Decoder {
    /// Media type this decoder was registered for.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Decode a body.
    ///
    /// # Errors
    ///
    /// The decoder's own error message.
    pub fn decode(&self, body: &[u8]) -> Result<DecodedBody, String> {
        (self.decode)(body)
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("media_type", &self.media_type)
            .finish_non_exhaustive()
    }
}

/// Media type → decoder.
#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Decoder>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderRegistry {
    /// Registry with the built-in JSON and form decoders.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("application/json", decode_json);
        registry.register("application/x-www-form-urlencoded", decode_form);
        registry
    }

    /// Registry with no decoders.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register or replace the decoder for a media type. Wildcards such as
    /// `text/*` or `*/*` are allowed.
    pub fn register<F>(&mut self, media_type: &str, decode: F) -> &mut Self
    where
        F: Fn(&[u8]) -> Result<DecodedBody, String> + Send + Sync + 'static,
    {
        let media_type = media_type.trim().to_ascii_lowercase();
        tracing::debug!(media_type = %media_type, "registering body decoder");
        self.decoders.insert(
            media_type.clone(),
            Decoder {
                media_type,
                decode: Arc::new(decode),
            },
        );
        self
    }

    /// Find the decoder for a media type, falling back through wildcards.
    ///
    /// # Errors
    ///
    /// `MissingDecoder` when neither the media type nor a wildcard matches.
    pub fn lookup(&self, media_type: &str) -> Result<&Decoder, CompileError> {
        let media_type = essence(media_type);
        let (kind, subtype) = media_type.split_once('/').unwrap_or((media_type.as_str(), "*"));
        [
            media_type.clone(),
            format!("{kind}/*"),
            format!("*/{subtype}"),
            "*/*".to_string(),
        ]
        .iter()
        .find_map(|candidate| self.decoders.get(candidate))
        .ok_or_else(|| CompileError::MissingDecoder(media_type.clone()))
    }

    /// Registered media types, sorted.
    pub fn media_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("media_types", &self.media_types())
            .finish()
    }
}

/// Strip parameters (`; charset=utf-8`) and normalize case.
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn decode_json(body: &[u8]) -> Result<DecodedBody, String> {
    if body.is_empty() {
        return Ok(DecodedBody {
            value: Field::Absent,
            raw: false,
        });
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    Ok(DecodedBody {
        value: Field::from_value(value),
        raw: false,
    })
}

fn decode_form(body: &[u8]) -> Result<DecodedBody, String> {
    let mut object = Map::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        let value = Value::String(value.into_owned());
        match object.get_mut(&*key) {
            None => {
                object.insert(key.into_owned(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    Ok(DecodedBody {
        value: Field::Value(Value::Object(object)),
        raw: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_decoder() {
        let registry = DecoderRegistry::new();
        let decoder = registry.lookup("application/json; charset=utf-8").unwrap();
        let decoded = decoder.decode(br#"{"a": [1, null]}"#).unwrap();
        assert_eq!(decoded.value, Field::Value(json!({"a": [1, null]})));
        assert!(!decoded.raw);
        assert!(decoder.decode(b"{nope").is_err());
        assert_eq!(decoder.decode(b"null").unwrap().value, Field::Null);
        assert_eq!(decoder.decode(b"").unwrap().value, Field::Absent);
    }

    #[test]
    fn form_decoder_groups_repeats() {
        let registry = DecoderRegistry::new();
        let decoder = registry.lookup("application/x-www-form-urlencoded").unwrap();
        let decoded = decoder.decode(b"a=1&b=x+y&a=2&a=3").unwrap();
        assert_eq!(decoded.value, Field::Value(json!({"a": ["1", "2", "3"], "b": "x y"})));
        assert!(decoded.raw);
    }

    #[test]
    fn wildcard_fallbacks() {
        let mut registry = DecoderRegistry::empty();
        registry.register("text/*", |b| {
            Ok(DecodedBody {
                value: Field::text(String::from_utf8_lossy(b).into_owned()),
                raw: false,
            })
        });
        assert_eq!(registry.lookup("text/plain").unwrap().media_type(), "text/*");
        assert_eq!(
            registry.lookup("image/png").unwrap_err(),
            CompileError::MissingDecoder("image/png".into())
        );
        registry.register("*/*", |b| {
            Ok(DecodedBody {
                value: Field::Binary(b.to_vec()),
                raw: false,
            })
        });
        assert_eq!(registry.lookup("image/png").unwrap().media_type(), "*/*");
        assert_eq!(registry.lookup("text/html").unwrap().media_type(), "text/*");
    }

    #[test]
    fn essence_strips_parameters() {
        assert_eq!(essence("Application/JSON ; charset=UTF-8"), "application/json");
    }
}
