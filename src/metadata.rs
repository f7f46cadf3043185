//! Call metadata attached to a room at dispatch time.
//!
//! The dialer serializes the personalization fields into the room metadata;
//! the agent entrypoint reads them back. Malformed metadata never fails a
//! call, it only falls back to the configured defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Personalization;

/// Wire format of the room metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub caller_name: String,
    pub company_name: String,
    pub call_purpose: String,
}

impl CallMetadata {
    pub fn new(
        caller_name: impl Into<String>,
        company_name: impl Into<String>,
        call_purpose: impl Into<String>,
    ) -> Self {
        Self {
            caller_name: caller_name.into(),
            company_name: company_name.into(),
            call_purpose: call_purpose.into(),
        }
    }

    pub fn to_json(&self) -> String {
        // Three string fields always serialize
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Resolve room metadata against `defaults`.
    ///
    /// Every key that is missing or not a string keeps its default value.
    pub fn resolve(raw: &str, defaults: &Personalization) -> MetadataResolution {
        let mut metadata = CallMetadata::from(defaults);

        if raw.trim().is_empty() {
            return MetadataResolution::Empty(metadata);
        }

        let fields: Map<String, Value> = match serde_json::from_str(raw) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                return MetadataResolution::Invalid {
                    metadata,
                    reason: format!("expected a JSON object, got {}", json_kind(&other)),
                }
            }
            Err(e) => {
                return MetadataResolution::Invalid {
                    metadata,
                    reason: e.to_string(),
                }
            }
        };

        let take = |key: &str, slot: &mut String| {
            if let Some(Value::String(value)) = fields.get(key) {
                *slot = value.clone();
            }
        };
        take("caller_name", &mut metadata.caller_name);
        take("company_name", &mut metadata.company_name);
        take("call_purpose", &mut metadata.call_purpose);

        MetadataResolution::Parsed(metadata)
    }
}

impl From<&Personalization> for CallMetadata {
    fn from(p: &Personalization) -> Self {
        Self::new(&p.caller_name, &p.company_name, &p.call_purpose)
    }
}

/// Outcome of reading room metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataResolution {
    /// The room carried no metadata
    Empty(CallMetadata),
    /// Metadata parsed as an object
    Parsed(CallMetadata),
    /// Metadata could not be used; defaults apply
    Invalid {
        metadata: CallMetadata,
        reason: String,
    },
}

impl MetadataResolution {
    pub fn metadata(&self) -> &CallMetadata {
        match self {
            MetadataResolution::Empty(m) | MetadataResolution::Parsed(m) => m,
            MetadataResolution::Invalid { metadata, .. } => metadata,
        }
    }

    pub fn into_metadata(self) -> CallMetadata {
        match self {
            MetadataResolution::Empty(m) | MetadataResolution::Parsed(m) => m,
            MetadataResolution::Invalid { metadata, .. } => metadata,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
