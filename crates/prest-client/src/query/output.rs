use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{PrestError, Result},
    query::clause::Renderer,
};

/// Decoded response of an executed query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Body parsed as JSON (`_renderer=json`, the default).
    Json(Value),
    /// Raw body, left unparsed (`_renderer=xml`).
    Text(String),
}

impl QueryOutput {
    /// Decode a successful response body according to the renderer.
    ///
    /// An empty JSON body decodes to `null`.
    pub fn decode(renderer: Renderer, body: String) -> Result<Self> {
        match renderer {
            Renderer::Json if body.trim().is_empty() => Ok(Self::Json(Value::Null)),
            Renderer::Json => Ok(Self::Json(serde_json::from_str(&body)?)),
            Renderer::Xml => Ok(Self::Text(body)),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Deserialize JSON output into `T`.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Text(_) => Err(PrestError::request_failed(
                "XML output cannot be deserialized, use the JSON renderer",
            )),
        }
    }
}

impl fmt::Display for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
            Self::Text(text) => f.write_str(text),
        }
    }
}
