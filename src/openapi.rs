//! Minimal OpenAPI document around converted components

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::OutputConfig;
use crate::registry::Components;

/// API information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An OpenAPI document with no operations, carrying only schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version string, e.g. `3.0.3`
    pub openapi: String,
    pub info: Info,
    /// Always empty; required by the OpenAPI 3.0 document schema
    pub paths: Map<String, Value>,
    pub components: Components,
}

impl OpenApiDocument {
    /// Wrap components using the `[output]` settings
    pub fn new(components: Components, output: &OutputConfig) -> Self {
        Self {
            openapi: output.openapi.clone(),
            info: Info {
                title: output.title.clone(),
                version: output.version.clone(),
                description: None,
            },
            paths: Map::new(),
            components,
        }
    }
}
