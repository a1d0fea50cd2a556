//! JSON Schema → OpenAPI 3.0 converter
//!
//! Turns a JSON Schema document (draft-07 / 2019-09 style) into OpenAPI 3.0
//! Schema Objects, keyed by name, ready to be placed under
//! `components.schemas`.
//!
//! ## Features
//!
//! - **Rewrite pipeline**: thirteen node-local rules translate every construct
//!   OpenAPI 3.0 spells differently (`const`, type arrays, `null`,
//!   `if`/`then`/`else`, dependencies, ...) and strip what it does not know
//! - **Cycle cutting**: recursive schemas are cut into named `cyclic_<n>`
//!   components referenced through `$ref`
//! - **Local `$ref` resolution**: `#/...` references are linked before
//!   conversion, so recursion spelled with `$ref` becomes a real cycle
//! - **Deterministic output**: generated names come from per-run counters
//!
//! ## Flow
//!
//! ```text
//! Value ──deref──▶ SchemaDocument (graph)
//!                     │ detect_cycles
//!                     ▼
//!                 CycleReport ──extract──▶ acyclic document + cyclic_<n> components
//!                                             │ to_value + Pipeline (per component, then root)
//!                                             ▼
//!                                         Components { schemas }
//! ```
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//!
//! let schema = json!({ "type": ["string", "null"], "const": "blah" });
//! let components = schema_to_openapi::convert(&schema, "basic").unwrap();
//! assert_eq!(
//!     components.get("basic"),
//!     Some(&json!({ "oneOf": [{ "type": "string", "nullable": true, "enum": ["blah"] }] }))
//! );
//! ```

pub mod config;
pub mod convert;
pub mod cycles;
pub mod deref;
pub mod document;
pub mod error;
pub mod extract;
pub mod openapi;
pub mod registry;
pub mod rules;
pub mod traverse;

pub use config::{ConvertConfig, OutputConfig, SchemaConfig};
pub use convert::Converter;
pub use cycles::{detect_cycles, is_cyclic, CycleReport, CycleReportEntry};
pub use deref::dereference;
pub use document::{Item, NodeId, PathSegment, SchemaDocument, SchemaNode};
pub use error::{ConvertError, Result};
pub use extract::ComponentExtractor;
pub use openapi::OpenApiDocument;
pub use registry::{ComponentRegistry, Components};
pub use rules::{Pipeline, RewriteContext, SchemaRewriteRule};

/// Convert `schema` with the default configuration
pub fn convert(schema: &serde_json::Value, name: &str) -> Result<Components> {
    Converter::default().convert(schema, name)
}
