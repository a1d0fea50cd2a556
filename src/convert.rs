//! Conversion driver
//!
//! One call of [`Converter::convert`] is one run: detect cycles, extract the
//! cyclic components, rewrite every component and the root through the
//! pipeline, and hand back the finished component map. A run owns its
//! registry; the converter itself holds only configuration and can be shared
//! between threads.

use serde_json::Value;

use crate::config::ConvertConfig;
use crate::cycles::detect_cycles;
use crate::document::SchemaDocument;
use crate::error::{ConvertError, Result};
use crate::extract::ComponentExtractor;
use crate::registry::{ComponentRegistry, Components};
use crate::rules::Pipeline;

/// JSON Schema → OpenAPI 3.0 converter
#[derive(Debug)]
pub struct Converter {
    config: ConvertConfig,
    pipeline: Pipeline,
    extractor: ComponentExtractor,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        let pipeline = Pipeline::standard(&config);
        let extractor = ComponentExtractor::new(config.cyclic_prefix.clone());
        Self {
            config,
            pipeline,
            extractor,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Convert a JSON Schema value, registering the result under `name`
    ///
    /// The value is deep-copied; the caller's value is never touched.
    pub fn convert(&self, schema: &Value, name: &str) -> Result<Components> {
        validate_name(name)?;
        let doc = SchemaDocument::from_value(schema)?;
        self.run(doc, name)
    }

    /// Convert a schema graph, which may alias nodes and contain cycles
    pub fn convert_document(&self, doc: &SchemaDocument, name: &str) -> Result<Components> {
        validate_name(name)?;
        self.run(doc.clone(), name)
    }

    fn run(&self, mut doc: SchemaDocument, name: &str) -> Result<Components> {
        let mut registry = ComponentRegistry::new();
        registry.reserve(name);

        let report = detect_cycles(&doc);
        if !report.is_empty() {
            tracing::debug!(back_edges = report.len(), "cycles detected");
        }
        let extracted = self.extractor.extract(&mut doc, &report, &mut registry)?;

        for (component, id) in extracted {
            let mut schema = doc.to_value(id)?;
            self.pipeline.rewrite(&mut schema, &mut registry);
            registry.register(component, schema);
        }

        let mut root = doc.to_value(doc.root())?;
        self.pipeline.rewrite(&mut root, &mut registry);
        if let Value::Object(map) = &mut root {
            map.remove("definitions");
        }
        registry.register(name, root);

        let components = registry.into_components();
        let dangling = components.dangling_refs();
        if !dangling.is_empty() {
            tracing::warn!(?dangling, "output references missing components");
        }
        tracing::debug!(component = name, components = components.len(), "conversion done");

        Ok(components)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConvertError::InvalidName(name.to_string()));
    }
    Ok(())
}
