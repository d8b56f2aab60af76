//! Schema construction and lookup
//!
//! The schema always carries the reserved [`RAW_FIELD`], a stored-only field
//! holding the whole serialized input document.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::field::FieldOptions;
use crate::config::AnalyzerConfig;
use crate::error::SchemaError;
use crate::tokenizer::{Analyzer, AnalyzerRef};

/// Name of the stored field holding the full original document
pub const RAW_FIELD: &str = "_raw";

#[derive(Clone, Debug)]
struct SchemaField {
    options: FieldOptions,
    analyzer: AnalyzerRef,
}

/// Immutable field schema
#[derive(Clone, Debug)]
pub struct Schema {
    fields: BTreeMap<String, SchemaField>,
}

/// Serialized form: user-declared fields only
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct SchemaDef(BTreeMap<String, FieldOptions>);

impl Serialize for Schema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let def = SchemaDef(
            self.fields
                .iter()
                .filter(|(name, _)| name.as_str() != RAW_FIELD)
                .map(|(name, field)| (name.clone(), field.options.clone()))
                .collect(),
        );
        def.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let def = SchemaDef::deserialize(deserializer)?;
        let mut builder = Schema::builder();
        for (name, options) in def.0 {
            builder = builder.field(name, options);
        }
        builder.build().map_err(serde::de::Error::custom)
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Get the options of a declared field
    pub fn field(&self, name: &str) -> Option<&FieldOptions> {
        self.fields.get(name).map(|f| &f.options)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn is_indexed(&self, name: &str) -> bool {
        self.field(name).map(|f| f.indexed).unwrap_or(false)
    }

    pub fn is_stored(&self, name: &str) -> bool {
        self.field(name).map(|f| f.stored).unwrap_or(false)
    }

    pub fn analyzer_for(&self, name: &str) -> Option<&AnalyzerRef> {
        self.fields.get(name).map(|f| &f.analyzer)
    }

    /// All field names in sorted order, including the raw field
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn indexed_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, f)| f.options.indexed)
            .map(|(name, _)| name.as_str())
    }

    pub fn stored_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, f)| f.options.stored)
            .map(|(name, _)| name.as_str())
    }

    /// Number of fields, including the raw field
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects field declarations and validates them into a [`Schema`]
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    declarations: Vec<(String, FieldOptions)>,
}

impl SchemaBuilder {
    /// Add a field; validation happens in [`SchemaBuilder::build`]
    pub fn field(mut self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.declarations.push((name.into(), options));
        self
    }

    /// Declare a field, failing immediately on an invalid declaration
    pub fn declare_field(
        &mut self,
        name: impl Into<String>,
        indexed: bool,
        stored: bool,
        analyzer: AnalyzerConfig,
    ) -> Result<&mut Self, SchemaError> {
        let name = name.into();
        let options = FieldOptions::new(indexed, stored, analyzer);
        Self::check(&self.declarations, &name, &options)?;
        self.declarations.push((name, options));
        Ok(self)
    }

    fn check(
        declared: &[(String, FieldOptions)],
        name: &str,
        options: &FieldOptions,
    ) -> Result<(), SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::EmptyFieldName);
        }
        if name == RAW_FIELD {
            return Err(SchemaError::ReservedField(name.to_string()));
        }
        let conflicting = declared
            .iter()
            .any(|(existing, existing_options)| existing == name && existing_options != options);
        if conflicting {
            return Err(SchemaError::ConflictingField {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Validate all declarations and build the schema
    ///
    /// Identical redeclarations collapse into one field. Fields sharing an
    /// analyzer configuration share one analyzer instance.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut analyzers: HashMap<AnalyzerConfig, AnalyzerRef> = HashMap::new();
        let mut fields = BTreeMap::new();

        for (i, (name, options)) in self.declarations.iter().enumerate() {
            Self::check(&self.declarations[..i], name, options)?;
            if fields.contains_key(name) {
                continue;
            }
            let analyzer = Self::analyzer(&mut analyzers, &options.analyzer)?;
            fields.insert(
                name.clone(),
                SchemaField {
                    options: options.clone(),
                    analyzer,
                },
            );
        }

        let raw = FieldOptions::stored_only();
        let analyzer = Self::analyzer(&mut analyzers, &raw.analyzer)?;
        fields.insert(
            RAW_FIELD.to_string(),
            SchemaField {
                options: raw,
                analyzer,
            },
        );

        Ok(Schema { fields })
    }

    fn analyzer(
        cache: &mut HashMap<AnalyzerConfig, AnalyzerRef>,
        config: &AnalyzerConfig,
    ) -> Result<AnalyzerRef, SchemaError> {
        if let Some(analyzer) = cache.get(config) {
            return Ok(analyzer.clone());
        }
        let analyzer = Arc::new(Analyzer::new(config)?);
        cache.insert(config.clone(), analyzer.clone());
        Ok(analyzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_content_schema() -> Schema {
        Schema::builder()
            .field("title", FieldOptions::text().stored())
            .field("content", FieldOptions::text().stored())
            .field("id", FieldOptions::keyword().stored())
            .build()
            .unwrap()
    }

    #[test]
    fn test_schema_lookup() {
        let schema = title_content_schema();

        assert!(schema.is_indexed("title"));
        assert!(schema.is_stored("content"));
        assert!(!schema.is_indexed("missing"));
        assert!(!schema.is_stored("missing"));
        assert!(schema.analyzer_for("title").is_some());
        assert!(schema.analyzer_for("missing").is_none());
        assert_eq!(schema.len(), 4);
    }

    #[test]
    fn test_raw_field_is_implicit() {
        let schema = Schema::builder().build().unwrap();

        assert!(schema.contains(RAW_FIELD));
        assert!(schema.is_stored(RAW_FIELD));
        assert!(!schema.is_indexed(RAW_FIELD));
    }

    #[test]
    fn test_reserved_field_rejected() {
        let err = Schema::builder()
            .field(RAW_FIELD, FieldOptions::text())
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::ReservedField(RAW_FIELD.to_string()));
    }

    #[test]
    fn test_conflicting_duplicate_rejected() {
        let err = Schema::builder()
            .field("title", FieldOptions::text().stored())
            .field("title", FieldOptions::text())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::ConflictingField {
                name: "title".to_string()
            }
        );
    }

    #[test]
    fn test_identical_duplicate_accepted() {
        let schema = Schema::builder()
            .field("title", FieldOptions::text())
            .field("title", FieldOptions::text())
            .build()
            .unwrap();
        assert_eq!(schema.indexed_fields().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn test_declare_field_fails_fast() {
        let mut builder = Schema::builder();
        builder
            .declare_field("title", true, true, AnalyzerConfig::standard())
            .unwrap();

        let err = builder
            .declare_field("title", true, false, AnalyzerConfig::standard())
            .unwrap_err();
        assert!(matches!(err, SchemaError::ConflictingField { .. }));

        assert_eq!(
            builder
                .declare_field("", true, true, AnalyzerConfig::standard())
                .unwrap_err(),
            SchemaError::EmptyFieldName
        );

        let schema = builder.build().unwrap();
        assert!(schema.is_stored("title"));
    }

    #[test]
    fn test_fields_share_analyzer_instances() {
        let schema = title_content_schema();
        let title = schema.analyzer_for("title").unwrap();
        let content = schema.analyzer_for("content").unwrap();
        let id = schema.analyzer_for("id").unwrap();

        assert!(Arc::ptr_eq(title, content));
        assert!(!Arc::ptr_eq(title, id));
    }

    #[test]
    fn test_field_listing() {
        let schema = Schema::builder()
            .field("title", FieldOptions::text().stored())
            .field("body", FieldOptions::text())
            .field("url", FieldOptions::stored_only())
            .build()
            .unwrap();

        assert_eq!(schema.indexed_fields().collect::<Vec<_>>(), vec!["body", "title"]);
        assert_eq!(
            schema.stored_fields().collect::<Vec<_>>(),
            vec![RAW_FIELD, "title", "url"]
        );
    }

    #[test]
    fn test_serialization() {
        let schema = title_content_schema();
        let json = serde_json::to_string(&schema).unwrap();
        assert!(!json.contains(RAW_FIELD));

        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), schema.len());
        assert_eq!(back.field("id"), schema.field("id"));
        assert!(back.contains(RAW_FIELD));
    }
}
