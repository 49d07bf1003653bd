use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of every definition reference
pub const REF_PREFIX: &str = "#/definitions/";

/// Serialize integral bounds as integers (`1` rather than `1.0`)
fn serialize_number_constraint<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            serializer.serialize_some(&(*v as i64))
        }
        Some(v) => serializer.serialize_some(v),
        None => serializer.serialize_none(),
    }
}

/// `additionalProperties`: either a flag or the value schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// Shape of a schema, derived from which keys are set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Ref,
    Wrapper,
    Object,
    Map,
    Array,
    Scalar,
    Any,
}

/// OpenAPI schema object, as emitted under `definitions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to another definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Wrapper form: a single reference plus the sibling keys below
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Properties in field declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number_constraint"
    )]
    pub minimum: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_number_constraint"
    )]
    pub maximum: Option<f64>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "x-enum-varnames", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_var_names: Vec<String>,
    #[serde(rename = "x-enum-comments", default, skip_serializing_if = "IndexMap::is_empty")]
    pub enum_comments: IndexMap<String, String>,
    #[serde(
        rename = "x-enum-descriptions",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub enum_descriptions: Vec<String>,
}

impl Schema {
    /// The empty schema: accepts any value
    pub fn any() -> Self {
        Schema::default()
    }

    pub fn reference(name: &str) -> Self {
        Schema {
            reference: Some(format!("{}{}", REF_PREFIX, name)),
            ..Default::default()
        }
    }

    pub fn scalar(schema_type: &str, format: Option<&str>) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn object() -> Self {
        Schema {
            schema_type: Some("object".to_string()),
            ..Default::default()
        }
    }

    /// Map schema; `None` means any value is allowed
    pub fn map(values: Option<Schema>) -> Self {
        let additional = match values {
            Some(schema) => AdditionalProperties::Schema(Box::new(schema)),
            None => AdditionalProperties::Allowed(true),
        };
        Schema {
            schema_type: Some("object".to_string()),
            additional_properties: Some(additional),
            ..Default::default()
        }
    }

    /// `allOf: [target]`, ready for sibling keys
    pub fn wrapper(target: Schema) -> Self {
        Schema {
            all_of: vec![target],
            ..Default::default()
        }
    }

    /// Definition name this schema points at, if it is a reference
    pub fn ref_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(REF_PREFIX))
    }

    pub fn kind(&self) -> SchemaKind {
        if self.reference.is_some() {
            return SchemaKind::Ref;
        }
        if !self.all_of.is_empty() {
            return SchemaKind::Wrapper;
        }
        match self.schema_type.as_deref() {
            Some("array") => SchemaKind::Array,
            Some("object") if self.additional_properties.is_some() => SchemaKind::Map,
            Some("object") => SchemaKind::Object,
            Some(_) => SchemaKind::Scalar,
            None => SchemaKind::Any,
        }
    }

    pub fn is_any(&self) -> bool {
        *self == Schema::default()
    }
}
