//! Variable descriptors and dataset schemas.
//!
//! Schemas are read from tabular data packages:
//!
//! ```json
//! {
//!   "name": "p",
//!   "resources": [{
//!     "path": "p.csv",
//!     "schema": {
//!       "fields": [
//!         {"name": "sex", "label": "Gender", "type": "cat",
//!          "values": [{"value": 1, "label": "male"}, {"value": 2, "label": "female"}]},
//!         {"name": "age", "label": "Age", "type": "number"}
//!       ]
//!     }
//!   }]
//! }
//! ```

use crate::error::{Result, ResultExt, StatsError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::Path;

// =============================================================================
// Scale
// =============================================================================

/// Declared measurement scale of a variable.
///
/// Deserializes from the data package `type` strings; anything unrecognized
/// (including the empty string) becomes [`Scale::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scale {
    Categorical,
    Numeric,
    String,
    Unknown,
}

impl Scale {
    /// Three-letter tag written into each record's `scale` field.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Categorical => "cat",
            Self::Numeric => "num",
            Self::String => "str",
            Self::Unknown => "",
        }
    }
}

impl From<String> for Scale {
    fn from(value: String) -> Self {
        match value.as_str() {
            "cat" => Self::Categorical,
            "number" => Self::Numeric,
            "string" => Self::String,
            _ => Self::Unknown,
        }
    }
}

impl From<Scale> for String {
    fn from(scale: Scale) -> Self {
        match scale {
            Scale::Categorical => "cat",
            Scale::Numeric => "number",
            Scale::String => "string",
            Scale::Unknown => "",
        }
        .to_string()
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// One entry of a categorical variable's value vocabulary.
///
/// `value` is the raw code as stored in the data, sentinel encodings included.
/// Packages may write it as an integer, a whole float (`1.0`) or a numeric
/// string (`"1"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryValue {
    #[serde(deserialize_with = "deserialize_code")]
    pub value: i64,
    #[serde(default)]
    pub label: String,
}

impl CategoryValue {
    pub fn new(value: i64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

fn deserialize_code<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCode {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    let whole = |v: f64| (v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64);
    let code = match RawCode::deserialize(deserializer)? {
        RawCode::Integer(v) => Some(v),
        RawCode::Float(v) => whole(v),
        RawCode::Text(ref text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole))
        }
    };
    code.ok_or_else(|| D::Error::custom("category value must be a whole number"))
}

/// Read-only metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    pub name: String,

    #[serde(default)]
    pub label: String,

    /// Declared scale; `None` defers to the column's storage type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,

    /// Ordered value vocabulary. Non-empty only for categorical variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<CategoryValue>,
}

impl VariableDescriptor {
    /// Descriptor with no declared scale.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            scale: None,
            values: Vec::new(),
        }
    }

    pub fn categorical(
        name: impl Into<String>,
        label: impl Into<String>,
        values: Vec<CategoryValue>,
    ) -> Self {
        Self::new(name, label)
            .with_scale(Scale::Categorical)
            .with_values(values)
    }

    pub fn numeric(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label).with_scale(Scale::Numeric)
    }

    pub fn string(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label).with_scale(Scale::String)
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_values(mut self, values: Vec<CategoryValue>) -> Self {
        self.values = values;
        self
    }

    /// Key of this variable in the statistics document.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

// =============================================================================
// Dataset schema
// =============================================================================

/// The ordered list of variable descriptors for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    pub name: String,
    pub fields: Vec<VariableDescriptor>,
}

#[derive(Debug, Deserialize)]
struct DataPackage {
    name: String,
    #[serde(default)]
    resources: Vec<PackageResource>,
}

#[derive(Debug, Deserialize)]
struct PackageResource {
    schema: ResourceSchema,
}

#[derive(Debug, Deserialize)]
struct ResourceSchema {
    #[serde(default)]
    fields: Vec<VariableDescriptor>,
}

impl DatasetSchema {
    pub fn new(name: impl Into<String>, fields: Vec<VariableDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Parse a tabular data package. Only the first resource is used.
    pub fn from_package_json(json: &str) -> Result<Self> {
        let package: DataPackage = serde_json::from_str(json)?;
        let resource = package.resources.into_iter().next().ok_or_else(|| {
            StatsError::InvalidSchema(format!("data package '{}' has no resources", package.name))
        })?;

        Ok(Self {
            name: package.name,
            fields: resource.schema.fields,
        })
    }

    /// Read and parse a tabular data package from disk.
    pub fn from_package_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(StatsError::from)
            .context(format!("reading {}", path.display()))?;
        Self::from_package_json(&content).context(format!("parsing {}", path.display()))
    }

    pub fn field(&self, name: &str) -> Option<&VariableDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Reject schemas that cannot produce a well-formed document.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(StatsError::InvalidSchema(format!(
                    "field #{index} has an empty name"
                )));
            }
            if !seen.insert(field.key()) {
                return Err(StatsError::InvalidSchema(format!(
                    "duplicate variable '{}' (names are case-insensitive)",
                    field.name
                )));
            }
        }
        Ok(())
    }

    /// A translated schema must list the same variables in the same order.
    pub fn check_translation(&self, translated: &DatasetSchema) -> Result<()> {
        if self.fields.len() != translated.fields.len() {
            return Err(StatsError::InvalidSchema(format!(
                "translated schema has {} fields, expected {}",
                translated.fields.len(),
                self.fields.len()
            )));
        }

        for (original, other) in self.fields.iter().zip(&translated.fields) {
            if original.name != other.name {
                return Err(StatsError::InvalidSchema(format!(
                    "translated schema lists '{}' where '{}' was expected",
                    other.name, original.name
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Study identification
// =============================================================================

/// Identification strings copied verbatim into every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyInfo {
    pub study: String,
    pub analysis_unit: String,
    pub period: String,
    pub sub_type: String,
    pub boost: String,
}

impl StudyInfo {
    pub fn new(study: impl Into<String>) -> Self {
        Self {
            study: study.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PACKAGE: &str = r#"{
        "name": "P",
        "resources": [{
            "path": "p.tab",
            "schema": {
                "fields": [
                    {"name": "sex", "label": "Gender", "type": "cat",
                     "values": [{"value": -1, "label": "no answer"}, {"value": 1, "label": "male"}]},
                    {"name": "age", "label": "Age", "type": "number"},
                    {"name": "note", "type": "string"},
                    {"name": "blob", "type": "binary"},
                    {"name": "plain"}
                ]
            }
        }]
    }"#;

    #[test]
    fn test_from_package_json() {
        let schema = DatasetSchema::from_package_json(PACKAGE).unwrap();
        assert_eq!(schema.name, "P");
        assert_eq!(schema.fields.len(), 5);

        let sex = &schema.fields[0];
        assert_eq!(sex.scale, Some(Scale::Categorical));
        assert_eq!(
            sex.values,
            vec![CategoryValue::new(-1, "no answer"), CategoryValue::new(1, "male")]
        );
        assert_eq!(schema.fields[1].scale, Some(Scale::Numeric));
        assert_eq!(schema.fields[2].label, "");
        assert_eq!(schema.fields[3].scale, Some(Scale::Unknown));
        assert_eq!(schema.fields[4].scale, None);
    }

    #[test]
    fn test_category_values_parse_leniently() {
        let values: Vec<CategoryValue> = serde_json::from_str(
            r#"[{"value": 1}, {"value": 2.0}, {"value": " 3 "}, {"value": "4294967295"}, {"value": "-2.0"}]"#,
        )
        .unwrap();
        let codes: Vec<i64> = values.iter().map(|v| v.value).collect();
        assert_eq!(codes, vec![1, 2, 3, 4_294_967_295, -2]);

        for bad in [r#"{"value": 1.5}"#, r#"{"value": "yes"}"#, r#"{"value": null}"#] {
            assert!(serde_json::from_str::<CategoryValue>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_package_without_resources() {
        let err = DatasetSchema::from_package_json(r#"{"name": "x", "resources": []}"#)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SCHEMA");
    }

    #[test]
    fn test_package_path_errors_carry_the_path() {
        let err = DatasetSchema::from_package_path("/nonexistent/datapackage.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().starts_with("reading /nonexistent/datapackage.json: "));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_empty_names() {
        let duplicate = DatasetSchema::new(
            "d",
            vec![
                VariableDescriptor::numeric("Age", ""),
                VariableDescriptor::numeric("age", ""),
            ],
        );
        assert!(duplicate.validate().is_err());

        let empty = DatasetSchema::new("d", vec![VariableDescriptor::new(" ", "")]);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_check_translation() {
        let schema = DatasetSchema::new(
            "d",
            vec![VariableDescriptor::new("a", "A"), VariableDescriptor::new("b", "B")],
        );
        let same = DatasetSchema::new(
            "d",
            vec![VariableDescriptor::new("a", "A de"), VariableDescriptor::new("b", "B de")],
        );
        let reordered = DatasetSchema::new(
            "d",
            vec![VariableDescriptor::new("b", ""), VariableDescriptor::new("a", "")],
        );
        let short = DatasetSchema::new("d", vec![VariableDescriptor::new("a", "")]);

        assert!(schema.check_translation(&same).is_ok());
        assert!(schema.check_translation(&reordered).is_err());
        assert!(schema.check_translation(&short).is_err());
    }

    #[test]
    fn test_scale_short_names() {
        assert_eq!(Scale::Categorical.short_name(), "cat");
        assert_eq!(Scale::Numeric.short_name(), "num");
        assert_eq!(Scale::String.short_name(), "str");
        assert_eq!(Scale::Unknown.short_name(), "");
        assert_eq!(String::from(Scale::Numeric), "number");
    }
}
