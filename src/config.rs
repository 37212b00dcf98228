use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    column_family::ColumnFamilyDescriptor,
    serializer::SerializerTag,
    util::{Result, Status},
};

fn default_value_type() -> String {
    SerializerTag::String.as_str().to_string()
}

/// Registration of one column family, as written in the config document.
///
/// Serializer tags stay strings here so that an unknown tag is reported as
/// `UnknownSerializer` rather than as a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamilyConfig {
    pub name: String,
    pub key_type: String,
    pub column_type: String,
    #[serde(default = "default_value_type")]
    pub value_type: String,
}

impl ColumnFamilyConfig {
    pub fn new(
        name: impl Into<String>,
        key_type: SerializerTag,
        column_type: SerializerTag,
    ) -> Self {
        ColumnFamilyConfig {
            name: name.into(),
            key_type: key_type.to_string(),
            column_type: column_type.to_string(),
            value_type: default_value_type(),
        }
    }

    pub fn with_value_type(mut self, value_type: SerializerTag) -> Self {
        self.value_type = value_type.to_string();
        self
    }

    pub fn descriptor(&self) -> Result<ColumnFamilyDescriptor> {
        Ok(
            ColumnFamilyDescriptor::new(
                self.name.clone(),
                self.key_type.parse()?,
                self.column_type.parse()?,
            )
            .with_value_type(self.value_type.parse()?),
        )
    }
}

/// Registration inputs, loaded once at startup
///
/// ```json
/// { "keyspaces": ["cmb", "cqs"],
///   "column_families": [
///     { "name": "orders", "key_type": "string", "column_type": "string" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub keyspaces: Vec<String>,
    #[serde(default)]
    pub column_families: Vec<ColumnFamilyConfig>,
}

impl PersistenceConfig {
    pub fn new() -> Self {
        PersistenceConfig::default()
    }

    pub fn keyspace(mut self, name: impl Into<String>) -> Self {
        self.keyspaces.push(name.into());
        self
    }

    pub fn column_family(mut self, cf: ColumnFamilyConfig) -> Self {
        self.column_families.push(cf);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PersistenceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Status::invalid_argument(format!("cannot read config {}", path.display())).caused_by(e)
        })?;
        Self::from_json_str(&json)
    }

    /// Check tags and names without connecting anything.
    pub fn validate(&self) -> Result<()> {
        self.descriptors().map(|_| ())
    }

    pub fn descriptors(&self) -> Result<Vec<ColumnFamilyDescriptor>> {
        let mut seen = HashSet::new();
        self.column_families
            .iter()
            .map(|cf| {
                if !seen.insert(cf.name.as_str()) {
                    return Err(Status::invalid_argument(format!(
                        "Column family '{}' already exists",
                        cf.name
                    )));
                }
                cf.descriptor()
            })
            .collect()
    }
}
