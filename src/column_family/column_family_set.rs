use std::{collections::HashMap, sync::Arc};

use crate::{
    column_family::ColumnFamilyDescriptor,
    serializer::{Codec, SerializerRegistry},
    util::{Result, Status},
};

/// A registered column family with its codecs resolved.
#[derive(Debug, Clone)]
pub struct ColumnFamily {
    descriptor: ColumnFamilyDescriptor,
    key_codec: Arc<dyn Codec>,
    column_codec: Arc<dyn Codec>,
    value_codec: Arc<dyn Codec>,
}

impl ColumnFamily {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ColumnFamilyDescriptor {
        &self.descriptor
    }

    pub fn key_codec(&self) -> &Arc<dyn Codec> {
        &self.key_codec
    }

    pub fn column_codec(&self) -> &Arc<dyn Codec> {
        &self.column_codec
    }

    pub fn value_codec(&self) -> &Arc<dyn Codec> {
        &self.value_codec
    }
}

/// All column families known to the process
///
/// Built once from the registration inputs; afterwards it is only read, so
/// it is shared behind an `Arc` without any lock.
///
/// # Lifecycle
///
/// ```text
/// startup → ColumnFamilySet::open(descriptors, serializers)
///         ↓             (codecs resolved, duplicates rejected)
/// every operation → get(name) → ColumnFamily
/// ```
#[derive(Debug, Default)]
pub struct ColumnFamilySet {
    column_families: HashMap<String, ColumnFamily>,
}

impl ColumnFamilySet {
    /// Register every descriptor, resolving its serializer tags.
    ///
    /// Fails with `UnknownSerializer` when a tag has no codec and with
    /// `InvalidArgument` when a name is registered twice.
    pub fn open(
        descriptors: &[ColumnFamilyDescriptor],
        serializers: &SerializerRegistry,
    ) -> Result<Self> {
        let mut column_families = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if column_families.contains_key(&descriptor.name) {
                return Err(Status::invalid_argument(format!(
                    "Column family '{}' already exists",
                    descriptor.name
                )));
            }

            let cf = ColumnFamily {
                key_codec: serializers.resolve(descriptor.key_type)?,
                column_codec: serializers.resolve(descriptor.column_type)?,
                value_codec: serializers.resolve(descriptor.value_type)?,
                descriptor: descriptor.clone(),
            };
            column_families.insert(descriptor.name.clone(), cf);
        }

        Ok(ColumnFamilySet { column_families })
    }

    /// Get column family by name
    pub fn get(&self, name: &str) -> Result<&ColumnFamily> {
        self.column_families.get(name).ok_or_else(|| {
            Status::unknown_column_family(format!("Column family '{name}' is not registered"))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.column_families.keys().map(String::as_str).collect()
    }

    /// Get number of column families
    pub fn count(&self) -> usize {
        self.column_families.len()
    }
}
