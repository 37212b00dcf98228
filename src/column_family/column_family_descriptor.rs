use crate::serializer::SerializerTag;

/// Registration of a column family
///
/// Fixes the logical types of row keys, column names and column values for
/// the lifetime of the process. Every operation on the family encodes and
/// decodes through the codecs registered for these tags.
///
/// # Example
///
/// ```ignore
/// use widecol::{ColumnFamilyDescriptor, SerializerTag};
///
/// let descriptors = vec![
///     ColumnFamilyDescriptor::new("orders", SerializerTag::String, SerializerTag::String),
///     ColumnFamilyDescriptor::new(
///         "queue_messages",
///         SerializerTag::String,
///         SerializerTag::Composite,
///     ),
///     ColumnFamilyDescriptor::new("stats", SerializerTag::String, SerializerTag::String)
///         .with_value_type(SerializerTag::Long),
/// ];
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFamilyDescriptor {
    pub name: String,

    pub key_type: SerializerTag,

    pub column_type: SerializerTag,

    /// Default: string
    pub value_type: SerializerTag,
}

impl ColumnFamilyDescriptor {
    pub fn new<S: Into<String>>(
        name: S,
        key_type: SerializerTag,
        column_type: SerializerTag,
    ) -> Self {
        ColumnFamilyDescriptor {
            name: name.into(),
            key_type,
            column_type,
            value_type: SerializerTag::String,
        }
    }

    pub fn with_value_type(mut self, value_type: SerializerTag) -> Self {
        self.value_type = value_type;
        self
    }
}
