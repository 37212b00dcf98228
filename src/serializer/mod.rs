/// Serializer indirection
///
/// Callers and column-family registrations name a logical serializer by tag.
/// The registry turns a tag into the codec that produces the driver's byte
/// form, so no driver type leaks into the public surface.
///
/// ```text
/// "string"    -> StringCodec     UTF-8
/// "long"      -> LongCodec       8 bytes, order-preserving
/// "bytes"     -> BytesCodec      as-is
/// "composite" -> CompositeCodec  see `composite`
/// ```
mod codecs;
mod value;

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

pub use codecs::{BytesCodec, Codec, CompositeCodec, LongCodec, StringCodec};
pub use value::Value;

use crate::util::{Result, Status};

/// Logical serializer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializerTag {
    String,
    Long,
    Bytes,
    Composite,
}

impl SerializerTag {
    pub const ALL: [SerializerTag; 4] = [
        SerializerTag::String,
        SerializerTag::Long,
        SerializerTag::Bytes,
        SerializerTag::Composite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SerializerTag::String => "string",
            SerializerTag::Long => "long",
            SerializerTag::Bytes => "bytes",
            SerializerTag::Composite => "composite",
        }
    }
}

impl fmt::Display for SerializerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SerializerTag {
    type Err = Status;

    fn from_str(s: &str) -> Result<Self> {
        SerializerTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Status::unknown_serializer(format!("unknown serializer '{s}'")))
    }
}

/// Tag -> codec table, filled once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SerializerRegistry {
    codecs: HashMap<SerializerTag, Arc<dyn Codec>>,
}

impl SerializerRegistry {
    /// Registry without any codec. Useful for drivers that only support a
    /// subset of the logical types.
    pub fn empty() -> Self {
        SerializerRegistry {
            codecs: HashMap::new(),
        }
    }

    pub fn register(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codecs.insert(codec.tag(), codec);
        self
    }

    /// Look up the codec for `tag`.
    ///
    /// A missing tag is a programmer error and is never defaulted.
    pub fn resolve(&self, tag: SerializerTag) -> Result<Arc<dyn Codec>> {
        self.codecs
            .get(&tag)
            .cloned()
            .ok_or_else(|| Status::unknown_serializer(format!("no codec registered for '{tag}'")))
    }

    pub fn contains(&self, tag: SerializerTag) -> bool {
        self.codecs.contains_key(&tag)
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        SerializerRegistry::empty()
            .register(Arc::new(StringCodec))
            .register(Arc::new(LongCodec))
            .register(Arc::new(BytesCodec))
            .register(Arc::new(CompositeCodec))
    }
}
