use bytes::Bytes;

use super::{SerializerTag, Value};
use crate::{
    composite::{self, Composite},
    util::{Result, Slice, Status},
};

/// Converts logical values to and from the byte form the driver stores.
pub trait Codec: Send + Sync + std::fmt::Debug {
    fn tag(&self) -> SerializerTag;

    fn encode(&self, value: &Value) -> Result<Slice>;

    fn decode(&self, data: &Slice) -> Result<Value>;
}

fn mismatch(tag: SerializerTag, value: &Value) -> Status {
    Status::invalid_argument(format!(
        "{} value cannot be written with the {tag} serializer",
        value.kind()
    ))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StringCodec;

impl Codec for StringCodec {
    fn tag(&self) -> SerializerTag {
        SerializerTag::String
    }

    fn encode(&self, value: &Value) -> Result<Slice> {
        match value {
            Value::String(s) => Ok(Slice::from(s.as_str())),
            other => Err(mismatch(self.tag(), other)),
        }
    }

    fn decode(&self, data: &Slice) -> Result<Value> {
        std::str::from_utf8(data.data())
            .map(|s| Value::String(s.to_string()))
            .map_err(|e| Status::corruption(format!("stored string is not UTF-8: {e}")))
    }
}

/// Longs are stored as 8 big-endian bytes with the sign bit flipped, so the
/// store's byte order is numeric order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LongCodec;

impl Codec for LongCodec {
    fn tag(&self) -> SerializerTag {
        SerializerTag::Long
    }

    fn encode(&self, value: &Value) -> Result<Slice> {
        match value {
            Value::Long(v) => Ok(Slice::from(composite::encode_long(*v).to_vec())),
            other => Err(mismatch(self.tag(), other)),
        }
    }

    fn decode(&self, data: &Slice) -> Result<Value> {
        let raw: [u8; 8] = data.data().try_into().map_err(|_| {
            Status::corruption(format!("stored long has {} bytes, expected 8", data.size()))
        })?;
        Ok(Value::Long(composite::decode_long(raw)))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    fn tag(&self) -> SerializerTag {
        SerializerTag::Bytes
    }

    fn encode(&self, value: &Value) -> Result<Slice> {
        match value {
            Value::Bytes(b) => Ok(Slice::from(b.clone())),
            other => Err(mismatch(self.tag(), other)),
        }
    }

    fn decode(&self, data: &Slice) -> Result<Value> {
        Ok(Value::Bytes(data.to_bytes()))
    }
}

/// Composite values pass through with their existing encoding. Raw bytes
/// handed to this codec are taken to be an encoded composite: they are
/// validated and forwarded unchanged, never wrapped a second time.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompositeCodec;

impl Codec for CompositeCodec {
    fn tag(&self) -> SerializerTag {
        SerializerTag::Composite
    }

    fn encode(&self, value: &Value) -> Result<Slice> {
        match value {
            Value::Composite(c) => Ok(c.encoded()),
            Value::Bytes(b) => {
                composite::decode_components(b)?;
                Ok(Slice::from(b.clone()))
            },
            other => Err(mismatch(self.tag(), other)),
        }
    }

    fn decode(&self, data: &Slice) -> Result<Value> {
        let bytes: Bytes = data.to_bytes();
        Ok(Value::Composite(Composite::decode(bytes)?))
    }
}
