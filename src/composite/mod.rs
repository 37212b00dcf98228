/// Composite key encoding
///
/// A composite packs an ordered, non-empty sequence of typed components into
/// one byte string whose byte order equals the component-wise order. Range
/// queries bounded by composites can therefore be answered by the store
/// without decoding anything.
///
/// # Wire format
///
/// ```text
/// composite := component+
/// component := tag payload
///
/// tag 0x01  long    8 bytes, big-endian, sign bit flipped
/// tag 0x02  string  UTF-8 bytes, escaped, terminated
/// tag 0x03  bytes   raw bytes, escaped, terminated
///
/// escaped   := 0x00 -> 0x00 0xFF, every other byte as-is
/// terminator:= 0x00 0x01
/// ```
///
/// Components of different kinds order by tag. Within a kind the payload
/// encoding is order-preserving, and a composite that is a strict prefix of
/// another sorts first.
mod codec;

use std::{cmp::Ordering, fmt, hash};

use bytes::Bytes;

pub use codec::{decode_components, encode_components};
pub(crate) use codec::{decode_long, encode_long};

use crate::util::{Result, Slice};

pub(crate) const TAG_LONG: u8 = 0x01;
pub(crate) const TAG_STRING: u8 = 0x02;
pub(crate) const TAG_BYTES: u8 = 0x03;

/// One element of a composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    Long(i64),
    String(String),
    Bytes(Bytes),
}

impl Component {
    fn tag(&self) -> u8 {
        match self {
            Component::Long(_) => TAG_LONG,
            Component::String(_) => TAG_STRING,
            Component::Bytes(_) => TAG_BYTES,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Component::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Component::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Component::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Component::Long(a), Component::Long(b)) => a.cmp(b),
            (Component::String(a), Component::String(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Component::Bytes(a), Component::Bytes(b)) => a.cmp(b),
            _ => self.tag().cmp(&other.tag()),
        }
    }
}

impl From<i64> for Component {
    fn from(v: i64) -> Self {
        Component::Long(v)
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Self {
        Component::String(s.to_string())
    }
}

impl From<String> for Component {
    fn from(s: String) -> Self {
        Component::String(s)
    }
}

impl From<Bytes> for Component {
    fn from(b: Bytes) -> Self {
        Component::Bytes(b)
    }
}

impl From<Vec<u8>> for Component {
    fn from(b: Vec<u8>) -> Self {
        Component::Bytes(Bytes::from(b))
    }
}

/// An encoded composite together with its decoded components.
///
/// The encoded form is computed once at construction; encoding a composite
/// again (or one obtained by decoding driver bytes) hands back the very same
/// bytes, so values that are already composite are never re-encoded.
#[derive(Clone)]
pub struct Composite {
    components: Vec<Component>,
    encoded: Bytes,
}

impl Composite {
    /// Build a composite from its components.
    ///
    /// Fails with `InvalidComposite` for an empty component list.
    pub fn new<I, C>(components: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Component>,
    {
        let components: Vec<Component> = components.into_iter().map(Into::into).collect();
        let encoded = encode_components(&components)?;
        Ok(Composite {
            components,
            encoded: Bytes::from(encoded),
        })
    }

    /// Parse an encoded composite, keeping the given bytes as its encoding.
    pub fn decode(encoded: impl Into<Bytes>) -> Result<Self> {
        let encoded = encoded.into();
        let components = decode_components(&encoded)?;
        Ok(Composite {
            components,
            encoded,
        })
    }

    pub fn encoded(&self) -> Slice {
        Slice::from(self.encoded.clone())
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, i: usize) -> Option<&Component> {
        self.components.get(i)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false: a composite has at least one component.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component-wise comparison. Agrees with comparing `encoded()` bytes.
    pub fn compare(&self, other: &Composite) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialEq for Composite {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for Composite {}

impl hash::Hash for Composite {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}

impl PartialOrd for Composite {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Composite {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encoded.cmp(&other.encoded)
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Composite").field(&self.components).finish()
    }
}

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            match c {
                Component::Long(v) => write!(f, "{v}")?,
                Component::String(s) => write!(f, "{s}")?,
                Component::Bytes(b) => write!(f, "{:?}", &b[..])?,
            }
        }
        write!(f, ")")
    }
}
