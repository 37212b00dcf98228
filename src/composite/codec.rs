use bytes::Bytes;

use super::{Component, TAG_BYTES, TAG_LONG, TAG_STRING};
use crate::util::{Result, Status};

const ESCAPE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xFF;
const TERMINATOR: u8 = 0x01;
const SIGN_BIT: u64 = 1 << 63;

/// Encode components into their order-preserving byte form.
pub fn encode_components(components: &[Component]) -> Result<Vec<u8>> {
    if components.is_empty() {
        return Err(Status::invalid_composite(
            "a composite needs at least one component",
        ));
    }

    let mut buf = Vec::with_capacity(components.iter().map(encoded_len_hint).sum());
    for component in components {
        buf.push(component.tag());
        match component {
            Component::Long(v) => buf.extend_from_slice(&encode_long(*v)),
            Component::String(s) => put_escaped(&mut buf, s.as_bytes()),
            Component::Bytes(b) => put_escaped(&mut buf, b),
        }
    }
    Ok(buf)
}

/// Decode the byte form produced by [`encode_components`].
pub fn decode_components(data: &[u8]) -> Result<Vec<Component>> {
    if data.is_empty() {
        return Err(Status::invalid_composite("empty composite encoding"));
    }

    let mut components = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let tag = data[pos];
        pos += 1;
        let component = match tag {
            TAG_LONG => {
                let raw: [u8; 8] = data
                    .get(pos..pos + 8)
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(|| Status::invalid_composite("truncated long component"))?;
                pos += 8;
                Component::Long(decode_long(raw))
            },
            TAG_STRING => {
                let raw = take_escaped(data, &mut pos)?;
                let s = String::from_utf8(raw)
                    .map_err(|_| Status::invalid_composite("string component is not UTF-8"))?;
                Component::String(s)
            },
            TAG_BYTES => Component::Bytes(Bytes::from(take_escaped(data, &mut pos)?)),
            other => {
                return Err(Status::invalid_composite(format!(
                    "unknown component tag {other:#04x} at offset {}",
                    pos - 1
                )));
            },
        };
        components.push(component);
    }
    Ok(components)
}

#[inline]
pub(crate) fn encode_long(v: i64) -> [u8; 8] {
    ((v as u64) ^ SIGN_BIT).to_be_bytes()
}

#[inline]
pub(crate) fn decode_long(raw: [u8; 8]) -> i64 {
    (u64::from_be_bytes(raw) ^ SIGN_BIT) as i64
}

fn encoded_len_hint(c: &Component) -> usize {
    match c {
        Component::Long(_) => 9,
        Component::String(s) => s.len() + 3,
        Component::Bytes(b) => b.len() + 3,
    }
}

fn put_escaped(buf: &mut Vec<u8>, raw: &[u8]) {
    for &b in raw {
        buf.push(b);
        if b == ESCAPE {
            buf.push(ESCAPED_ZERO);
        }
    }
    buf.push(ESCAPE);
    buf.push(TERMINATOR);
}

fn take_escaped(data: &[u8], pos: &mut usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let b = *data
            .get(*pos)
            .ok_or_else(|| Status::invalid_composite("unterminated component"))?;
        *pos += 1;
        if b != ESCAPE {
            out.push(b);
            continue;
        }
        match data.get(*pos) {
            Some(&ESCAPED_ZERO) => {
                out.push(ESCAPE);
                *pos += 1;
            },
            Some(&TERMINATOR) => {
                *pos += 1;
                return Ok(out);
            },
            _ => return Err(Status::invalid_composite("bad escape sequence")),
        }
    }
}
