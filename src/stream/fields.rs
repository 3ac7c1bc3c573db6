//! Table-driven record decoding.
//!
//! Fixed-layout wire records are described by a slice of [`Field`]
//! descriptors, one per field, and decoded by the single generic
//! [`read_fields`] routine instead of bespoke per-record code. A descriptor
//! pairs the wire encoding of the field with a setter that stores the decoded
//! value into a named field of the destination struct, which keeps the
//! mechanism memory safe without byte-offset arithmetic.

use crate::{
    error::FontResult,
    stream::Frame,
};

/// Wire encoding of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    I8,
    U16Be,
    I16Be,
    U16Le,
    I16Le,
    U24Be,
    I24Be,
    U32Be,
    I32Be,
    U32Le,
    I32Le,
    /// `n` raw bytes copied verbatim (fixed-size character arrays)
    Bytes(usize),
    /// `n` bytes consumed without storing anything
    Skip(usize),
}

impl FieldKind {
    pub fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16Be | Self::I16Be | Self::U16Le | Self::I16Le => 2,
            Self::U24Be | Self::I24Be => 3,
            Self::U32Be | Self::I32Be | Self::U32Le | Self::I32Le => 4,
            Self::Bytes(n) | Self::Skip(n) => n,
        }
    }
}

pub enum FieldSetter<T> {
    /// Signed fields arrive sign extended, unsigned fields zero extended
    Int(fn(&mut T, i64)),
    Bytes(fn(&mut T, &[u8])),
    None,
}

pub struct Field<T> {
    pub kind: FieldKind,
    pub set: FieldSetter<T>,
}

impl<T> Field<T> {
    pub const fn int(kind: FieldKind, set: fn(&mut T, i64)) -> Self {
        Self {
            kind,
            set: FieldSetter::Int(set),
        }
    }

    pub const fn bytes(count: usize, set: fn(&mut T, &[u8])) -> Self {
        Self {
            kind: FieldKind::Bytes(count),
            set: FieldSetter::Bytes(set),
        }
    }

    pub const fn skip(count: usize) -> Self {
        Self {
            kind: FieldKind::Skip(count),
            set: FieldSetter::None,
        }
    }
}

/// Total wire size of a record, for callers sizing the frame they enter.
pub fn fields_size<T>(fields: &[Field<T>]) -> usize {
    fields.iter().map(|field| field.kind.size()).sum()
}

/// Decodes each descriptor at the frame cursor in order, storing the results
/// into `dest` and leaving the cursor just past the record.
pub fn read_fields<T>(frame: &mut Frame, fields: &[Field<T>], dest: &mut T) -> FontResult<()> {
    for field in fields {
        let value = match field.kind {
            FieldKind::U8 => i64::from(frame.next_u8()?),
            FieldKind::I8 => i64::from(frame.next_i8()?),
            FieldKind::U16Be => i64::from(frame.next_u16_be()?),
            FieldKind::I16Be => i64::from(frame.next_i16_be()?),
            FieldKind::U16Le => i64::from(frame.next_u16_le()?),
            FieldKind::I16Le => i64::from(frame.next_i16_le()?),
            FieldKind::U24Be => i64::from(frame.next_u24_be()?),
            FieldKind::I24Be => i64::from(frame.next_i24_be()?),
            FieldKind::U32Be => i64::from(frame.next_u32_be()?),
            FieldKind::I32Be => i64::from(frame.next_i32_be()?),
            FieldKind::U32Le => i64::from(frame.next_u32_le()?),
            FieldKind::I32Le => i64::from(frame.next_i32_le()?),
            FieldKind::Bytes(count) => {
                let bytes = frame.next_bytes(count)?;
                if let FieldSetter::Bytes(set) = &field.set {
                    set(dest, bytes);
                }
                continue;
            }
            FieldKind::Skip(count) => {
                frame.skip(count)?;
                continue;
            }
        };

        if let FieldSetter::Int(set) = &field.set {
            set(dest, value);
        }
    }

    Ok(())
}
