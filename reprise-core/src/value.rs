//! Values accepted by the cache and their byte encoding.

use std::fmt::{self, Write};

use bytes::Bytes;

/// A value the cache can store.
///
/// Stores only know bytes, so every variant has a fixed byte encoding
/// (see [`StoredValue::to_bytes`]). The original variant is not recorded:
/// reading back an `Integer` yields its decimal text, which callers decode
/// with the integer accessor of the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// UTF-8 text, stored verbatim.
    Text(String),
    /// Arbitrary bytes, stored verbatim.
    Binary(Bytes),
    /// Signed integer, stored as decimal text.
    Integer(i64),
    /// Floating point number, stored as decimal text that always keeps a
    /// fractional part or exponent (`3.0`, not `3`).
    Float(f64),
}

impl StoredValue {
    /// Encodes the value the way it is written to the store.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            StoredValue::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            StoredValue::Binary(bytes) => bytes.clone(),
            StoredValue::Integer(value) => Bytes::from(value.to_string()),
            StoredValue::Float(value) => Bytes::from(format!("{value:?}")),
        }
    }

    /// Renders the value as a single-element argument tuple.
    ///
    /// This is the form recorded in call histories:
    ///
    /// ```
    /// use reprise_core::StoredValue;
    ///
    /// assert_eq!(StoredValue::from("a").as_argument_tuple(), r#"("a",)"#);
    /// assert_eq!(StoredValue::from(42).as_argument_tuple(), "(42,)");
    /// assert_eq!(StoredValue::from(2.5).as_argument_tuple(), "(2.5,)");
    /// assert_eq!(StoredValue::from(&b"\x00ok"[..]).as_argument_tuple(), r#"(b"\x00ok",)"#);
    /// ```
    pub fn as_argument_tuple(&self) -> String {
        format!("({self},)")
    }
}

/// Literal-like rendering: quoted text, `b"..."` bytes, bare numbers.
impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Text(text) => write!(f, "{text:?}"),
            StoredValue::Binary(bytes) => {
                f.write_str("b\"")?;
                for chunk in bytes.utf8_chunks() {
                    for c in chunk.valid().chars() {
                        match c {
                            '"' => f.write_str("\\\"")?,
                            '\\' => f.write_str("\\\\")?,
                            ' '..='~' => f.write_char(c)?,
                            c if c.is_ascii() => write!(f, "\\x{:02x}", c as u8)?,
                            c => {
                                let mut buf = [0u8; 4];
                                for byte in c.encode_utf8(&mut buf).bytes() {
                                    write!(f, "\\x{byte:02x}")?;
                                }
                            }
                        }
                    }
                    for byte in chunk.invalid() {
                        write!(f, "\\x{byte:02x}")?;
                    }
                }
                f.write_char('"')
            }
            StoredValue::Integer(value) => write!(f, "{value}"),
            StoredValue::Float(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_owned())
    }
}

impl From<Bytes> for StoredValue {
    fn from(value: Bytes) -> Self {
        StoredValue::Binary(value)
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Binary(Bytes::from(value))
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Binary(Bytes::copy_from_slice(value))
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Integer(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Integer(value.into())
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}
