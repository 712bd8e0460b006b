//! Request body character sets.
//!
//! Body bytes are decoded with the charset declared on the request's
//! Content-Type, falling back to a configured default (UTF-8).

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// A character set the body decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// UTF-8 (the default)
    #[default]
    Utf8,
    /// 7-bit US-ASCII
    UsAscii,
    /// ISO-8859-1 (Latin-1); every byte maps to the code point of equal value
    Latin1,
}

/// Failure to decode body bytes in the selected charset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("body is not valid {charset} (first bad byte at offset {offset})")]
pub struct CharsetError {
    /// Charset the bytes were decoded with.
    pub charset: Charset,
    /// Offset of the first byte that could not be decoded.
    pub offset: usize,
}

impl Charset {
    /// Looks up a charset by its IANA label, case-insensitively.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().trim_matches('"').to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "us-ascii" | "ascii" => Some(Self::UsAscii),
            "iso-8859-1" | "iso_8859-1" | "latin1" | "l1" => Some(Self::Latin1),
            _ => None,
        }
    }

    /// Returns the `charset` parameter of a Content-Type value, if declared.
    ///
    /// An unparseable Content-Type is treated as declaring nothing.
    #[must_use]
    pub fn declared_label(content_type: Option<&str>) -> Option<String> {
        let mime: mime::Mime = content_type?.parse().ok()?;
        mime.get_param(mime::CHARSET).map(|v| v.as_str().to_string())
    }

    /// Returns the canonical label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::UsAscii => "us-ascii",
            Self::Latin1 => "iso-8859-1",
        }
    }

    /// Decodes bytes into text.
    ///
    /// UTF-8 and ASCII input is borrowed; Latin-1 allocates.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>, CharsetError> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| CharsetError {
                    charset: self,
                    offset: e.valid_up_to(),
                }),
            Self::UsAscii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(CharsetError {
                    charset: self,
                    offset,
                }),
                // ASCII is a strict subset of UTF-8
                None => std::str::from_utf8(bytes)
                    .map(Cow::Borrowed)
                    .map_err(|e| CharsetError {
                        charset: self,
                        offset: e.valid_up_to(),
                    }),
            },
            Self::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unsupported charset '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Charset::from_label("UTF-8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_label("utf8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_label("US-ASCII"), Some(Charset::UsAscii));
        assert_eq!(Charset::from_label("ISO-8859-1"), Some(Charset::Latin1));
        assert_eq!(Charset::from_label("shift_jis"), None);
        assert_eq!("latin1".parse::<Charset>(), Ok(Charset::Latin1));
    }

    #[test]
    fn test_declared_label() {
        assert_eq!(
            Charset::declared_label(Some("application/json; charset=ISO-8859-1")).as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(Charset::declared_label(Some("application/json")), None);
        assert_eq!(Charset::declared_label(None), None);
    }

    #[test]
    fn test_decode_utf8() {
        let text = Charset::Utf8.decode("{\"name\":\"Zoë\"}".as_bytes()).unwrap();
        assert_eq!(text, "{\"name\":\"Zoë\"}");

        let err = Charset::Utf8.decode(&[b'{', 0xFF]).unwrap_err();
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn test_decode_ascii_rejects_high_bytes() {
        assert_eq!(Charset::UsAscii.decode(b"{}").unwrap(), "{}");
        assert_eq!(Charset::UsAscii.decode(&[b'a', 0xE9]).unwrap_err().offset, 1);
    }

    #[test]
    fn test_decode_latin1() {
        let text = Charset::Latin1.decode(&[b'"', 0xE9, b'"']).unwrap();
        assert_eq!(text, "\"é\"");
    }
}
