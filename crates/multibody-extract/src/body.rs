//! Replayable request body.
//!
//! A transport body can be read once. [`ReplayableBody`] drains it into
//! memory a single time and then hands out any number of independent
//! readers, so the resolver and the host's own body reader can both see the
//! full payload.

use crate::{ExtractionContext, ExtractionError, FromRequest};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use std::io::{self, BufRead, Cursor, Read};
use std::ops::Deref;

/// Default maximum body size captured into memory (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Request body captured once and readable any number of times.
///
/// Cloning is cheap: all clones share the same immutable buffer.
///
/// # Example
///
/// ```rust
/// use multibody_extract::ReplayableBody;
/// use std::io::Read;
///
/// let body = ReplayableBody::capture(&b"{\"a\":1}"[..], 1024).unwrap();
///
/// let mut first = String::new();
/// body.open().read_to_string(&mut first).unwrap();
///
/// let mut second = String::new();
/// body.open().read_to_string(&mut second).unwrap();
///
/// assert_eq!(first, second);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayableBody(Bytes);

impl ReplayableBody {
    /// Wraps bytes that were already captured.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Drains `reader` into memory.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` when more than `limit` bytes arrive, `BodyRead`
    /// when the reader fails. Either is fatal for the request.
    pub fn capture<R: Read>(reader: R, limit: usize) -> Result<Self, ExtractionError> {
        let mut buf = Vec::new();
        reader
            .take(limit as u64 + 1)
            .read_to_end(&mut buf)
            .map_err(ExtractionError::body_read)?;

        if buf.len() > limit {
            return Err(ExtractionError::payload_exceeds(limit));
        }

        tracing::trace!(bytes = buf.len(), "captured request body");
        Ok(Self(Bytes::from(buf)))
    }

    /// Drains an HTTP body into memory.
    ///
    /// # Errors
    ///
    /// Same as [`ReplayableBody::capture`].
    pub async fn capture_body<B>(body: B, limit: usize) -> Result<Self, ExtractionError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if let Some(exact) = body.size_hint().exact() {
            let exact = usize::try_from(exact).unwrap_or(usize::MAX);
            if exact > limit {
                return Err(ExtractionError::payload_too_large(limit, exact));
            }
        }

        let collected = Limited::new(body, limit).collect().await.map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                ExtractionError::payload_exceeds(limit)
            } else {
                ExtractionError::body_read(e)
            }
        })?;

        let bytes = collected.to_bytes();
        tracing::trace!(bytes = bytes.len(), "captured request body");
        Ok(Self(bytes))
    }

    /// Opens a fresh reader positioned at the start of the body.
    #[must_use]
    pub fn open(&self) -> BodyReader {
        BodyReader(Cursor::new(self.0.clone()))
    }

    /// Returns the body as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns a shared handle to the captured bytes.
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        self.0.clone()
    }

    /// Returns the length of the body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for ReplayableBody {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Bytes> for ReplayableBody {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<ReplayableBody> for Bytes {
    fn from(body: ReplayableBody) -> Self {
        body.0
    }
}

impl FromRequest for ReplayableBody {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        ctx.body()
            .cloned()
            .ok_or_else(|| ExtractionError::structural("ReplayableBody", "request body was not captured"))
    }
}

/// Independently positioned reader over a [`ReplayableBody`].
#[derive(Debug, Clone)]
pub struct BodyReader(Cursor<Bytes>);

impl BodyReader {
    /// Returns the current read position.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.0.position()
    }
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl BufRead for BodyReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.0.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.0.consume(amt);
    }
}
