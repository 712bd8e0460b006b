//! Middleware stages.
//!
//! 1. [`request_id`] - Generate/propagate request ID
//! 2. [`error_normalization`] - Render extraction errors as envelopes
//! 3. [`body_buffer`] - Capture the request body for replay

pub mod body_buffer;
pub mod error_normalization;
pub mod request_id;

pub use body_buffer::BodyBufferMiddleware;
pub use error_normalization::{error_response, rejection, ErrorNormalizationMiddleware, NormalizedError};
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
