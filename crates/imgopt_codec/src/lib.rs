//! Image codec for imgopt.
//!
//! Decodes stored bytes into a pixel buffer, downscales by an integer factor
//! and re-encodes as JPEG, PNG or WebP. Everything here is synchronous and
//! CPU-bound; async callers run it on a blocking thread.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod format;

pub use codec::{DecodedImage, ImageCodec};
pub use format::OutputFormat;
pub use imgopt_error::{CodecError, CodecErrorKind, CodecResult};
