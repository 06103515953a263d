//! SLIP (RFC 1055) framing for byte streams.
//!
//! Two layers:
//! - [`codec`]: the stateless side. Delimiter/escape constants, payload
//!   encoding into a self-delimiting frame, and payload recovery from a
//!   complete frame.
//! - [`decoder`]: the stateful side. An incremental decoder that buffers
//!   stream bytes as they arrive and hands back one frame per extraction
//!   attempt, resynchronizing through garbled input.
//!
//! No I/O happens here; callers feed bytes in and take payloads out.

pub mod codec;
pub mod decoder;

pub use codec::{decode, encode, END, ESC, ESC_END, ESC_ESC};
pub use decoder::{FrameDecoder, FrameStatus};
