//! Turns a streamed response body into reply fragments.
//!
//! Three layers, innermost first: [`Utf8Decoder`] turns bytes into text
//! without breaking characters split across chunks, [`SseDecoder`] frames that
//! text into `data:` lines and parses them, and [`StreamDecoder`] pulls chunks
//! from the transport on demand.

pub mod sse;
pub mod stream;
pub mod utf8;

pub use sse::{classify, parse_payload, DecodedLine, Fragment, SseDecoder, DATA_PREFIX, DONE_MARKER};
pub use stream::StreamDecoder;
pub use utf8::Utf8Decoder;
