//! Building timed subtitles from extracted subtitle frames.
//!
//! A batch description maps frame images to time ranges, recognised or
//! imported text is attached to each frame, and the result is written out
//! as SRT.

pub mod batch;
pub mod error;
pub mod markup;
pub mod parser;
pub mod serialiser;
pub mod session;
pub mod subtitle;

pub use error::SubframeError;
pub use markup::{Marker, Selection};
pub use session::{Frame, FrameSource, Notifier, Recognizer, Session};
pub use subtitle::SubtitleRecord;
