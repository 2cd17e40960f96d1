//! Key-value records of learning and evaluation.
//!
//! Policy learners return a [`Record`] from each learning step and the online-learning
//! driver writes one per episode to a [`Recorder`].
//!
//! ```rust
//! use kestrel_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("episode_return", -3.0);
//! record.insert("steps", RecordValue::Scalar(4.0));
//! assert_eq!(record.get_scalar("steps").unwrap(), 4.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
