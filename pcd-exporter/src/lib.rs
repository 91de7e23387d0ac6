pub mod destination;
pub mod error;
pub mod format;
pub mod writer;

pub use destination::{suggested_output_path, Destination, FixedDestination};
pub use error::WriteError;
pub use format::FormatPolicy;
pub use writer::{serialize, WriteOptions, WriteSummary};
