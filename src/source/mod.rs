mod error;
mod filter;
mod replay;
mod track;

pub use error::SourceError;
pub use filter::SourceFilter;
pub use replay::{replay, Pace, ReplaySummary};
pub use track::Track;
