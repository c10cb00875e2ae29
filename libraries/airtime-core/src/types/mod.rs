mod ids;
mod source;
mod track;

pub use ids::TrackId;
pub use source::{PreparedItem, Source};
pub use track::Track;
