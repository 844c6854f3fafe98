pub mod item;
pub mod tags;

pub use crate::types::identifiers::ContentId;
pub use item::{ContentItem, RawContentItem};
pub use tags::TagSet;
