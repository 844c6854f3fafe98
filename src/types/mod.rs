pub mod identifiers;
pub mod input;
pub mod ranking;
pub mod window;

pub use identifiers::{ContentId, WeekId};
pub use input::InputError;
pub use ranking::{
    QueryVector, RankError, RankOptions, RankedSnippet, Ranking, RankingMetadata, ScoredItem,
    StaleIndexWarning,
};
pub use window::{day_name, parse_day, RawWindow, TimeWindow};
