pub mod scheduler;
pub mod slot;

use thiserror::Error;

use crate::types::identifiers::{ContentId, WeekId};
use crate::types::window::TimeWindow;

pub use scheduler::{Assignment, ScheduleReport, Scheduler};
pub use slot::{ScheduleDocument, ScheduleSlot, SlotDocument, SlotStatus, WeekSchedule};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("No open window left for {post_id} in week {week} ({pool_size} windows in pool)")]
    CapacityExceeded {
        post_id: ContentId,
        week: WeekId,
        pool_size: usize,
    },

    #[error("Window {window} in week {week} is already taken by {occupant}")]
    SlotOccupied {
        week: WeekId,
        window: TimeWindow,
        occupant: ContentId,
    },

    #[error("{post_id} is already scheduled at {window} in week {week}")]
    AlreadyScheduled {
        post_id: ContentId,
        week: WeekId,
        window: TimeWindow,
    },
}
