use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::identifiers::{ContentId, WeekId};
use crate::types::input::InputError;
use crate::types::window::{day_name, RawWindow, TimeWindow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Planned,
    Scheduled,
    Published,
}

/// One item placed into one window of one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub week: WeekId,
    pub window: TimeWindow,
    pub post_id: ContentId,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotEntry {
    pub post_id: ContentId,
    pub status: SlotStatus,
}

/// Every slot of one week. Keyed by window, so a window holds at most one
/// item by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleDocument", into = "ScheduleDocument")]
pub struct WeekSchedule {
    week: WeekId,
    slots: BTreeMap<TimeWindow, SlotEntry>,
}

impl WeekSchedule {
    pub fn new(week: WeekId) -> Self {
        Self {
            week,
            slots: BTreeMap::new(),
        }
    }

    pub fn week(&self) -> WeekId {
        self.week
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_open(&self, window: &TimeWindow) -> bool {
        !self.slots.contains_key(window)
    }

    pub fn occupant(&self, window: &TimeWindow) -> Option<&ContentId> {
        self.slots.get(window).map(|e| &e.post_id)
    }

    /// The window an item already holds this week, if any.
    pub fn window_of(&self, post_id: &ContentId) -> Option<TimeWindow> {
        self.slots
            .iter()
            .find(|(_, e)| e.post_id == *post_id)
            .map(|(w, _)| *w)
    }

    /// Slots in week order (Mon 00:00 first).
    pub fn slots(&self) -> Vec<ScheduleSlot> {
        self.slots
            .iter()
            .map(|(window, entry)| ScheduleSlot {
                week: self.week,
                window: *window,
                post_id: entry.post_id.clone(),
                status: entry.status,
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a schedule document: known day names, hours in
    /// range, a Monday `week_of`, no window used twice and no item placed
    /// twice.
    pub fn from_json(raw: &str) -> Result<Self, InputError> {
        let doc: ScheduleDocument = serde_json::from_str(raw)?;
        WeekSchedule::try_from(doc)
    }

    /// Caller guarantees `window` is open.
    pub(crate) fn insert(&mut self, window: TimeWindow, post_id: ContentId) -> ScheduleSlot {
        self.slots.insert(
            window,
            SlotEntry {
                post_id: post_id.clone(),
                status: SlotStatus::Planned,
            },
        );
        ScheduleSlot {
            week: self.week,
            window,
            post_id,
            status: SlotStatus::Planned,
        }
    }

    pub(crate) fn remove(&mut self, window: &TimeWindow) -> Option<ContentId> {
        self.slots.remove(window).map(|e| e.post_id)
    }
}

/// Wire shape: `{week_of, slots: [{post_id, day, hour, status}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub week_of: String,
    pub slots: Vec<SlotDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDocument {
    pub post_id: String,
    pub day: String,
    pub hour: i64,
    #[serde(default)]
    pub status: SlotStatus,
}

impl TryFrom<ScheduleDocument> for WeekSchedule {
    type Error = InputError;

    fn try_from(doc: ScheduleDocument) -> Result<Self, Self::Error> {
        let week = WeekId::parse(&doc.week_of)?;
        let mut schedule = WeekSchedule::new(week);
        for slot in doc.slots {
            let window = TimeWindow::try_from(RawWindow {
                day: slot.day,
                hour: slot.hour,
            })?;
            let post_id = ContentId::new(slot.post_id)?;
            if !schedule.is_open(&window) {
                return Err(InputError::DuplicateWindow {
                    week: week.to_string(),
                    window: window.to_string(),
                });
            }
            if schedule.window_of(&post_id).is_some() {
                return Err(InputError::DuplicateItem {
                    week: week.to_string(),
                    post_id: post_id.to_string(),
                });
            }
            schedule.slots.insert(
                window,
                SlotEntry {
                    post_id,
                    status: slot.status,
                },
            );
        }
        Ok(schedule)
    }
}

impl From<WeekSchedule> for ScheduleDocument {
    fn from(schedule: WeekSchedule) -> Self {
        ScheduleDocument {
            week_of: schedule.week.to_string(),
            slots: schedule
                .slots
                .into_iter()
                .map(|(window, entry)| SlotDocument {
                    post_id: entry.post_id.as_str().to_string(),
                    day: day_name(window.day()).to_string(),
                    hour: i64::from(window.hour()),
                    status: entry.status,
                })
                .collect(),
        }
    }
}
