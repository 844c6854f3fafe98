use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::content::ContentItem;
use crate::experiment::WindowPool;
use crate::schedule::slot::{ScheduleSlot, WeekSchedule};
use crate::schedule::ScheduleError;
use crate::types::identifiers::{ContentId, WeekId};
use crate::types::window::TimeWindow;

/// Outcome of one `schedule` batch. Items that could not be placed are
/// listed with their error; everything in `assigned` is committed.
#[derive(Debug, Default)]
pub struct ScheduleReport {
    pub assigned: Vec<ScheduleSlot>,
    pub rejected: Vec<(ContentId, ScheduleError)>,
}

impl ScheduleReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// What an `assign` call changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub window: TimeWindow,
    pub week: WeekId,
    pub post_id: ContentId,
    /// Prior occupant removed by a forced assign.
    pub displaced: Option<ContentId>,
}

/// Places items into week slots without double-booking.
///
/// Reads window quality only through a `WindowPool` snapshot; never touches
/// arm state.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    weeks: BTreeMap<WeekId, WeekSchedule>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn week(&self, week: WeekId) -> Option<&WeekSchedule> {
        self.weeks.get(&week)
    }

    /// Drop a week's slots so it can be re-planned.
    pub fn clear_week(&mut self, week: WeekId) -> Option<WeekSchedule> {
        self.weeks.remove(&week)
    }

    /// Replace a week with a previously saved schedule.
    pub fn restore(&mut self, schedule: WeekSchedule) -> Option<WeekSchedule> {
        self.weeks.insert(schedule.week(), schedule)
    }

    /// Place `items` in caller priority order.
    ///
    /// Each item takes the pool's epsilon-greedy pick if that window is
    /// open, otherwise the first open window in exploit order. When none is
    /// open the item gets `CapacityExceeded` and later items are still tried.
    pub fn schedule<R: Rng + ?Sized>(
        &mut self,
        items: &[ContentItem],
        week: WeekId,
        pool: &WindowPool,
        rng: &mut R,
    ) -> ScheduleReport {
        let mut report = ScheduleReport::default();
        let plan = self
            .weeks
            .entry(week)
            .or_insert_with(|| WeekSchedule::new(week));

        for item in items {
            match place(plan, &item.id, pool, rng) {
                Ok(slot) => {
                    debug!(post_id = %slot.post_id, %week, window = %slot.window, "item scheduled");
                    report.assigned.push(slot);
                }
                Err(err) => {
                    warn!(post_id = %item.id, %week, error = %err, "item not scheduled");
                    report.rejected.push((item.id.clone(), err));
                }
            }
        }

        info!(
            %week,
            assigned = report.assigned.len(),
            rejected = report.rejected.len(),
            "schedule batch complete"
        );
        report
    }

    /// Put `post_id` into `window` directly, bypassing the experiment.
    ///
    /// Without `force`, fails if the window is taken or the item already
    /// holds another window this week. With `force`, the prior occupant is
    /// removed and the item's previous slot (if any) released, in one step.
    pub fn assign(
        &mut self,
        post_id: &ContentId,
        window: TimeWindow,
        week: WeekId,
        force: bool,
    ) -> Result<Assignment, ScheduleError> {
        let plan = self
            .weeks
            .entry(week)
            .or_insert_with(|| WeekSchedule::new(week));

        if plan.occupant(&window) == Some(post_id) {
            return Ok(Assignment {
                window,
                week,
                post_id: post_id.clone(),
                displaced: None,
            });
        }

        let occupant = plan.occupant(&window).cloned();
        let previous = plan.window_of(post_id);

        if !force {
            if let Some(occupant) = occupant {
                return Err(ScheduleError::SlotOccupied {
                    week,
                    window,
                    occupant,
                });
            }
            if let Some(previous) = previous {
                return Err(ScheduleError::AlreadyScheduled {
                    post_id: post_id.clone(),
                    week,
                    window: previous,
                });
            }
        }

        if let Some(previous) = previous {
            plan.remove(&previous);
        }
        let displaced = plan.remove(&window);
        plan.insert(window, post_id.clone());

        if let Some(displaced) = &displaced {
            info!(%week, %window, post_id = %post_id, displaced = %displaced, "slot overridden");
        }

        Ok(Assignment {
            window,
            week,
            post_id: post_id.clone(),
            displaced,
        })
    }
}

fn place<R: Rng + ?Sized>(
    plan: &mut WeekSchedule,
    post_id: &ContentId,
    pool: &WindowPool,
    rng: &mut R,
) -> Result<ScheduleSlot, ScheduleError> {
    if let Some(window) = plan.window_of(post_id) {
        return Err(ScheduleError::AlreadyScheduled {
            post_id: post_id.clone(),
            week: plan.week(),
            window,
        });
    }

    let preferred = pool.select(rng).filter(|w| plan.is_open(w));
    let chosen = preferred.or_else(|| pool.fallback_order().find(|w| plan.is_open(w)));

    match chosen {
        Some(window) => Ok(plan.insert(window, post_id.clone())),
        None => Err(ScheduleError::CapacityExceeded {
            post_id: post_id.clone(),
            week: plan.week(),
            pool_size: pool.len(),
        }),
    }
}
