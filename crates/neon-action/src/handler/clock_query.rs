//! Time and date queries.

use std::sync::Arc;

use crate::clock::{format_date, format_time, Clock};
use crate::error::ActionError;
use crate::handler::{mismatch, ActionHandler, HandlerContext};
use crate::types::{ActionResult, CommandMatch, Tier};

/// Speaks the current local time.
pub struct TimeHandler {
    clock: Arc<dyn Clock>,
}

impl TimeHandler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl ActionHandler for TimeHandler {
    fn tier(&self) -> Tier {
        Tier::TimeQuery
    }

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError> {
        if !matches!(matched, CommandMatch::TimeQuery) {
            return Err(mismatch(Tier::TimeQuery, matched));
        }
        let time = format_time(&self.clock.now());
        let status = format!("Time: {}", time);
        let spoken = format!("The time is {}", time);
        ctx.announce(&status, true, &spoken);
        Ok(ActionResult::ok(Tier::TimeQuery, status, spoken))
    }

    fn describe(&self, _matched: &CommandMatch) -> String {
        "Tell the current time".to_string()
    }
}

/// Speaks today's date.
pub struct DateHandler {
    clock: Arc<dyn Clock>,
}

impl DateHandler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl ActionHandler for DateHandler {
    fn tier(&self) -> Tier {
        Tier::DateQuery
    }

    fn execute(
        &self,
        matched: &CommandMatch,
        ctx: &HandlerContext,
    ) -> Result<ActionResult, ActionError> {
        if !matches!(matched, CommandMatch::DateQuery) {
            return Err(mismatch(Tier::DateQuery, matched));
        }
        let date = format_date(&self.clock.now());
        let status = format!("Date: {}", date);
        let spoken = format!("Today is {}", date);
        ctx.announce(&status, true, &spoken);
        Ok(ActionResult::ok(Tier::DateQuery, status, spoken))
    }

    fn describe(&self, _matched: &CommandMatch) -> String {
        "Tell today's date".to_string()
    }
}
