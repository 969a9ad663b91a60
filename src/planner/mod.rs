mod capacity;
mod horizon;
pub mod resolver;
mod types;
mod util;

pub use capacity::{capacity_percentage, classify, NO_ONE_AVAILABLE};
pub use horizon::Horizon;
pub use resolver::{
    current_consultant, pairwise_rotation, week_cycle_number, weekend_on_call, RotationPick,
    RotationResolver,
};
pub use types::{
    CapacityBand, DayStaffing, DutyAssignment, PlannerError, PlannerOptions, StaffingStatus,
    SwapTarget, WeekStaffing,
};
pub use util::{monday_on_or_before, weeks_between};

use crate::model::{Ledgers, SwapKey};
use crate::rules::RuleTable;
use chrono::{Duration, NaiveDate};

/// Planner : vue pure sur une table de règles et les registres. Ne possède
/// aucun état mutable.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    rules: &'a RuleTable,
    ledgers: &'a Ledgers,
    opts: PlannerOptions,
}

impl<'a> Planner<'a> {
    pub fn new(
        rules: &'a RuleTable,
        ledgers: &'a Ledgers,
        opts: PlannerOptions,
    ) -> Result<Self, PlannerError> {
        opts.validate()?;
        Ok(Self { rules, ledgers, opts })
    }

    pub fn rules(&self) -> &'a RuleTable {
        self.rules
    }
    pub fn ledgers(&self) -> &'a Ledgers {
        self.ledgers
    }
    pub fn options(&self) -> PlannerOptions {
        self.opts
    }

    pub fn resolver(&self) -> RotationResolver<'a> {
        RotationResolver::new(self.rules, &self.ledgers.overrides)
    }

    /// Effectif d'un jour. `week_index` est la position de la semaine dans
    /// l'horizon (clé des échanges), `week_start` son lundi.
    pub fn day(
        &self,
        week_index: u32,
        week_start: NaiveDate,
        day_index: u32,
    ) -> Result<DayStaffing, PlannerError> {
        let key = SwapKey::new(week_index, day_index)?;
        Ok(capacity::day_staffing(self, key, monday_on_or_before(week_start)))
    }

    /// Semaine `index` de l'horizon démarrant la semaine de `today`.
    pub fn week(&self, today: NaiveDate, index: u32) -> Result<WeekStaffing, PlannerError> {
        if index >= self.opts.horizon_weeks {
            return Err(PlannerError::WeekOutOfRange(index));
        }
        Ok(horizon::week(self, monday_on_or_before(today), index))
    }

    pub fn horizon(&self, today: NaiveDate) -> Horizon<'_, 'a> {
        Horizon::new(self, monday_on_or_before(today), self.opts.horizon_weeks)
    }

    pub fn build_horizon(&self, today: NaiveDate) -> Vec<WeekStaffing> {
        let weeks: Vec<WeekStaffing> = self.horizon(today).collect();
        tracing::debug!(
            weeks = weeks.len(),
            start = %monday_on_or_before(today),
            leave = self.ledgers.leave.len(),
            swaps = self.ledgers.swaps.len(),
            "horizon built"
        );
        weeks
    }

    /// Dernier jour couvert par l'horizon (vendredi de la dernière semaine).
    pub fn horizon_end(&self, today: NaiveDate) -> NaiveDate {
        monday_on_or_before(today)
            + Duration::weeks(i64::from(self.opts.horizon_weeks) - 1)
            + Duration::days(4)
    }
}
