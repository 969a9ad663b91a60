use super::types::WeekStaffing;
use super::{capacity, util, Planner};
use crate::model::SwapKey;
use chrono::{Duration, NaiveDate};

pub(super) fn week(planner: &Planner<'_>, horizon_start: NaiveDate, index: u32) -> WeekStaffing {
    let start = horizon_start + Duration::weeks(i64::from(index));
    let days = (0..5u8)
        .filter_map(|day| SwapKey::new(index, u32::from(day)).ok())
        .map(|key| capacity::day_staffing(planner, key, start))
        .collect();
    WeekStaffing {
        index,
        start,
        cycle_week: planner.resolver().cycle_week(start),
        label: util::week_label(start),
        days,
    }
}

/// Itérateur fini sur les semaines de l'horizon. Chaque semaine est
/// recalculée à partir des registres ; deux itérations donnent le même
/// résultat.
#[derive(Debug, Clone)]
pub struct Horizon<'p, 'a> {
    planner: &'p Planner<'a>,
    start: NaiveDate,
    next: u32,
    end: u32,
}

impl<'p, 'a> Horizon<'p, 'a> {
    pub(super) fn new(planner: &'p Planner<'a>, start: NaiveDate, weeks: u32) -> Self {
        Self {
            planner,
            start,
            next: 0,
            end: weeks,
        }
    }

    /// Lundi de la première semaine.
    pub fn start(&self) -> NaiveDate {
        self.start
    }
}

impl Iterator for Horizon<'_, '_> {
    type Item = WeekStaffing;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let item = week(self.planner, self.start, self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Horizon<'_, '_> {}
