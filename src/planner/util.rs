use crate::model::LeaveRecord;
use chrono::{Datelike, Duration, NaiveDate};

/// Lundi de la semaine contenant `date` (le dimanche renvoie au lundi précédent).
pub fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Nombre de semaines entières entre `anchor` et `date`, arrondi vers -inf.
pub fn weeks_between(anchor: NaiveDate, date: NaiveDate) -> i64 {
    (date - anchor).num_days().div_euclid(7)
}

pub(super) fn is_on_leave(on_leave: &[LeaveRecord], name: &str) -> bool {
    on_leave.iter().any(|l| l.name == name)
}

/// Arrondi à l'entier, les demis vers +inf.
pub(super) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// « 11 Aug - 15 Aug »
pub(super) fn week_label(start: NaiveDate) -> String {
    let end = start + Duration::days(4);
    format!("{} - {}", start.format("%-d %b"), end.format("%-d %b"))
}
