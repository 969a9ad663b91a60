use super::types::{CapacityBand, DayStaffing, DutyAssignment, StaffingStatus, SwapTarget};
use super::{util, Planner};
use crate::model::{LeaveRecord, Swap, SwapKey};
use crate::rules::PriorityDuty;
use chrono::{Duration, NaiveDate};

/// Libellé du poste prioritaire quand aucun candidat n'est présent.
pub const NO_ONE_AVAILABLE: &str = "No one available";

pub(super) fn day_staffing(
    planner: &Planner<'_>,
    key: SwapKey,
    week_start: NaiveDate,
) -> DayStaffing {
    let rules = planner.rules;
    let opts = planner.opts;
    let resolver = planner.resolver();
    let day_index = key.day();
    let date = week_start + Duration::days(i64::from(day_index));
    let cycle_week = resolver.cycle_week(week_start);

    let on_leave = planner.ledgers.leave_on(date);

    let mut flexible: Vec<String> = Vec::new();
    let mut assigned: Vec<DutyAssignment> = Vec::new();
    if let Some(schedule) = rules.weekly.day(day_index) {
        flexible = schedule
            .flexible
            .iter()
            .filter_map(|role| resolver.resolve(role, week_start, date))
            .map(str::to_owned)
            .collect();
        assigned = schedule
            .assigned
            .iter()
            .filter(|duty| duty.applies_to(cycle_week))
            .filter_map(|duty| {
                let name = resolver.resolve(&duty.who, week_start, date)?;
                Some(DutyAssignment {
                    name: name.to_owned(),
                    duty: duty.duty.clone(),
                    available: !util::is_on_leave(&on_leave, name),
                })
            })
            .collect();
    }

    let mut on_call = resolver
        .on_call_for_day(day_index, cycle_week, week_start)
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    let swap = planner.ledgers.swaps.get(&key).cloned();
    let swap_applied = match &swap {
        Some(swap) => apply_swap(swap, opts.swap_target, &mut on_call, &mut flexible),
        None => false,
    };

    let mut spare: Vec<String> = Vec::new();
    for duty in rules.priority_duties.iter().filter(|d| d.day == day_index) {
        let assignment = priority_assignment(planner, duty, &on_leave, date);
        spare.extend(
            candidate_names(planner, duty, date)
                .filter(|name| *name != assignment.name && !util::is_on_leave(&on_leave, name))
                .map(str::to_owned),
        );
        assigned.push(assignment);
    }

    let mut assigned_staff: Vec<&str> = assigned
        .iter()
        .map(|a| a.name.as_str())
        .filter(|name| !name.contains('/'))
        .collect();
    if let Some(name) = &on_call {
        assigned_staff.push(name);
    }

    let available_flexible: Vec<String> = flexible
        .iter()
        .filter(|name| !assigned_staff.contains(&name.as_str()))
        .filter(|name| !util::is_on_leave(&on_leave, name))
        .cloned()
        .collect();

    let available =
        assigned_staff.len() as i64 + available_flexible.len() as i64 - on_leave.len() as i64;

    // candidats du poste prioritaire non retenus : présents, hors formule brute
    let mut spare_candidates: Vec<String> = Vec::new();
    for name in spare {
        if !assigned_staff.contains(&name.as_str())
            && !available_flexible.contains(&name)
            && !spare_candidates.contains(&name)
        {
            spare_candidates.push(name);
        }
    }

    let critical_on_leave: Vec<String> = assigned
        .iter()
        .filter(|a| util::is_on_leave(&on_leave, &a.name))
        .map(|a| a.name.clone())
        .collect();
    let on_call_on_leave = on_call
        .as_deref()
        .is_some_and(|name| util::is_on_leave(&on_leave, name));
    let priority_unavailable = assigned.iter().any(is_vacant);

    let present = available_flexible.len() as u32
        + spare_candidates.len() as u32
        + assigned.iter().filter(|a| a.available).count() as u32
        + u32::from(on_call.is_some() && !on_call_on_leave);

    let status = classify(
        present,
        opts.required_staff,
        !critical_on_leave.is_empty() || on_call_on_leave || priority_unavailable,
    );
    let capacity_percentage = capacity_percentage(available, opts.base_staff);

    DayStaffing {
        date,
        day_index,
        cycle_week,
        on_call,
        assigned,
        flexible,
        available_flexible,
        spare_candidates,
        on_leave,
        swap,
        swap_applied,
        available,
        present,
        required: opts.required_staff,
        base_staff: opts.base_staff,
        capacity_percentage,
        band: CapacityBand::from_percentage(capacity_percentage),
        status,
        critical_on_leave,
        on_call_on_leave,
    }
}

fn is_vacant(assignment: &DutyAssignment) -> bool {
    !assignment.available && assignment.name == NO_ONE_AVAILABLE
}

fn apply_swap(
    swap: &Swap,
    target: SwapTarget,
    on_call: &mut Option<String>,
    flexible: &mut [String],
) -> bool {
    match target {
        SwapTarget::OnCall => {
            let matches = swap.original_surgeon == Swap::ANY_ORIGINAL
                || on_call.as_deref() == Some(swap.original_surgeon.as_str());
            if matches {
                *on_call = Some(swap.new_surgeon.clone());
            }
            matches
        }
        SwapTarget::FlexiblePool => {
            let mut replaced = false;
            for name in flexible.iter_mut().filter(|n| **n == swap.original_surgeon) {
                name.clone_from(&swap.new_surgeon);
                replaced = true;
            }
            replaced
        }
    }
}

/// Premier candidat (après remplacement maternité) absent de la liste des
/// congés du jour.
fn priority_assignment(
    planner: &Planner<'_>,
    duty: &PriorityDuty,
    on_leave: &[LeaveRecord],
    date: NaiveDate,
) -> DutyAssignment {
    let chosen = candidate_names(planner, duty, date).find(|name| !util::is_on_leave(on_leave, name));
    match chosen {
        Some(name) => DutyAssignment {
            name: name.to_owned(),
            duty: duty.duty.clone(),
            available: true,
        },
        None => DutyAssignment {
            name: NO_ONE_AVAILABLE.to_string(),
            duty: duty.duty.clone(),
            available: false,
        },
    }
}

/// Candidats du poste dans l'ordre de priorité, remplacement maternité compris.
fn candidate_names<'p>(
    planner: &Planner<'p>,
    duty: &'p PriorityDuty,
    date: NaiveDate,
) -> impl Iterator<Item = &'p str> {
    let resolver = planner.resolver();
    duty.candidates
        .iter()
        .map(move |id| resolver.consultant_name(id, date))
}

/// Classification en quatre niveaux autour de l'effectif requis.
pub fn classify(present: u32, required: u32, critical_absence: bool) -> StaffingStatus {
    let present = i64::from(present);
    let required = i64::from(required);
    if critical_absence || present < required - 1 {
        StaffingStatus::Critical
    } else if present < required {
        StaffingStatus::Shortage
    } else if present > required + 1 {
        StaffingStatus::Surplus
    } else {
        StaffingStatus::Adequate
    }
}

/// `round(available / base_staff * 100)`, sans borne inférieure.
pub fn capacity_percentage(available: i64, base_staff: u32) -> i64 {
    if base_staff == 0 {
        return 0;
    }
    util::round_half_up(available as f64 / f64::from(base_staff) * 100.0)
}
