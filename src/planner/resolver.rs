//! Résolution des rôles tournants : cycle de N semaines, rotations par
//! paire, remplacements de congé maternité, rota du week-end.

use super::util;
use crate::model::{Consultant, ConsultantId, RotationOverrides};
use crate::rules::{OnCallRule, PairRotation, RoleRef, RuleTable};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Position 1-based de la semaine de `date` dans un cycle de `cycle_length`
/// semaines ancré sur `anchor`. Les dates antérieures à l'ancre restent dans
/// `1..=cycle_length`.
pub fn week_cycle_number(date: NaiveDate, anchor: NaiveDate, cycle_length: u32) -> u32 {
    if cycle_length == 0 {
        return 1;
    }
    let pos = util::weeks_between(anchor, date).rem_euclid(i64::from(cycle_length));
    pos as u32 + 1
}

/// Résultat brut d'une rotation par paire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPick<'a> {
    /// Forçage manuel, nom saisi tel quel.
    Override(&'a str),
    PrePattern(&'a ConsultantId),
    Pattern(&'a ConsultantId),
    /// Index hors du motif.
    Fallback(&'a ConsultantId),
}

/// Forçage > titulaire avant l'ancre > motif calculé.
pub fn pairwise_rotation<'a>(
    rotation: &'a PairRotation,
    week_start: NaiveDate,
    overrides: Option<&'a BTreeMap<NaiveDate, String>>,
) -> RotationPick<'a> {
    if let Some(name) = overrides.and_then(|weeks| weeks.get(&week_start)) {
        return RotationPick::Override(name);
    }
    if week_start < rotation.anchor {
        return RotationPick::PrePattern(&rotation.pre_pattern_default);
    }
    if rotation.period_weeks == 0 {
        return RotationPick::Fallback(&rotation.fallback);
    }
    let weeks = util::weeks_between(rotation.anchor, week_start);
    let index = weeks.rem_euclid(i64::from(rotation.period_weeks)) as usize;
    match rotation.pattern.get(index) {
        Some(id) => RotationPick::Pattern(id),
        None => RotationPick::Fallback(&rotation.fallback),
    }
}

/// Nom effectif de `name` à `date` : le remplaçant si un congé maternité
/// couvre la date, sinon le nom inchangé.
pub fn current_consultant<'a>(consultants: &'a [Consultant], name: &'a str, date: NaiveDate) -> &'a str {
    let Some(consultant) = consultants.iter().find(|c| c.name == name) else {
        return name;
    };
    match &consultant.maternity_cover {
        Some(cover) if cover.is_active(date) => consultants
            .iter()
            .find(|c| c.id == cover.covered_by)
            .map_or(name, |c| c.name.as_str()),
        _ => name,
    }
}

/// Astreinte du week-end démarrant le vendredi de la semaine `week_start`.
/// Des initiales inconnues sont renvoyées telles quelles.
pub fn weekend_on_call<'a>(
    week_start: NaiveDate,
    weekend_rota: &'a BTreeMap<NaiveDate, String>,
    consultants: &'a [Consultant],
) -> Option<&'a str> {
    let friday = week_start + Duration::days(4);
    let initials = weekend_rota.get(&friday)?;
    let name = consultants
        .iter()
        .find(|c| &c.initials == initials)
        .map_or(initials.as_str(), |c| c.name.as_str());
    Some(name)
}

/// Résolveur lié à une table de règles et à un jeu de forçages.
#[derive(Debug, Clone, Copy)]
pub struct RotationResolver<'a> {
    rules: &'a RuleTable,
    overrides: &'a RotationOverrides,
}

impl<'a> RotationResolver<'a> {
    pub fn new(rules: &'a RuleTable, overrides: &'a RotationOverrides) -> Self {
        Self { rules, overrides }
    }

    pub fn cycle_week(&self, week_start: NaiveDate) -> u32 {
        week_cycle_number(week_start, self.rules.cycle.anchor, self.rules.cycle.length_weeks)
    }

    pub fn current(&self, name: &'a str, date: NaiveDate) -> &'a str {
        current_consultant(&self.rules.consultants, name, date)
    }

    /// Nom d'un consultant de la table à `date`, remplacement compris.
    pub fn consultant_name(&self, id: &ConsultantId, date: NaiveDate) -> &'a str {
        match self.rules.consultant(id) {
            Some(c) => self.current(&c.name, date),
            None => {
                tracing::warn!(consultant = %id, "unknown consultant in rule table");
                &self.rules.fallback_name
            }
        }
    }

    /// Titulaire de la rotation `rotation_id` pour la semaine, avant
    /// substitution.
    pub fn rotation(&self, rotation_id: &str, week_start: NaiveDate) -> &'a str {
        let Some(rotation) = self.rules.rotation(rotation_id) else {
            tracing::warn!(rotation = rotation_id, "unknown rotation in rule table");
            return &self.rules.fallback_name;
        };
        match pairwise_rotation(rotation, week_start, self.overrides.for_rotation(rotation_id)) {
            RotationPick::Override(name) => name,
            RotationPick::PrePattern(id) | RotationPick::Pattern(id) | RotationPick::Fallback(id) => self
                .rules
                .consultant(id)
                .map_or(self.rules.fallback_name.as_str(), |c| c.name.as_str()),
        }
    }

    pub fn weekend_on_call(&self, week_start: NaiveDate) -> Option<&'a str> {
        weekend_on_call(week_start, &self.rules.weekend_rota, &self.rules.consultants)
    }

    /// Résout une référence de la table pour le jour `date` de la semaine
    /// `week_start`. `None` seulement pour une rota du week-end sans entrée.
    pub fn resolve(&self, role: &'a RoleRef, week_start: NaiveDate, date: NaiveDate) -> Option<&'a str> {
        match role {
            RoleRef::Consultant(id) => Some(self.consultant_name(id, date)),
            RoleRef::Rotation(id) => Some(self.current(self.rotation(id, week_start), date)),
            RoleRef::Team(label) => Some(label.as_str()),
            RoleRef::WeekendRota => self
                .weekend_on_call(week_start)
                .map(|name| self.current(name, date)),
        }
    }

    /// Astreinte du jour `day_index` (0 = lundi) d'après la table de dispatch.
    pub fn on_call_for_day(&self, day_index: u8, cycle_week: u32, week_start: NaiveDate) -> Option<&'a str> {
        let schedule = self.rules.weekly.day(day_index)?;
        let date = week_start + Duration::days(i64::from(day_index));
        match &schedule.on_call {
            OnCallRule::ByCycleWeek(table) => match table.get(&cycle_week) {
                Some(role) => self.resolve(role, week_start, date),
                None => {
                    tracing::warn!(day_index, cycle_week, "no on-call entry for cycle week");
                    Some(self.rules.fallback_name.as_str())
                }
            },
            OnCallRule::Fixed(role) => self.resolve(role, week_start, date),
        }
    }
}
