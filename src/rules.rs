use crate::model::{Consultant, ConsultantId};
use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

const BUILTIN_RULES: &str = include_str!("../rules/trauma-2025.json");

/// Table de règles complète du service : roster, cycle, rotations,
/// planning hebdomadaire et rota du week-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTable {
    pub consultants: Vec<Consultant>,
    #[serde(default)]
    pub leave_reasons: Vec<String>,
    pub cycle: CycleRule,
    #[serde(default)]
    pub rotations: Vec<PairRotation>,
    pub weekly: WeeklySchedule,
    /// Date (vendredi, samedi, dimanche) -> initiales.
    #[serde(default)]
    pub weekend_rota: BTreeMap<NaiveDate, String>,
    #[serde(default)]
    pub priority_duties: Vec<PriorityDuty>,
    /// Nom affiché quand une référence ne peut pas être résolue.
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,
}

fn default_fallback_name() -> String {
    "Unresolved".to_string()
}

/// Cycle d'astreinte de N semaines ancré sur un lundi.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleRule {
    pub anchor: NaiveDate,
    pub length_weeks: u32,
}

/// Rotation entre consultants (ex. deux temps partagés) : un motif de
/// semaines démarrant à `anchor`, un titulaire par défaut avant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRotation {
    pub id: String,
    pub anchor: NaiveDate,
    pub pattern: Vec<ConsultantId>,
    pub period_weeks: u32,
    pub pre_pattern_default: ConsultantId,
    pub fallback: ConsultantId,
}

/// Référence à un occupant de rôle dans la table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoleRef {
    Consultant(ConsultantId),
    /// Rôle partagé résolu par une `PairRotation`.
    Rotation(String),
    /// Équipe ou libellé collectif, jamais substitué.
    Team(String),
    /// Astreinte lue dans la rota du week-end (vendredi).
    WeekendRota,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyRule {
    pub who: RoleRef,
    pub duty: String,
    /// Semaines du cycle concernées ; toutes si absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<Vec<u32>>,
}

impl DutyRule {
    pub fn applies_to(&self, cycle_week: u32) -> bool {
        self.weeks
            .as_ref()
            .map_or(true, |weeks| weeks.contains(&cycle_week))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnCallRule {
    /// Semaine du cycle (1-based) -> occupant.
    ByCycleWeek(BTreeMap<u32, RoleRef>),
    Fixed(RoleRef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    #[serde(default)]
    pub flexible: Vec<RoleRef>,
    #[serde(default)]
    pub assigned: Vec<DutyRule>,
    pub on_call: OnCallRule,
}

/// Planning du lundi au vendredi.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySchedule {
    pub monday: DaySchedule,
    pub tuesday: DaySchedule,
    pub wednesday: DaySchedule,
    pub thursday: DaySchedule,
    pub friday: DaySchedule,
}

impl WeeklySchedule {
    pub fn day(&self, day_index: u8) -> Option<&DaySchedule> {
        match day_index {
            0 => Some(&self.monday),
            1 => Some(&self.tuesday),
            2 => Some(&self.wednesday),
            3 => Some(&self.thursday),
            4 => Some(&self.friday),
            _ => None,
        }
    }

    fn days(&self) -> [(&'static str, &DaySchedule); 5] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
        ]
    }
}

/// Poste attribué au premier candidat disponible (ex. bloc 4 du vendredi).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityDuty {
    pub day: u8,
    pub duty: String,
    pub candidates: Vec<ConsultantId>,
}

impl RuleTable {
    /// Table intégrée du service (rotations 2025/2026).
    pub fn builtin() -> Result<Self> {
        let table: RuleTable =
            serde_json::from_str(BUILTIN_RULES).context("parsing built-in rule table")?;
        table.validate()?;
        Ok(table)
    }

    pub fn consultant(&self, id: &ConsultantId) -> Option<&Consultant> {
        self.consultants.iter().find(|c| &c.id == id)
    }

    pub fn consultant_by_name(&self, name: &str) -> Option<&Consultant> {
        self.consultants.iter().find(|c| c.name == name)
    }

    pub fn consultant_by_initials(&self, initials: &str) -> Option<&Consultant> {
        self.consultants.iter().find(|c| c.initials == initials)
    }

    pub fn rotation(&self, id: &str) -> Option<&PairRotation> {
        self.rotations.iter().find(|r| r.id == id)
    }

    /// Noms triés, pour les listes de sélection.
    pub fn consultant_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.consultants.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn is_known_reason(&self, reason: &str) -> bool {
        self.leave_reasons.iter().any(|r| r == reason)
    }

    pub fn validate(&self) -> Result<()> {
        if self.consultants.is_empty() {
            bail!("rule table must contain at least one consultant");
        }
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let mut initials = HashSet::new();
        for c in &self.consultants {
            if c.name.trim().is_empty() {
                bail!("consultant {} has an empty name", c.id);
            }
            if !ids.insert(&c.id) {
                bail!("duplicate consultant id {}", c.id);
            }
            if !names.insert(c.name.as_str()) {
                bail!("duplicate consultant name {}", c.name);
            }
            if !c.initials.is_empty() && !initials.insert(c.initials.as_str()) {
                bail!("duplicate consultant initials {}", c.initials);
            }
        }
        for c in &self.consultants {
            if let Some(cover) = &c.maternity_cover {
                if cover.end_date < cover.start_date {
                    bail!("maternity cover for {} ends before it starts", c.name);
                }
                if !ids.contains(&cover.covered_by) {
                    bail!("maternity cover for {} references unknown consultant {}", c.name, cover.covered_by);
                }
            }
        }

        if self.cycle.length_weeks == 0 {
            bail!("cycle lengthWeeks must be > 0");
        }
        if self.cycle.anchor.weekday() != Weekday::Mon {
            bail!("cycle anchor {} is not a Monday", self.cycle.anchor);
        }

        let mut rotation_ids = HashSet::new();
        for r in &self.rotations {
            if !rotation_ids.insert(r.id.as_str()) {
                bail!("duplicate rotation id {}", r.id);
            }
            if r.period_weeks == 0 {
                bail!("rotation {} periodWeeks must be > 0", r.id);
            }
            if r.pattern.is_empty() {
                bail!("rotation {} has an empty pattern", r.id);
            }
            for id in r.pattern.iter().chain([&r.pre_pattern_default, &r.fallback]) {
                if !ids.contains(id) {
                    bail!("rotation {} references unknown consultant {}", r.id, id);
                }
            }
        }

        let check_ref = |role: &RoleRef, day: &str| -> Result<()> {
            match role {
                RoleRef::Consultant(id) if !ids.contains(id) => {
                    bail!("{day}: unknown consultant {id}")
                }
                RoleRef::Rotation(rid) if !rotation_ids.contains(rid.as_str()) => {
                    bail!("{day}: unknown rotation {rid}")
                }
                _ => Ok(()),
            }
        };

        for (day, schedule) in self.weekly.days() {
            for role in &schedule.flexible {
                check_ref(role, day)?;
            }
            for duty in &schedule.assigned {
                if duty.duty.trim().is_empty() {
                    bail!("{day}: duty name cannot be empty");
                }
                check_ref(&duty.who, day)?;
                if let Some(weeks) = &duty.weeks {
                    validate_cycle_weeks(weeks.iter().copied(), self.cycle.length_weeks, day)?;
                }
            }
            match &schedule.on_call {
                OnCallRule::ByCycleWeek(table) => {
                    validate_cycle_weeks(table.keys().copied(), self.cycle.length_weeks, day)?;
                    for role in table.values() {
                        check_ref(role, day)?;
                    }
                }
                OnCallRule::Fixed(role) => check_ref(role, day)?,
            }
        }

        for duty in &self.priority_duties {
            if duty.day > 4 {
                bail!("priority duty {} must fall on a weekday (0..=4)", duty.duty);
            }
            if duty.candidates.is_empty() {
                bail!("priority duty {} has no candidates", duty.duty);
            }
            for id in &duty.candidates {
                if !ids.contains(id) {
                    bail!("priority duty {} references unknown consultant {}", duty.duty, id);
                }
            }
        }
        Ok(())
    }
}

fn validate_cycle_weeks<I: IntoIterator<Item = u32>>(weeks: I, length: u32, day: &str) -> Result<()> {
    for week in weeks {
        if week == 0 || week > length {
            bail!("{day}: cycle week {week} outside 1..={length}");
        }
    }
    Ok(())
}

pub fn load_rules_from_file<P: AsRef<Path>>(path: P) -> Result<RuleTable> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading rules {}", path.display()))?;
    let table: RuleTable = serde_json::from_slice(&data)
        .with_context(|| format!("parsing rules {}", path.display()))?;
    table.validate()?;
    Ok(table)
}

pub fn export_rules_json<P: AsRef<Path>>(path: P, table: &RuleTable) -> Result<()> {
    let json = serde_json::to_string_pretty(table)?;
    fs::write(path, json)?;
    Ok(())
}
