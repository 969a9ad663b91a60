use crate::model::{LeaveRecord, Swap, SwapKeyError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cible d'un échange ponctuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwapTarget {
    /// Remplace l'astreinte du jour quand elle correspond au chirurgien d'origine.
    #[default]
    OnCall,
    /// Remplace le chirurgien d'origine dans le pool flexible du jour.
    FlexiblePool,
}

/// Options de calcul
#[derive(Debug, Clone, Copy)]
pub struct PlannerOptions {
    /// Effectif de référence pour le pourcentage de capacité.
    pub base_staff: u32,
    /// Effectif requis pour la classification en quatre niveaux.
    pub required_staff: u32,
    pub horizon_weeks: u32,
    pub swap_target: SwapTarget,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            base_staff: 20,
            required_staff: 4,
            horizon_weeks: 52,
            swap_target: SwapTarget::OnCall,
        }
    }
}

impl PlannerOptions {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.base_staff == 0 {
            return Err(PlannerError::InvalidOptions("base_staff must be >= 1"));
        }
        if self.horizon_weeks == 0 {
            return Err(PlannerError::InvalidOptions("horizon_weeks must be >= 1"));
        }
        Ok(())
    }
}

/// Classification sur l'effectif requis (vue d'une semaine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StaffingStatus {
    Critical,
    Shortage,
    Adequate,
    Surplus,
}

impl StaffingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffingStatus::Critical => "critical",
            StaffingStatus::Shortage => "shortage",
            StaffingStatus::Adequate => "adequate",
            StaffingStatus::Surplus => "surplus",
        }
    }
}

/// Classification sur le pourcentage de capacité (vue 52 semaines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapacityBand {
    Critical,
    Shortage,
    Adequate,
}

impl CapacityBand {
    pub fn from_percentage(pct: i64) -> Self {
        if pct < 50 {
            CapacityBand::Critical
        } else if pct < 75 {
            CapacityBand::Shortage
        } else {
            CapacityBand::Adequate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityBand::Critical => "critical",
            CapacityBand::Shortage => "shortage",
            CapacityBand::Adequate => "adequate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyAssignment {
    pub name: String,
    pub duty: String,
    pub available: bool,
}

/// Effectif calculé d'un jour. Jamais persisté.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStaffing {
    pub date: NaiveDate,
    pub day_index: u8,
    pub cycle_week: u32,
    pub on_call: Option<String>,
    pub assigned: Vec<DutyAssignment>,
    pub flexible: Vec<String>,
    pub available_flexible: Vec<String>,
    /// Candidats présents du poste prioritaire qui n'ont pas été retenus.
    /// Comptés dans `present`, pas dans `available`.
    pub spare_candidates: Vec<String>,
    pub on_leave: Vec<LeaveRecord>,
    pub swap: Option<Swap>,
    pub swap_applied: bool,
    /// assignés + flexibles disponibles - absents ; peut être négatif.
    pub available: i64,
    /// Personnes effectivement présentes (jamais négatif).
    pub present: u32,
    pub required: u32,
    pub base_staff: u32,
    pub capacity_percentage: i64,
    pub band: CapacityBand,
    pub status: StaffingStatus,
    pub critical_on_leave: Vec<String>,
    pub on_call_on_leave: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekStaffing {
    /// Position dans l'horizon (0 = semaine courante).
    pub index: u32,
    pub start: NaiveDate,
    pub cycle_week: u32,
    pub label: String,
    pub days: Vec<DayStaffing>,
}

impl WeekStaffing {
    pub fn worst_status(&self) -> Option<StaffingStatus> {
        self.days.iter().map(|d| d.status).min_by_key(|s| *s as u8)
    }
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("invalid planner options: {0}")]
    InvalidOptions(&'static str),
    #[error("week {0} is outside the horizon")]
    WeekOutOfRange(u32),
    #[error(transparent)]
    SwapKey(#[from] SwapKeyError),
}
