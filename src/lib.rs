#![forbid(unsafe_code)]
//! Traumarota : moteur de capacité d'un service de chirurgie traumatologique.
//!
//! - Table de règles déclarative (JSON) : planning hebdomadaire, cycle
//!   d'astreinte, rotations par paire, rota du week-end, congés maternité.
//! - Calcul pur de l'effectif jour par jour sur un horizon de N semaines.
//! - Registres congés / échanges / forçages stockés en blobs JSON.

pub mod io;
pub mod model;
pub mod planner;
pub mod report;
pub mod rules;
pub mod storage;

pub use model::{
    Consultant, ConsultantId, LeaveId, LeaveRecord, Ledgers, MaternityCover, NewLeave,
    RotationOverrides, Swap, SwapKey, SwapLedger,
};
pub use planner::{
    CapacityBand, DayStaffing, DutyAssignment, Planner, PlannerError, PlannerOptions,
    StaffingStatus, SwapTarget, WeekStaffing,
};
pub use report::{DisplayMode, TextWeekRenderer, WeekRenderer};
pub use rules::{load_rules_from_file, RoleRef, RuleTable};
pub use storage::{load_ledgers, JsonStore, LedgerStore, StoreError};
