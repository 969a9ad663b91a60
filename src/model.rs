use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Identifiant fort pour Consultant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsultantId(String);

impl ConsultantId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsultantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Consultant du service. Le nom sert à l'affichage et aux correspondances
/// avec les congés/échanges ; l'identité est `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultant {
    pub id: ConsultantId,
    pub name: String,
    pub initials: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maternity_cover: Option<MaternityCover>,
}

impl Consultant {
    pub fn new<I: AsRef<str>, N: Into<String>, T: Into<String>>(id: I, name: N, initials: T) -> Self {
        Self {
            id: ConsultantId::new(id),
            name: name.into(),
            initials: initials.into(),
            maternity_cover: None,
        }
    }

    pub fn with_maternity_cover(mut self, cover: MaternityCover) -> Self {
        self.maternity_cover = Some(cover);
        self
    }
}

/// Remplacement pendant un congé maternité, bornes incluses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaternityCover {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub covered_by: ConsultantId,
}

impl MaternityCover {
    pub fn is_active(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Identifiant d'un congé. Les anciens blobs contiennent des ids numériques.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawLeaveId")]
pub struct LeaveId(String);

impl LeaveId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLeaveId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawLeaveId> for LeaveId {
    fn from(raw: RawLeaveId) -> Self {
        match raw {
            RawLeaveId::Text(s) => Self(s),
            RawLeaveId::Number(n) => Self(n.to_string()),
        }
    }
}

/// Congé enregistré (dates incluses). `name` est du texte libre, non vérifié
/// contre le roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRecord {
    pub id: LeaveId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

impl LeaveRecord {
    /// Vrai si `date` est dans `[start_date, end_date]`. Un intervalle inversé
    /// ne couvre aucun jour.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Congé avant attribution d'un identifiant par le store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeave {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

impl NewLeave {
    pub fn new<N: Into<String>, R: Into<String>>(
        name: N,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: R,
    ) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            reason: reason.into(),
        }
    }

    pub fn into_record(self, id: LeaveId) -> LeaveRecord {
        LeaveRecord {
            id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapKeyError {
    #[error("malformed swap key: {0}")]
    Malformed(String),
    #[error("day index {0} is not a weekday (0=Mon..4=Fri)")]
    NotWeekday(u32),
    #[error("date {0} is before the horizon start")]
    BeforeHorizon(NaiveDate),
}

/// Clé d'échange `"{week}-{day}"`. `week` est relatif à la première semaine
/// affichée de l'horizon ; `day` va de 0 (lundi) à 4 (vendredi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwapKey {
    week: u32,
    day: u8,
}

impl SwapKey {
    pub fn new(week: u32, day: u32) -> Result<Self, SwapKeyError> {
        if day > 4 {
            return Err(SwapKeyError::NotWeekday(day));
        }
        Ok(Self { week, day: day as u8 })
    }

    /// Position d'une date calendaire dans l'horizon commençant le lundi
    /// `horizon_start`.
    pub fn for_date(horizon_start: NaiveDate, date: NaiveDate) -> Result<Self, SwapKeyError> {
        let days = (date - horizon_start).num_days();
        if days < 0 {
            return Err(SwapKeyError::BeforeHorizon(date));
        }
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Err(SwapKeyError::NotWeekday(date.weekday().num_days_from_monday()));
        }
        Self::new((days / 7) as u32, date.weekday().num_days_from_monday())
    }

    pub fn week(&self) -> u32 {
        self.week
    }
    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for SwapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.week, self.day)
    }
}

impl FromStr for SwapKey {
    type Err = SwapKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SwapKeyError::Malformed(s.to_string());
        let (week, day) = s.split_once('-').ok_or_else(malformed)?;
        let week: u32 = week.trim().parse().map_err(|_| malformed())?;
        let day: u32 = day.trim().parse().map_err(|_| malformed())?;
        Self::new(week, day)
    }
}

impl Serialize for SwapKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SwapKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Remplacement ponctuel d'un chirurgien par un autre sur un jour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swap {
    pub original_surgeon: String,
    pub new_surgeon: String,
}

impl Swap {
    /// Valeur joker écrite par l'ancien planificateur (« remplace l'astreinte »).
    pub const ANY_ORIGINAL: &'static str = "Original";

    pub fn new<O: Into<String>, N: Into<String>>(original: O, new: N) -> Self {
        Self {
            original_surgeon: original.into(),
            new_surgeon: new.into(),
        }
    }

    /// Échange croisé : le premier jour reçoit `second`, le second `first`.
    pub fn exchange<F: Into<String>, S: Into<String>>(first: F, second: S) -> [Swap; 2] {
        [
            Swap::new(Self::ANY_ORIGINAL, second),
            Swap::new(Self::ANY_ORIGINAL, first),
        ]
    }
}

pub type SwapLedger = BTreeMap<SwapKey, Swap>;

/// Forçages par rotation : id de rotation -> (lundi ISO -> nom).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationOverrides {
    /// Compteur de version pour la concurrence optimiste côté store.
    #[serde(default, rename = "_revision")]
    pub revision: u64,
    #[serde(flatten)]
    pub rotations: BTreeMap<String, BTreeMap<NaiveDate, String>>,
}

impl RotationOverrides {
    pub fn for_rotation(&self, rotation: &str) -> Option<&BTreeMap<NaiveDate, String>> {
        self.rotations.get(rotation)
    }

    pub fn get(&self, rotation: &str, week_start: NaiveDate) -> Option<&str> {
        self.for_rotation(rotation)
            .and_then(|weeks| weeks.get(&week_start))
            .map(String::as_str)
    }

    pub fn set<R: Into<String>, N: Into<String>>(&mut self, rotation: R, week_start: NaiveDate, name: N) {
        self.rotations
            .entry(rotation.into())
            .or_default()
            .insert(week_start, name.into());
    }

    pub fn clear(&mut self, rotation: &str, week_start: NaiveDate) -> bool {
        self.rotations
            .get_mut(rotation)
            .map(|weeks| weeks.remove(&week_start).is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.rotations.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Les trois registres mutables, tels que vus par le moteur.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledgers {
    pub leave: Vec<LeaveRecord>,
    pub swaps: SwapLedger,
    pub overrides: RotationOverrides,
}

impl Ledgers {
    pub fn leave_on(&self, date: NaiveDate) -> Vec<LeaveRecord> {
        self.leave.iter().filter(|l| l.covers(date)).cloned().collect()
    }
}
