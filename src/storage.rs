use crate::model::{
    LeaveId, LeaveRecord, Ledgers, NewLeave, RotationOverrides, Swap, SwapKey, SwapLedger,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

const LEAVE_BLOB: &str = "leave.json";
const SWAPS_BLOB: &str = "swaps.json";
const OVERRIDES_BLOB: &str = "overrides.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("overrides changed since they were read (expected revision {expected}, found {found})")]
    Conflict { expected: u64, found: u64 },
}

/// Opérations de stockage des trois registres. Les congés s'ajoutent et se
/// retirent par id, les échanges se remplacent par clé, les forçages se
/// remplacent en bloc.
pub trait LedgerStore {
    fn leave(&self) -> Result<Vec<LeaveRecord>, StoreError>;
    /// Ajoute un congé et renvoie l'enregistrement avec son id généré.
    fn add_leave(&self, entry: NewLeave) -> Result<LeaveRecord, StoreError>;
    /// `false` si aucun congé ne porte cet id.
    fn remove_leave(&self, id: &LeaveId) -> Result<bool, StoreError>;

    fn swaps(&self) -> Result<SwapLedger, StoreError>;
    fn put_swap(&self, key: SwapKey, swap: Swap) -> Result<(), StoreError>;
    /// Plusieurs échanges en une seule écriture (échange croisé entre deux jours).
    fn put_swaps(&self, entries: &[(SwapKey, Swap)]) -> Result<(), StoreError>;
    fn remove_swap(&self, key: SwapKey) -> Result<bool, StoreError>;

    fn overrides(&self) -> Result<RotationOverrides, StoreError>;
    /// Remplace les forçages. Échoue si la révision stockée diffère de
    /// `overrides.revision` ; renvoie la nouvelle révision.
    fn replace_overrides(&self, overrides: &RotationOverrides) -> Result<u64, StoreError>;
}

/// Charge les trois registres. Une erreur de lecture donne un registre vide
/// plutôt qu'un échec.
pub fn load_ledgers(store: &dyn LedgerStore) -> Ledgers {
    let leave = store.leave().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "leave ledger unavailable, using empty ledger");
        Vec::new()
    });
    let swaps = store.swaps().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "swap ledger unavailable, using empty ledger");
        SwapLedger::new()
    });
    let overrides = store.overrides().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "overrides unavailable, using defaults");
        RotationOverrides::default()
    });
    Ledgers {
        leave,
        swaps,
        overrides,
    }
}

/// Un blob JSON par registre dans un répertoire ; écritures atomiques.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_blob<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, StoreError> {
        let path = self.dir.join(name);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&data).map_err(|source| StoreError::Parse { path, source })
    }

    fn write_blob<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.dir.join(name);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|err| io_err(err.error))?;
        tracing::debug!(blob = name, bytes = json.len(), "blob written");
        Ok(())
    }
}

impl LedgerStore for JsonStore {
    fn leave(&self) -> Result<Vec<LeaveRecord>, StoreError> {
        self.read_blob(LEAVE_BLOB)
    }

    fn add_leave(&self, entry: NewLeave) -> Result<LeaveRecord, StoreError> {
        let mut leave = self.leave()?;
        let record = entry.into_record(LeaveId::random());
        leave.push(record.clone());
        self.write_blob(LEAVE_BLOB, &leave)?;
        Ok(record)
    }

    fn remove_leave(&self, id: &LeaveId) -> Result<bool, StoreError> {
        let mut leave = self.leave()?;
        let before = leave.len();
        leave.retain(|l| &l.id != id);
        if leave.len() == before {
            return Ok(false);
        }
        self.write_blob(LEAVE_BLOB, &leave)?;
        Ok(true)
    }

    fn swaps(&self) -> Result<SwapLedger, StoreError> {
        let raw: BTreeMap<String, Swap> = self.read_blob(SWAPS_BLOB)?;
        let mut swaps = SwapLedger::new();
        for (key, swap) in raw {
            match key.parse::<SwapKey>() {
                Ok(key) => {
                    swaps.insert(key, swap);
                }
                Err(err) => tracing::warn!(key = %key, error = %err, "skipping swap entry"),
            }
        }
        Ok(swaps)
    }

    fn put_swap(&self, key: SwapKey, swap: Swap) -> Result<(), StoreError> {
        let mut raw: BTreeMap<String, Swap> = self.read_blob(SWAPS_BLOB)?;
        raw.insert(key.to_string(), swap);
        self.write_blob(SWAPS_BLOB, &raw)
    }

    fn put_swaps(&self, entries: &[(SwapKey, Swap)]) -> Result<(), StoreError> {
        let mut raw: BTreeMap<String, Swap> = self.read_blob(SWAPS_BLOB)?;
        for (key, swap) in entries {
            raw.insert(key.to_string(), swap.clone());
        }
        self.write_blob(SWAPS_BLOB, &raw)
    }

    fn remove_swap(&self, key: SwapKey) -> Result<bool, StoreError> {
        let mut raw: BTreeMap<String, Swap> = self.read_blob(SWAPS_BLOB)?;
        if raw.remove(&key.to_string()).is_none() {
            return Ok(false);
        }
        self.write_blob(SWAPS_BLOB, &raw)?;
        Ok(true)
    }

    fn overrides(&self) -> Result<RotationOverrides, StoreError> {
        self.read_blob(OVERRIDES_BLOB)
    }

    fn replace_overrides(&self, overrides: &RotationOverrides) -> Result<u64, StoreError> {
        let stored = self.overrides()?;
        if stored.revision != overrides.revision {
            return Err(StoreError::Conflict {
                expected: overrides.revision,
                found: stored.revision,
            });
        }
        let mut next = overrides.clone();
        next.revision = stored.revision + 1;
        self.write_blob(OVERRIDES_BLOB, &next)?;
        Ok(next.revision)
    }
}

/// Résumé du contenu du store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub leave: usize,
    pub swaps: usize,
    pub overrides: BTreeMap<String, usize>,
    pub revision: u64,
}

impl StoreSummary {
    pub fn of(ledgers: &Ledgers) -> Self {
        Self {
            leave: ledgers.leave.len(),
            swaps: ledgers.swaps.len(),
            overrides: ledgers
                .overrides
                .rotations
                .iter()
                .map(|(id, weeks)| (id.clone(), weeks.len()))
                .collect(),
            revision: ledgers.overrides.revision,
        }
    }
}
