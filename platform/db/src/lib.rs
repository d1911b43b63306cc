//! In-memory record store. One store lives for the whole process; nothing
//! is persisted across restarts.
//!
//! Reads borrow records directly. Writes go through a handful of narrow
//! mutators so that balance and loan changes can only originate from the
//! ledger operations that call them.

mod seed;

use std::{collections::VecDeque, path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};
use entity::{Employee, EmployeeId, Kudos, Loan, PeerRecognition, Perk, PerkId, RecordId};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use seed::Seed;

/// Number of kudos kept on an employee; older entries are dropped.
pub const KUDOS_HISTORY_LIMIT: usize = 10;

/// Process-wide store handle. Mutations take the write lock for their whole
/// validate-then-apply sequence, which serializes them.
pub type SharedStore = Arc<RwLock<RecordStore>>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to read seed file {path}: {source}")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed fixture: {0}")]
    SeedFormat(#[from] serde_json::Error),
    #[error("duplicate employee id {0} in seed")]
    DuplicateEmployee(EmployeeId),
    #[error("duplicate perk id {0} in seed")]
    DuplicatePerk(PerkId),
    #[error("perk {0} must cost a positive number of points")]
    InvalidPerkCost(PerkId),
    #[error("employee {0} has more than one outstanding loan")]
    MultipleOutstandingLoans(EmployeeId),
    #[error("employee {0} does not exist")]
    UnknownEmployee(EmployeeId),
}

pub type DbResult<T> = Result<T, DbError>;

/// Where the initial records come from.
#[derive(Clone, Debug, Default)]
pub struct StoreSettings {
    seed_file: Option<PathBuf>,
}

impl StoreSettings {
    /// Reads `SEED_FILE`; unset or blank means the built-in demo fixture.
    pub fn from_env() -> Self {
        let seed_file = std::env::var("SEED_FILE")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        Self { seed_file }
    }

    pub fn load_seed(&self) -> DbResult<Seed> {
        match &self.seed_file {
            Some(path) => Seed::from_path(path),
            None => Ok(Seed::demo()),
        }
    }
}

/// Build the shared store described by `settings`.
pub fn open(settings: &StoreSettings) -> DbResult<SharedStore> {
    let seed = settings.load_seed()?;
    let store = RecordStore::from_seed(seed)?;
    info!(
        employees = store.employees.len(),
        perks = store.perks.len(),
        source = settings
            .seed_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "demo".into()),
        "record store ready"
    );
    Ok(store.into_shared())
}

#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    employees: Vec<Employee>,
    perks: Vec<Perk>,
    /// Newest first.
    peer_recognitions: VecDeque<PeerRecognition>,
    next_record_id: RecordId,
}

impl RecordStore {
    pub fn from_seed(seed: Seed) -> DbResult<Self> {
        let Seed {
            mut employees,
            perks,
            peer_recognitions,
        } = seed;

        for (idx, employee) in employees.iter().enumerate() {
            if employees[..idx].iter().any(|other| other.id == employee.id) {
                return Err(DbError::DuplicateEmployee(employee.id));
            }
            if employee.outstanding_loans() > 1 {
                return Err(DbError::MultipleOutstandingLoans(employee.id));
            }
        }
        for (idx, perk) in perks.iter().enumerate() {
            if perks[..idx].iter().any(|other| other.id == perk.id) {
                return Err(DbError::DuplicatePerk(perk.id));
            }
            if perk.cost <= 0 {
                return Err(DbError::InvalidPerkCost(perk.id));
            }
        }
        for employee in employees.iter_mut() {
            if employee.recent_kudos.len() > KUDOS_HISTORY_LIMIT {
                warn!(
                    employee_id = employee.id,
                    kept = KUDOS_HISTORY_LIMIT,
                    "seeded kudos list truncated"
                );
                employee.recent_kudos.truncate(KUDOS_HISTORY_LIMIT);
            }
        }

        let highest_id = employees
            .iter()
            .flat_map(|e| {
                e.recent_kudos
                    .iter()
                    .map(|k| k.id)
                    .chain(e.loan_history.iter().map(|l| l.id))
            })
            .chain(peer_recognitions.iter().map(|r| r.id))
            .max()
            .unwrap_or(0);

        Ok(Self {
            employees,
            perks,
            peer_recognitions: peer_recognitions.into(),
            next_record_id: highest_id.max(0) + 1,
        })
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Current contents in seed form, suitable for writing back out as a fixture.
    pub fn snapshot(&self) -> Seed {
        Seed {
            employees: self.employees.clone(),
            perks: self.perks.clone(),
            peer_recognitions: self.peer_recognitions.iter().cloned().collect(),
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn perks(&self) -> &[Perk] {
        &self.perks
    }

    pub fn perk(&self, id: PerkId) -> Option<&Perk> {
        self.perks.iter().find(|p| p.id == id)
    }

    /// Peer-recognition log, newest first.
    pub fn peer_recognitions(&self) -> impl ExactSizeIterator<Item = &PeerRecognition> + '_ {
        self.peer_recognitions.iter()
    }

    pub fn next_record_id(&mut self) -> RecordId {
        let id = self.next_record_id;
        self.next_record_id += 1;
        id
    }

    pub fn set_balance(&mut self, id: EmployeeId, points_balance: i64) -> DbResult<&Employee> {
        let employee = self.employee_mut(id)?;
        debug!(
            employee_id = id,
            from = employee.points_balance,
            to = points_balance,
            "balance updated"
        );
        employee.points_balance = points_balance;
        Ok(&*employee)
    }

    /// Prepend `kudos` and drop anything past [`KUDOS_HISTORY_LIMIT`].
    pub fn record_kudos(&mut self, id: EmployeeId, kudos: Kudos) -> DbResult<()> {
        let employee = self.employee_mut(id)?;
        employee.recent_kudos.insert(0, kudos);
        employee.recent_kudos.truncate(KUDOS_HISTORY_LIMIT);
        Ok(())
    }

    pub fn record_loan(&mut self, id: EmployeeId, loan: Loan) -> DbResult<()> {
        let employee = self.employee_mut(id)?;
        employee.loan_history.insert(0, loan);
        Ok(())
    }

    /// Mark the employee's outstanding loan repaid. Returns the loan id, or
    /// `None` when no outstanding loan is on file.
    pub fn resolve_outstanding_loan(
        &mut self,
        id: EmployeeId,
        at: DateTime<Utc>,
    ) -> DbResult<Option<RecordId>> {
        let employee = self.employee_mut(id)?;
        let Some(loan) = employee
            .loan_history
            .iter_mut()
            .find(|loan| loan.is_outstanding())
        else {
            warn!(employee_id = id, "debt cleared without an outstanding loan on file");
            return Ok(None);
        };
        loan.mark_repaid(at);
        Ok(Some(loan.id))
    }

    pub fn record_peer_recognition(&mut self, recognition: PeerRecognition) {
        self.peer_recognitions.push_front(recognition);
    }

    fn employee_mut(&mut self, id: EmployeeId) -> DbResult<&mut Employee> {
        self.employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DbError::UnknownEmployee(id))
    }
}
