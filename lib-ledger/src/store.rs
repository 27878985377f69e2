//! Ledger storage seam.
//!
//! [`LedgerStore`] is the minimal persistence interface the wallet ledger
//! needs: an account registry plus an append-only entry table keyed by a
//! store-assigned monotonic id. Snapshots are *not* persisted here — they are
//! rebuildable from the entry log alone, which is the crash-recovery
//! invariant.
//!
//! [`MemoryLedgerStore`] is the in-process implementation, suitable for
//! tests, development, and single-node deployments where durability is
//! handled by an outer layer.

use crate::entry::{EntryStatus, LedgerEntry, NewEntry};
use crate::errors::{LedgerError, LedgerResult};
use lib_types::{AccountId, EntryId};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage operations required by the wallet ledger
pub trait LedgerStore: Send + Sync {
    /// Register an account. Fails with `AccountExists` if already present.
    fn create_account(&self, account_id: AccountId) -> LedgerResult<()>;

    /// All registered accounts, in id order
    fn account_ids(&self) -> LedgerResult<Vec<AccountId>>;

    fn has_account(&self, account_id: AccountId) -> LedgerResult<bool>;

    /// Append an entry, assigning the next monotonic id
    fn append(&self, entry: NewEntry) -> LedgerResult<LedgerEntry>;

    fn entry(&self, id: EntryId) -> LedgerResult<Option<LedgerEntry>>;

    /// Transition an entry's status. Fails with `InvalidEntry` if its current
    /// status is not `from` (terminal entries are immutable).
    fn update_status(
        &self,
        id: EntryId,
        from: EntryStatus,
        to: EntryStatus,
    ) -> LedgerResult<LedgerEntry>;

    /// All entries for one account, in id order
    fn entries_for_account(&self, account_id: AccountId) -> LedgerResult<Vec<LedgerEntry>>;

    /// Every entry in the log, in id order
    fn all_entries(&self) -> LedgerResult<Vec<LedgerEntry>>;
}

/// In-memory ledger store
///
/// Entry log as a `Vec` (ids are 1-based positions assigned from an atomic
/// counter), account registry as an ordered set. Thread-safe behind
/// `parking_lot` locks; all data is lost on process termination.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    entries: RwLock<Vec<LedgerEntry>>,
    accounts: RwLock<BTreeSet<AccountId>>,
    next_id: AtomicU64,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            accounts: RwLock::new(BTreeSet::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn create_account(&self, account_id: AccountId) -> LedgerResult<()> {
        let mut accounts = self.accounts.write();
        if !accounts.insert(account_id) {
            return Err(LedgerError::AccountExists(account_id));
        }
        Ok(())
    }

    fn account_ids(&self) -> LedgerResult<Vec<AccountId>> {
        Ok(self.accounts.read().iter().copied().collect())
    }

    fn has_account(&self, account_id: AccountId) -> LedgerResult<bool> {
        Ok(self.accounts.read().contains(&account_id))
    }

    fn append(&self, entry: NewEntry) -> LedgerResult<LedgerEntry> {
        let id = EntryId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let entry = LedgerEntry {
            id,
            account_id: entry.account_id,
            kind: entry.kind,
            amount: entry.amount,
            bucket: entry.bucket,
            status: entry.status,
            created_at: entry.created_at,
            related_entry_id: entry.related_entry_id,
            external_ref: entry.external_ref,
        };
        self.entries.write().push(entry.clone());
        Ok(entry)
    }

    fn entry(&self, id: EntryId) -> LedgerResult<Option<LedgerEntry>> {
        let entries = self.entries.read();
        let index = id.as_u64() as usize;
        if index == 0 || index > entries.len() {
            return Ok(None);
        }
        Ok(Some(entries[index - 1].clone()))
    }

    fn update_status(
        &self,
        id: EntryId,
        from: EntryStatus,
        to: EntryStatus,
    ) -> LedgerResult<LedgerEntry> {
        let mut entries = self.entries.write();
        let index = id.as_u64() as usize;
        if index == 0 || index > entries.len() {
            return Err(LedgerError::EntryNotFound(id));
        }
        let entry = &mut entries[index - 1];
        if entry.status != from {
            return Err(LedgerError::InvalidEntry(format!(
                "entry {} is {:?}, expected {:?}",
                id, entry.status, from
            )));
        }
        entry.status = to;
        Ok(entry.clone())
    }

    fn entries_for_account(&self, account_id: AccountId) -> LedgerResult<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }

    fn all_entries(&self) -> LedgerResult<Vec<LedgerEntry>> {
        Ok(self.entries.read().clone())
    }
}
