//! The set of addresses that asked to stop receiving email.
//!
//! A [`SubscriberRegistry`] is built for every request from whatever the storage
//! locations currently hold, mutated in memory, then written back in full. Nothing
//! coordinates two registries alive at the same time: the last one to persist wins.

pub mod import;
pub mod store;

use std::collections::HashSet;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::unsubscribe_reason::UnsubscribeReason;
use crate::domain::unsubscribe_record::{current_timestamp, UnsubscribeRecord};
use import::{detect_email_column, ImportError, ImportSummary, ImportTable, IMPORTED_REASON};
use store::{encode_csv, PersistReport, ReplicatedStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    AlreadyPresent,
}

#[derive(thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to save the unsubscribe list.")]
    PrimaryWrite(#[source] StorageError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("Failed to export the unsubscribe list.")]
    ExportCsv(#[source] csv::Error),
    #[error("Failed to export the unsubscribe list.")]
    ExportJson(#[source] serde_json::Error),
    #[error("The storage worker could not complete the operation.")]
    WorkerUnavailable,
}

impl std::fmt::Debug for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            write!(f, "\nCaused by:\n\t{}", cause)?;
            source = cause.source();
        }
        Ok(())
    }
}

pub struct SubscriberRegistry {
    records: Vec<UnsubscribeRecord>,
    store: ReplicatedStore,
}

impl SubscriberRegistry {
    /// Never fails: unreadable locations are skipped and an empty registry is
    /// returned when none holds records.
    #[tracing::instrument(name = "Load the unsubscribe registry", skip(store))]
    pub fn load(store: ReplicatedStore) -> Self {
        let records = dedup(store.read_first());

        SubscriberRegistry { records, store }
    }

    pub fn records(&self) -> &[UnsubscribeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn store(&self) -> &ReplicatedStore {
        &self.store
    }

    pub fn contains(&self, email: &SubscriberEmail) -> bool {
        self.records.iter().any(|record| &record.email == email)
    }

    #[tracing::instrument(name = "Add an unsubscribed email", skip(self, email, reason), fields(email = %email))]
    pub fn add(
        &mut self,
        email: SubscriberEmail,
        reason: UnsubscribeReason,
    ) -> Result<AddOutcome, RegistryError> {
        if self.contains(&email) {
            tracing::info!("Email is already unsubscribed");
            return Ok(AddOutcome::AlreadyPresent);
        }

        self.records.push(UnsubscribeRecord::captured_now(email, reason));
        self.persist()?;

        Ok(AddOutcome::Created)
    }

    /// Writes the working set to every location. Only a primary failure is an
    /// error; fallback failures are in the report.
    pub fn persist(&self) -> Result<PersistReport, RegistryError> {
        self.store
            .write_all(&self.records)
            .map_err(RegistryError::PrimaryWrite)
    }

    #[tracing::instrument(name = "Remove unsubscribed emails", skip(self, emails))]
    pub fn remove(&mut self, emails: &HashSet<SubscriberEmail>) -> Result<usize, RegistryError> {
        let before = self.records.len();
        self.records.retain(|record| !emails.contains(&record.email));
        let removed = before - self.records.len();

        if removed > 0 {
            self.persist()?;
        }

        Ok(removed)
    }

    /// Empties the registry only when `confirmed` is set. Returns whether it did.
    #[tracing::instrument(name = "Clear the unsubscribe registry", skip(self))]
    pub fn clear(&mut self, confirmed: bool) -> Result<bool, RegistryError> {
        if !confirmed {
            return Ok(false);
        }

        self.records.clear();
        self.persist()?;

        Ok(true)
    }

    /// Merges an uploaded table. Rows whose email cell lacks an "@" and addresses
    /// already present are skipped; the rest share one import timestamp unless the
    /// table carries its own `reason` and `timestamp` columns.
    #[tracing::instrument(name = "Import unsubscribed emails", skip(self, table))]
    pub fn import_bulk(&mut self, table: &ImportTable) -> Result<ImportSummary, RegistryError> {
        let column = detect_email_column(table).ok_or(ImportError::NoEmailColumn)?;
        let reason_column = table.reason_column();
        let timestamp_column = table.timestamp_column();
        let imported_at = current_timestamp();
        let mut summary = ImportSummary {
            column: table.headers()[column].trim().to_string(),
            ..ImportSummary::default()
        };

        for row in table.rows() {
            let email = match SubscriberEmail::normalize(ImportTable::cell(row, column)) {
                Ok(email) => email,
                Err(_) => {
                    summary.skipped_invalid += 1;
                    continue;
                }
            };
            if self.contains(&email) {
                summary.skipped_duplicate += 1;
                continue;
            }

            let reason = optional_cell(row, reason_column)
                .map(UnsubscribeReason::tagged)
                .unwrap_or_else(|| UnsubscribeReason::tagged(IMPORTED_REASON));
            let timestamp = optional_cell(row, timestamp_column)
                .map(String::from)
                .unwrap_or_else(|| imported_at.clone());

            self.records.push(UnsubscribeRecord::new(email, reason, timestamp));
            summary.added += 1;
        }

        if summary.added > 0 {
            self.persist()?;
        }

        tracing::info!(
            "Imported {} emails from column '{}' ({} invalid, {} duplicates)",
            summary.added,
            summary.column,
            summary.skipped_invalid,
            summary.skipped_duplicate
        );

        Ok(summary)
    }

    /// Swaps the whole working set for `records`, keeping the first occurrence of
    /// each address. Returns the resulting size.
    #[tracing::instrument(name = "Replace the unsubscribe registry", skip(self, records))]
    pub fn replace_all(&mut self, records: Vec<UnsubscribeRecord>) -> Result<usize, RegistryError> {
        self.records = dedup(records);
        self.persist()?;

        Ok(self.records.len())
    }

    /// Puts back a working set taken earlier from [`Self::records`]. Nothing is
    /// written.
    pub fn rollback(&mut self, records: Vec<UnsubscribeRecord>) {
        self.records = records;
    }

    pub fn export_csv(&self) -> Result<Vec<u8>, RegistryError> {
        let mut buffer = Vec::new();
        encode_csv(&self.records, &mut buffer).map_err(RegistryError::ExportCsv)?;

        Ok(buffer)
    }

    pub fn export_json(&self) -> Result<Vec<u8>, RegistryError> {
        serde_json::to_vec_pretty(&self.records).map_err(RegistryError::ExportJson)
    }
}

fn optional_cell(row: &[String], column: Option<usize>) -> Option<&str> {
    column
        .map(|column| ImportTable::cell(row, column).trim())
        .filter(|value| !value.is_empty())
}

fn dedup(records: Vec<UnsubscribeRecord>) -> Vec<UnsubscribeRecord> {
    let mut seen = HashSet::new();

    records
        .into_iter()
        .filter(|record| seen.insert(record.email.clone()))
        .collect()
}
