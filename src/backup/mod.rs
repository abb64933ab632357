//! Backup and restore service.
//!
//! [`BackupService`] is the single entry point for snapshot export and
//! archive restore. Restore runs the whole delete-then-insert sequence in
//! one database transaction so a failure at any point leaves the store
//! exactly as it was, and a guard rejects a second restore while one is
//! running. API keys are deliberately outside the archive so automated
//! clients keep working across a restore.

pub mod archive;
pub mod export;
pub mod report;
pub mod restore;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};
use sea_orm::TransactionTrait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::storage::LocalStorage;

pub use archive::{Archive, EntityRef, OneOrMany};
pub use report::{EntityCounts, RestoreReport, RestoreWarning};

/// Errors surfaced to callers of the restore entry point.
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    /// The submitted payload is not a JSON object (or does not
    /// deserialize as an archive). Nothing was touched.
    #[error("invalid backup data format")]
    InvalidFormat,
    /// Another restore is already running against this store.
    #[error("a restore is already in progress")]
    InProgress,
    /// The transaction failed and was rolled back.
    #[error("restore failed: {0}")]
    Transaction(#[from] anyhow::Error),
}

/// Coordinates exports and restores against a [`LocalStorage`].
#[derive(Clone)]
pub struct BackupService {
    storage: Arc<Mutex<LocalStorage>>,
    restore_in_progress: Arc<AtomicBool>,
}

/// Clears the in-progress flag when the restore future completes or is
/// dropped mid-flight.
struct RestoreGuard<'a>(&'a AtomicBool);

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl BackupService {
    pub fn new(storage: Arc<Mutex<LocalStorage>>) -> Self {
        Self {
            storage,
            restore_in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a restore is currently running.
    pub async fn is_restoring(&self) -> bool {
        self.restore_in_progress.load(Ordering::SeqCst)
    }

    /// Export the full store as an archive.
    pub async fn export(&self) -> anyhow::Result<Archive> {
        let storage = self.storage.lock().await;
        let archive = export::export_archive(&storage.conn).await?;
        info!("exported backup archive");
        Ok(archive)
    }

    /// Restore from a parsed archive payload.
    ///
    /// Validation happens before anything destructive, so a malformed
    /// payload returns [`RestoreError::InvalidFormat`] with the store
    /// untouched. The sequence then runs inside a single transaction:
    /// on any failure it is rolled back and the error is reported as
    /// [`RestoreError::Transaction`].
    pub async fn restore(&self, payload: Value) -> Result<RestoreReport, RestoreError> {
        let archive = Archive::from_value(payload)?;

        if self.restore_in_progress.swap(true, Ordering::SeqCst) {
            return Err(RestoreError::InProgress);
        }
        let _guard = RestoreGuard(&self.restore_in_progress);

        self.perform_restore(&archive).await
    }

    async fn perform_restore(&self, archive: &Archive) -> Result<RestoreReport, RestoreError> {
        info!("starting restore from archive dated {:?}", archive.timestamp);

        let storage = self.storage.lock().await;
        let txn = storage.conn.begin().await.map_err(anyhow::Error::from)?;

        match restore::run(&txn, archive).await {
            Ok(report) => {
                txn.commit().await.map_err(anyhow::Error::from)?;
                info!(
                    "restore complete: {} users, {} sales, {} warnings",
                    report.restored.users,
                    report.restored.sales,
                    report.warnings.len()
                );
                Ok(report)
            }
            Err(e) => {
                error!("restore failed, rolling back: {e}");
                if let Err(rollback_err) = txn.rollback().await {
                    error!("rollback failed: {rollback_err}");
                }
                Err(RestoreError::Transaction(e))
            }
        }
    }
}
