//! Backoffice - local data store with backup and restore
//!
//! This library manages the persistent data of a multi-branch retail
//! back office: settings, permission groups, branches, product
//! categories, suppliers, users with branch assignments, sales, and
//! API keys. Its centerpiece is the backup service, which exports the
//! whole store as a portable JSON archive and restores such archives
//! transactionally, remapping cross-entity references that cannot
//! survive the regeneration of primary keys.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`backup`] - Archive format, snapshot export, and transactional restore
//! * [`config`] - Application configuration management
//! * [`storage`] - Local database and schema setup
//! * [`repositories`] - Query layer over the entity models

/// Backup archive format, export, and transactional restore
pub mod backup;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Logging setup
pub mod logger;

/// Repository layer for database operations
pub mod repositories;

/// Local storage layer owning the database connection
pub mod storage;

// Re-export the service types most callers need
pub use backup::{Archive, BackupService, RestoreError, RestoreReport};
pub use storage::LocalStorage;
