//! Local storage module for the back-office database.
//!
//! Provides the SeaORM connection and schema setup for:
//! - Settings (singleton)
//! - Groups, Branches, Categories, Suppliers
//! - Users and their branch assignments
//! - Sales
//! - API keys (outside the restore-managed set)

pub mod db;

pub use db::LocalStorage;
