//! Repository layer for database operations.
//!
//! This module provides repository structs that encapsulate database queries
//! and operations, following the Data Mapper pattern recommended by SeaORM.
//! Repositories keep entities as pure data models while providing reusable
//! database access methods. Every method is generic over
//! [`sea_orm::ConnectionTrait`] so the same code runs against the pooled
//! connection or inside a transaction.

pub mod api_key;
pub mod branch;
pub mod category;
pub mod group;
pub mod sale;
pub mod settings;
pub mod supplier;
pub mod user;

pub use api_key::ApiKeyRepository;
pub use branch::BranchRepository;
pub use category::CategoryRepository;
pub use group::GroupRepository;
pub use sale::{NewSale, SaleRepository};
pub use settings::{SettingsRepository, SettingsUpdate};
pub use supplier::{NewSupplier, SupplierRepository};
pub use user::{NewUser, UserRepository};
