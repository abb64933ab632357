//! Supplier repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::supplier;

/// Repository for supplier-related database operations.
pub struct SupplierRepository;

/// Field bundle for supplier creation; suppliers carry enough contact
/// columns that positional arguments stop being readable.
#[derive(Debug, Clone, Default)]
pub struct NewSupplier {
    pub name: String,
    pub description: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl SupplierRepository {
    /// Get all suppliers ordered by name.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<supplier::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(supplier::Entity::find().order_by_asc(supplier::Column::Name).all(conn).await?)
    }

    /// Get a single supplier by exact name.
    pub async fn get_by_name<C>(conn: &C, name: &str) -> Result<Option<supplier::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(supplier::Entity::find().filter(supplier::Column::Name.eq(name)).one(conn).await?)
    }

    /// Create a supplier, enforcing name uniqueness.
    pub async fn create<C>(conn: &C, new: NewSupplier) -> Result<supplier::Model>
    where
        C: ConnectionTrait,
    {
        if Self::get_by_name(conn, &new.name).await?.is_some() {
            anyhow::bail!("supplier '{}' already exists", new.name);
        }

        let supplier = supplier::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(new.name),
            description: ActiveValue::Set(new.description),
            contact: ActiveValue::Set(new.contact),
            phone: ActiveValue::Set(new.phone),
            email: ActiveValue::Set(new.email),
            address: ActiveValue::Set(new.address),
        };
        Ok(supplier.insert(conn).await?)
    }

    /// Delete all suppliers.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(supplier::Entity::delete_many().exec(conn).await?.rows_affected)
    }

    /// Count suppliers.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(supplier::Entity::find().count(conn).await?)
    }
}
