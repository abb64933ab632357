//! Branch repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::branch;

/// Repository for branch-related database operations.
pub struct BranchRepository;

impl BranchRepository {
    /// Get all branches ordered by name.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<branch::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(branch::Entity::find().order_by_asc(branch::Column::Name).all(conn).await?)
    }

    /// Get a single branch by UUID.
    pub async fn get_by_id<C>(conn: &C, uuid: &Uuid) -> Result<Option<branch::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(branch::Entity::find().filter(branch::Column::Uuid.eq(*uuid)).one(conn).await?)
    }

    /// Get a single branch by exact name.
    pub async fn get_by_name<C>(conn: &C, name: &str) -> Result<Option<branch::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(branch::Entity::find().filter(branch::Column::Name.eq(name)).one(conn).await?)
    }

    /// Create a branch, enforcing name uniqueness.
    pub async fn create<C>(conn: &C, name: &str, address: &str, phone: &str, email: &str) -> Result<branch::Model>
    where
        C: ConnectionTrait,
    {
        if Self::get_by_name(conn, name).await?.is_some() {
            anyhow::bail!("branch '{}' already exists", name);
        }

        let branch = branch::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.to_string()),
            address: ActiveValue::Set(address.to_string()),
            phone: ActiveValue::Set(phone.to_string()),
            email: ActiveValue::Set(email.to_string()),
        };
        Ok(branch.insert(conn).await?)
    }

    /// Delete all branches.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(branch::Entity::delete_many().exec(conn).await?.rows_affected)
    }

    /// Count branches.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(branch::Entity::find().count(conn).await?)
    }
}
