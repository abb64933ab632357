//! Group repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::group::{self, encode_permissions, Permission};

/// Repository for permission-group database operations.
pub struct GroupRepository;

impl GroupRepository {
    /// Get all groups ordered by name.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<group::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(group::Entity::find().order_by_asc(group::Column::Name).all(conn).await?)
    }

    /// Get a single group by exact name.
    pub async fn get_by_name<C>(conn: &C, name: &str) -> Result<Option<group::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(group::Entity::find().filter(group::Column::Name.eq(name)).one(conn).await?)
    }

    /// Create a group, enforcing name uniqueness.
    pub async fn create<C>(
        conn: &C,
        name: &str,
        description: &str,
        permissions: &[Permission],
        is_default: bool,
    ) -> Result<group::Model>
    where
        C: ConnectionTrait,
    {
        if Self::get_by_name(conn, name).await?.is_some() {
            anyhow::bail!("group '{}' already exists", name);
        }

        let group = group::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.to_string()),
            description: ActiveValue::Set(description.to_string()),
            permissions: ActiveValue::Set(encode_permissions(permissions)),
            is_default: ActiveValue::Set(is_default),
        };
        Ok(group.insert(conn).await?)
    }

    /// Delete all groups.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(group::Entity::delete_many().exec(conn).await?.rows_affected)
    }

    /// Count groups.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(group::Entity::find().count(conn).await?)
    }
}
