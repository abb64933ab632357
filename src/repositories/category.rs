//! Category repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::category;

/// Repository for category-related database operations.
pub struct CategoryRepository;

impl CategoryRepository {
    /// Get all categories ordered by name.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<category::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(category::Entity::find().order_by_asc(category::Column::Name).all(conn).await?)
    }

    /// Get a single category by exact name.
    pub async fn get_by_name<C>(conn: &C, name: &str) -> Result<Option<category::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(category::Entity::find().filter(category::Column::Name.eq(name)).one(conn).await?)
    }

    /// Create a category, enforcing name uniqueness.
    pub async fn create<C>(conn: &C, name: &str, description: &str, color: &str) -> Result<category::Model>
    where
        C: ConnectionTrait,
    {
        if Self::get_by_name(conn, name).await?.is_some() {
            anyhow::bail!("category '{}' already exists", name);
        }

        let category = category::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.to_string()),
            description: ActiveValue::Set(description.to_string()),
            color: ActiveValue::Set(color.to_string()),
        };
        Ok(category.insert(conn).await?)
    }

    /// Delete all categories.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(category::Entity::delete_many().exec(conn).await?.rows_affected)
    }

    /// Count categories.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(category::Entity::find().count(conn).await?)
    }
}
