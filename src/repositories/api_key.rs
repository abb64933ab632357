//! API key repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::api_key;

/// Repository for API key operations. Keys live outside the
/// restore-managed set.
pub struct ApiKeyRepository;

impl ApiKeyRepository {
    /// Get all API keys ordered by name.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<api_key::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(api_key::Entity::find().order_by_asc(api_key::Column::Name).all(conn).await?)
    }

    /// Look up an active key by its public component.
    pub async fn get_by_key<C>(conn: &C, key: &str) -> Result<Option<api_key::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(api_key::Entity::find()
            .filter(api_key::Column::ApiKey.eq(key))
            .filter(api_key::Column::IsActive.eq(true))
            .one(conn)
            .await?)
    }

    /// Create an API key, enforcing key uniqueness.
    pub async fn create<C>(conn: &C, name: &str, description: &str, key: &str, secret: &str) -> Result<api_key::Model>
    where
        C: ConnectionTrait,
    {
        let existing = api_key::Entity::find().filter(api_key::Column::ApiKey.eq(key)).one(conn).await?;
        if existing.is_some() {
            anyhow::bail!("api key '{}' already exists", name);
        }

        let api_key = api_key::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.to_string()),
            description: ActiveValue::Set(description.to_string()),
            api_key: ActiveValue::Set(key.to_string()),
            api_secret: ActiveValue::Set(secret.to_string()),
            is_active: ActiveValue::Set(true),
            last_used: ActiveValue::Set(None),
            usage_count: ActiveValue::Set(0),
            expires_at: ActiveValue::Set(None),
        };
        Ok(api_key.insert(conn).await?)
    }

    /// Count API keys.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(api_key::Entity::find().count(conn).await?)
    }
}
