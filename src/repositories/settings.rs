//! Settings repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, PaginatorTrait};
use uuid::Uuid;

use crate::constants::{DEFAULT_COST_PERCENT, DEFAULT_DATE_FORMAT, DEFAULT_ITEMS_PER_PAGE, DEFAULT_THEME};
use crate::entities::settings;

/// Repository for the settings singleton.
pub struct SettingsRepository;

/// Field bundle for settings writes.
#[derive(Debug, Clone)]
pub struct SettingsUpdate {
    pub company_name: String,
    pub currency: String,
    pub date_format: String,
    pub items_per_page: i32,
    pub default_cost_percent: f64,
    pub theme: String,
    pub logo_url: String,
}

impl Default for SettingsUpdate {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            currency: String::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            default_cost_percent: DEFAULT_COST_PERCENT,
            theme: DEFAULT_THEME.to_string(),
            logo_url: String::new(),
        }
    }
}

impl SettingsRepository {
    /// Get the active settings row, if one exists.
    pub async fn get<C>(conn: &C) -> Result<Option<settings::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(settings::Entity::find().one(conn).await?)
    }

    /// Write settings, keeping the singleton invariant: update the
    /// existing row if present, insert the first row otherwise.
    pub async fn upsert<C>(conn: &C, update: SettingsUpdate) -> Result<settings::Model>
    where
        C: ConnectionTrait,
    {
        let uuid = match Self::get(conn).await? {
            Some(existing) => existing.uuid,
            None => Uuid::new_v4(),
        };

        let model = settings::ActiveModel {
            uuid: ActiveValue::Set(uuid),
            company_name: ActiveValue::Set(update.company_name),
            currency: ActiveValue::Set(update.currency),
            date_format: ActiveValue::Set(update.date_format),
            items_per_page: ActiveValue::Set(update.items_per_page),
            default_cost_percent: ActiveValue::Set(update.default_cost_percent),
            theme: ActiveValue::Set(update.theme),
            logo_url: ActiveValue::Set(update.logo_url),
        };

        match settings::Entity::find_by_id(uuid).one(conn).await? {
            Some(_) => Ok(model.update(conn).await?),
            None => Ok(model.insert(conn).await?),
        }
    }

    /// Delete all settings rows.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(settings::Entity::delete_many().exec(conn).await?.rows_affected)
    }

    /// Count settings rows (0 or 1 under the singleton invariant).
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(settings::Entity::find().count(conn).await?)
    }
}
