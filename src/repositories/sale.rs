//! Sale repository for database operations.

use anyhow::Result;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder};
use uuid::Uuid;

use crate::entities::sale::{self, encode_items, SaleItem};

/// Repository for sale-related database operations.
pub struct SaleRepository;

/// Field bundle for sale creation.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub branch_uuid: Uuid,
    pub category_uuid: Uuid,
    pub date: String,
    pub items: Vec<SaleItem>,
    pub total: f64,
    pub cost_total: f64,
    pub profit: f64,
    pub category: String,
    pub notes: String,
}

impl SaleRepository {
    /// Get all sales ordered by date.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<sale::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(sale::Entity::find().order_by_asc(sale::Column::Date).all(conn).await?)
    }

    /// Create a sale. Caller is responsible for the branch and category
    /// references being valid.
    pub async fn create<C>(conn: &C, new: NewSale) -> Result<sale::Model>
    where
        C: ConnectionTrait,
    {
        let sale = sale::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            branch_uuid: ActiveValue::Set(new.branch_uuid),
            category_uuid: ActiveValue::Set(new.category_uuid),
            date: ActiveValue::Set(new.date),
            items: ActiveValue::Set(encode_items(&new.items)),
            total: ActiveValue::Set(new.total),
            cost_total: ActiveValue::Set(new.cost_total),
            profit: ActiveValue::Set(new.profit),
            category: ActiveValue::Set(new.category),
            notes: ActiveValue::Set(new.notes),
        };
        Ok(sale.insert(conn).await?)
    }

    /// Delete all sales.
    pub async fn delete_all<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(sale::Entity::delete_many().exec(conn).await?.rows_affected)
    }

    /// Count sales.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(sale::Entity::find().count(conn).await?)
    }
}
