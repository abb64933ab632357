use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sales transaction. `items` is a JSON array of [`SaleItem`] in a TEXT
/// column; `category` keeps a denormalized copy of the category name for
/// reporting.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub branch_uuid: Uuid,
    pub category_uuid: Uuid,
    pub date: String,
    pub items: String,
    pub total: f64,
    pub cost_total: f64,
    pub profit: f64,
    pub category: String,
    pub notes: String,
}

/// One line of a sale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleItem {
    pub sku: String,
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub cost: f64,
}

impl Model {
    /// Decode the items column. Malformed JSON yields an empty list.
    pub fn items(&self) -> Vec<SaleItem> {
        serde_json::from_str(&self.items).unwrap_or_default()
    }
}

/// Encode sale items for the TEXT column.
pub fn encode_items(items: &[SaleItem]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchUuid",
        to = "super::branch::Column::Uuid",
        on_delete = "Cascade"
    )]
    Branch,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryUuid",
        to = "super::category::Column::Uuid",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
