use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_branches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_uuid: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub branch_uuid: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserUuid",
        to = "super::user::Column::Uuid",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchUuid",
        to = "super::branch::Column::Uuid",
        on_delete = "Cascade"
    )]
    Branch,
}

impl ActiveModelBehavior for ActiveModel {}
