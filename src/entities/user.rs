use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// System user. Branch assignments live in the `user_branches` join
/// table; `password` holds a bcrypt hash, never plaintext.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub group_uuid: Uuid,
    pub is_active: bool,
    pub last_login: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupUuid",
        to = "super::group::Column::Uuid",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_branch::Relation::Branch.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::user_branch::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
