use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User permission group. `permissions` is stored as a JSON array of
/// permission strings in a TEXT column; use [`Model::permissions`] to get
/// the typed set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    pub permissions: String,
    pub is_default: bool,
}

/// Closed set of capabilities a group can grant. Permission checks are
/// set membership on this enum rather than free-form string comparison,
/// so an unknown permission fails to parse instead of silently never
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Admin,
    Dashboard,
    Sales,
    Payments,
    Reports,
    Settings,
    Users,
    Branches,
    Categories,
    Suppliers,
    Departments,
}

impl Permission {
    /// Parse a single permission string. Returns `None` for anything
    /// outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Admin => "admin",
            Permission::Dashboard => "dashboard",
            Permission::Sales => "sales",
            Permission::Payments => "payments",
            Permission::Reports => "reports",
            Permission::Settings => "settings",
            Permission::Users => "users",
            Permission::Branches => "branches",
            Permission::Categories => "categories",
            Permission::Suppliers => "suppliers",
            Permission::Departments => "departments",
        }
    }
}

impl Model {
    /// Decode the permissions column. Malformed JSON yields an empty set.
    pub fn permissions(&self) -> Vec<Permission> {
        serde_json::from_str(&self.permissions).unwrap_or_default()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        let permissions = self.permissions();
        permissions.contains(&Permission::Admin) || permissions.contains(&permission)
    }
}

/// Encode a permission set for the TEXT column.
pub fn encode_permissions(permissions: &[Permission]) -> String {
    serde_json::to_string(permissions).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
