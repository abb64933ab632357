//! Archive wire format for backup and restore.
//!
//! The archive is a single JSON object with one field per managed entity
//! type plus a creation timestamp. Exports from this crate always carry
//! stable UUIDs next to every name; the deserializer stays tolerant of
//! older and hand-edited archives where references are `{"name": ...}`
//! objects or bare strings and `settingsData` may be an object or a
//! one-element array.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constants::{DEFAULT_CATEGORY_COLOR, DEFAULT_COST_PERCENT, DEFAULT_DATE_FORMAT, DEFAULT_ITEMS_PER_PAGE, DEFAULT_THEME};
use crate::entities::sale::SaleItem;
use crate::entities::{branch, category, group, sale, settings, supplier, user};

use super::RestoreError;

/// A reference to another archived entity. Exports write the keyed form
/// with both UUID and name; bare strings come from hand-edited archives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Keyed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uuid: Option<Uuid>,
        name: String,
    },
    Name(String),
}

impl EntityRef {
    pub fn keyed(uuid: Uuid, name: impl Into<String>) -> Self {
        EntityRef::Keyed { uuid: Some(uuid), name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            EntityRef::Keyed { name, .. } => name,
            EntityRef::Name(name) => name,
        }
    }

    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            EntityRef::Keyed { uuid, .. } => *uuid,
            EntityRef::Name(_) => None,
        }
    }
}

/// `settingsData` appears as a single object or a one-element array
/// depending on the exporter generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.first(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRecord {
    pub company_name: String,
    pub currency: String,
    pub date_format: String,
    pub items_per_page: i32,
    pub default_cost_percent: f64,
    pub theme: String,
    pub logo_url: String,
}

impl Default for SettingsRecord {
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

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub color: String,
}

impl Default for CategoryRecord {
    fn default() -> Self {
        Self {
            uuid: None,
            name: String::new(),
            description: String::new(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub username: String,
    pub full_name: String,
    pub email: String,
    /// Stored bcrypt hash. Anything implausibly short is replaced with a
    /// fallback hash during restore.
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<EntityRef>,
    pub branches: Vec<EntityRef>,
    pub is_active: bool,
    pub last_login: Option<String>,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self {
            username: String::new(),
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            group_id: None,
            group: None,
            branches: Vec::new(),
            is_active: true,
            last_login: None,
        }
    }
}

impl UserRecord {
    /// The group reference, from whichever field the archive used.
    pub fn group_ref(&self) -> Option<&EntityRef> {
        self.group_id.as_ref().or(self.group.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntityRef>,
    /// Denormalized category name; also accepted as the reference when
    /// `categoryId` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: String,
    pub items: Vec<SaleItem>,
    pub total: f64,
    pub cost_total: f64,
    pub profit: f64,
    pub notes: String,
}

impl SaleRecord {
    pub fn branch_ref(&self) -> Option<&EntityRef> {
        self.branch_id.as_ref().or(self.branch.as_ref())
    }

    pub fn category_ref(&self) -> Option<EntityRef> {
        self.category_id
            .clone()
            .or_else(|| self.category.clone().map(EntityRef::Name))
    }
}

/// The exported snapshot. Every data field is optional on the way in;
/// an absent field means that entity type is not part of the restore.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Archive {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_data: Option<OneOrMany<SettingsRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_data: Option<Vec<GroupRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches_data: Option<Vec<BranchRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories_data: Option<Vec<CategoryRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppliers_data: Option<Vec<SupplierRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_data: Option<Vec<UserRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_data: Option<Vec<SaleRecord>>,
}

impl Archive {
    /// Check the raw value is a usable archive: any non-null JSON object
    /// passes. A missing timestamp is only worth a warning since it is
    /// informational.
    pub fn validate(value: &Value) -> Result<(), RestoreError> {
        if !value.is_object() {
            return Err(RestoreError::InvalidFormat);
        }
        if value.get("timestamp").and_then(Value::as_str).is_none() {
            log::warn!("backup archive is missing a timestamp");
        }
        Ok(())
    }

    /// Validate and deserialize a parsed archive value.
    pub fn from_value(value: Value) -> Result<Self, RestoreError> {
        Self::validate(&value)?;
        serde_json::from_value(value).map_err(|e| {
            log::warn!("backup archive did not deserialize: {e}");
            RestoreError::InvalidFormat
        })
    }
}

impl From<&settings::Model> for SettingsRecord {
    fn from(model: &settings::Model) -> Self {
        Self {
            company_name: model.company_name.clone(),
            currency: model.currency.clone(),
            date_format: model.date_format.clone(),
            items_per_page: model.items_per_page,
            default_cost_percent: model.default_cost_percent,
            theme: model.theme.clone(),
            logo_url: model.logo_url.clone(),
        }
    }
}

impl From<&group::Model> for GroupRecord {
    fn from(model: &group::Model) -> Self {
        Self {
            uuid: Some(model.uuid),
            name: model.name.clone(),
            description: model.description.clone(),
            permissions: model.permissions().iter().map(|p| p.as_str().to_string()).collect(),
            is_default: model.is_default,
        }
    }
}

impl From<&branch::Model> for BranchRecord {
    fn from(model: &branch::Model) -> Self {
        Self {
            uuid: Some(model.uuid),
            name: model.name.clone(),
            address: model.address.clone(),
            phone: model.phone.clone(),
            email: model.email.clone(),
        }
    }
}

impl From<&category::Model> for CategoryRecord {
    fn from(model: &category::Model) -> Self {
        Self {
            uuid: Some(model.uuid),
            name: model.name.clone(),
            description: model.description.clone(),
            color: model.color.clone(),
        }
    }
}

impl From<&supplier::Model> for SupplierRecord {
    fn from(model: &supplier::Model) -> Self {
        Self {
            uuid: Some(model.uuid),
            name: model.name.clone(),
            description: model.description.clone(),
            contact: model.contact.clone(),
            phone: model.phone.clone(),
            email: model.email.clone(),
            address: model.address.clone(),
        }
    }
}

impl user::Model {
    /// Export form of a user, with the group and branch references
    /// expanded to keyed refs by the caller.
    pub(crate) fn to_record(&self, group: Option<EntityRef>, branches: Vec<EntityRef>) -> UserRecord {
        UserRecord {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            group_id: group,
            group: None,
            branches,
            is_active: self.is_active,
            last_login: self.last_login.clone(),
        }
    }
}

impl sale::Model {
    /// Export form of a sale with expanded references.
    pub(crate) fn to_record(&self, branch: Option<EntityRef>, category: Option<EntityRef>) -> SaleRecord {
        let category_name = category.as_ref().map(|c| c.name().to_string()).unwrap_or_else(|| self.category.clone());
        SaleRecord {
            branch_id: branch,
            branch: None,
            category_id: category,
            category: Some(category_name),
            date: self.date.clone(),
            items: self.items(),
            total: self.total,
            cost_total: self.cost_total,
            profit: self.profit,
            notes: self.notes.clone(),
        }
    }
}
