//! Referential remapper and restore executor.
//!
//! Runs entirely inside one transaction supplied by the service. The
//! store's primary keys are regenerated on insert, so dependent records
//! cannot reuse archived identifiers: each foreign key is re-derived by
//! matching the archived reference against the independents re-read from
//! the transaction, by carried stable UUID first and exact name second.
//! A dependent record whose reference cannot be resolved is skipped with
//! a warning rather than inserted dangling.

use anyhow::Result;
use sea_orm::DatabaseTransaction;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::constants::{DEFAULT_CATEGORY_COLOR, FALLBACK_HASH_COST, FALLBACK_PASSWORD, MIN_PASSWORD_HASH_LENGTH};
use crate::entities::group::Permission;
use crate::repositories::{
    BranchRepository, CategoryRepository, GroupRepository, NewSale, NewSupplier, NewUser, SaleRepository,
    SettingsRepository, SettingsUpdate, SupplierRepository, UserRepository,
};

use super::archive::{Archive, EntityRef};
use super::report::{RestoreReport, RestoreWarning};

/// Resolves archived references to the primary keys generated during
/// this restore pass.
struct RefIndex {
    by_old_uuid: HashMap<Uuid, Uuid>,
    by_name: HashMap<String, Uuid>,
}

impl RefIndex {
    fn new(by_old_uuid: HashMap<Uuid, Uuid>, names: impl Iterator<Item = (String, Uuid)>) -> Self {
        Self {
            by_old_uuid,
            by_name: names.collect(),
        }
    }

    /// Carried stable UUID first, exact (case-sensitive) name second.
    fn resolve(&self, reference: &EntityRef) -> Option<Uuid> {
        if let Some(old) = reference.uuid() {
            if let Some(new) = self.by_old_uuid.get(&old) {
                return Some(*new);
            }
        }
        self.by_name.get(reference.name()).copied()
    }
}

/// Per-batch admission check: records must carry a name, and duplicate
/// names (case-insensitive) after the first are dropped.
struct BatchGuard {
    entity: &'static str,
    seen: HashSet<String>,
}

impl BatchGuard {
    fn new(entity: &'static str) -> Self {
        Self { entity, seen: HashSet::new() }
    }

    fn admit(&mut self, name: &str, report: &mut RestoreReport) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            report.warn(RestoreWarning::MissingName { entity: self.entity.to_string() });
            return false;
        }
        if !self.seen.insert(trimmed.to_lowercase()) {
            report.warn(RestoreWarning::DuplicateName {
                entity: self.entity.to_string(),
                name: trimmed.to_string(),
            });
            return false;
        }
        true
    }
}

/// Execute the delete-then-insert sequence for `archive` inside `txn`.
///
/// Only entity types present in the archive are cleared, plus dependent
/// types a replaced parent would strand. API keys are never touched so
/// external API access survives a restore.
pub(crate) async fn run(txn: &DatabaseTransaction, archive: &Archive) -> Result<RestoreReport> {
    let mut report = RestoreReport::new(archive.timestamp.as_deref());

    let parents_of_users = archive.groups_data.is_some() || archive.branches_data.is_some();
    let parents_of_sales = archive.branches_data.is_some() || archive.categories_data.is_some();
    let restore_users = archive.users_data.is_some();
    let restore_sales = archive.sales_data.is_some();

    // Clear, dependents first.
    if restore_sales || parents_of_sales {
        SaleRepository::delete_all(txn).await?;
        if !restore_sales {
            report.warn(RestoreWarning::DependentCleared { entity: "sales".to_string() });
        }
    }
    if restore_users || parents_of_users {
        UserRepository::delete_all(txn).await?;
        if !restore_users {
            report.warn(RestoreWarning::DependentCleared { entity: "users".to_string() });
        }
    }
    if archive.categories_data.is_some() {
        CategoryRepository::delete_all(txn).await?;
    }
    if archive.suppliers_data.is_some() {
        SupplierRepository::delete_all(txn).await?;
    }
    if archive.branches_data.is_some() {
        BranchRepository::delete_all(txn).await?;
    }
    if archive.groups_data.is_some() {
        GroupRepository::delete_all(txn).await?;
    }
    if archive.settings_data.is_some() {
        SettingsRepository::delete_all(txn).await?;
    }

    // Independent entities. Track archived-uuid -> generated-uuid pairs
    // for the remap indexes.
    if let Some(record) = archive.settings_data.as_ref().and_then(|s| s.first()) {
        SettingsRepository::upsert(
            txn,
            SettingsUpdate {
                company_name: record.company_name.clone(),
                currency: record.currency.clone(),
                date_format: record.date_format.clone(),
                items_per_page: record.items_per_page,
                default_cost_percent: record.default_cost_percent,
                theme: record.theme.clone(),
                logo_url: record.logo_url.clone(),
            },
        )
        .await?;
        report.restored.settings = 1;
    }

    let mut group_uuids = HashMap::new();
    if let Some(records) = &archive.groups_data {
        let mut guard = BatchGuard::new("group");
        for record in records {
            if !guard.admit(&record.name, &mut report) {
                report.skipped.groups += 1;
                continue;
            }
            let permissions = parse_permissions(&record.name, &record.permissions, &mut report);
            let group = GroupRepository::create(txn, record.name.trim(), &record.description, &permissions, record.is_default).await?;
            if let Some(old) = record.uuid {
                group_uuids.insert(old, group.uuid);
            }
            report.restored.groups += 1;
        }
    }

    let mut branch_uuids = HashMap::new();
    if let Some(records) = &archive.branches_data {
        let mut guard = BatchGuard::new("branch");
        for record in records {
            if !guard.admit(&record.name, &mut report) {
                report.skipped.branches += 1;
                continue;
            }
            let branch = BranchRepository::create(txn, record.name.trim(), &record.address, &record.phone, &record.email).await?;
            if let Some(old) = record.uuid {
                branch_uuids.insert(old, branch.uuid);
            }
            report.restored.branches += 1;
        }
    }

    let mut category_uuids = HashMap::new();
    if let Some(records) = &archive.categories_data {
        let mut guard = BatchGuard::new("category");
        for record in records {
            if !guard.admit(&record.name, &mut report) {
                report.skipped.categories += 1;
                continue;
            }
            let color = if record.color.is_empty() { DEFAULT_CATEGORY_COLOR } else { &record.color };
            let category = CategoryRepository::create(txn, record.name.trim(), &record.description, color).await?;
            if let Some(old) = record.uuid {
                category_uuids.insert(old, category.uuid);
            }
            report.restored.categories += 1;
        }
    }

    if let Some(records) = &archive.suppliers_data {
        let mut guard = BatchGuard::new("supplier");
        for record in records {
            if !guard.admit(&record.name, &mut report) {
                report.skipped.suppliers += 1;
                continue;
            }
            SupplierRepository::create(
                txn,
                NewSupplier {
                    name: record.name.trim().to_string(),
                    description: record.description.clone(),
                    contact: record.contact.clone(),
                    phone: record.phone.clone(),
                    email: record.email.clone(),
                    address: record.address.clone(),
                },
            )
            .await?;
            report.restored.suppliers += 1;
        }
    }

    // Re-read the independents from this transaction to pick up the
    // generated identifiers, then resolve dependents against them.
    let groups = GroupRepository::get_all(txn).await?;
    let branches = BranchRepository::get_all(txn).await?;
    let categories = CategoryRepository::get_all(txn).await?;

    let group_index = RefIndex::new(group_uuids, groups.iter().map(|g| (g.name.clone(), g.uuid)));
    let branch_index = RefIndex::new(branch_uuids, branches.iter().map(|b| (b.name.clone(), b.uuid)));
    let category_index = RefIndex::new(category_uuids, categories.iter().map(|c| (c.name.clone(), c.uuid)));
    let category_names: HashMap<_, _> = categories.iter().map(|c| (c.uuid, c.name.as_str())).collect();

    if let Some(records) = &archive.users_data {
        let mut username_guard = BatchGuard::new("user");
        let mut seen_emails = HashSet::new();
        for record in records {
            if !username_guard.admit(&record.username, &mut report) {
                report.skipped.users += 1;
                continue;
            }
            if !seen_emails.insert(record.email.trim().to_lowercase()) {
                report.warn(RestoreWarning::DuplicateName {
                    entity: "user email".to_string(),
                    name: record.email.clone(),
                });
                report.skipped.users += 1;
                continue;
            }

            let group_uuid = record.group_ref().and_then(|r| group_index.resolve(r));
            let Some(group_uuid) = group_uuid else {
                report.warn(RestoreWarning::UnresolvedReference {
                    entity: "user".to_string(),
                    record: record.username.clone(),
                    reference: record.group_ref().map(|r| r.name().to_string()).unwrap_or_default(),
                });
                report.skipped.users += 1;
                continue;
            };

            // Unresolved branch list entries are dropped, not fatal.
            let mut assigned = Vec::with_capacity(record.branches.len());
            for branch_ref in &record.branches {
                match branch_index.resolve(branch_ref) {
                    Some(uuid) => assigned.push(uuid),
                    None => report.warn(RestoreWarning::UnresolvedReference {
                        entity: "user branch".to_string(),
                        record: record.username.clone(),
                        reference: branch_ref.name().to_string(),
                    }),
                }
            }

            let password = if record.password.len() < MIN_PASSWORD_HASH_LENGTH {
                report.warn(RestoreWarning::WeakOrMissingPassword { username: record.username.clone() });
                bcrypt::hash(FALLBACK_PASSWORD, FALLBACK_HASH_COST)?
            } else {
                record.password.clone()
            };

            let user = UserRepository::create(
                txn,
                NewUser {
                    username: record.username.trim().to_string(),
                    full_name: record.full_name.clone(),
                    email: record.email.clone(),
                    password,
                    group_uuid,
                    is_active: record.is_active,
                    last_login: record.last_login.clone(),
                },
            )
            .await?;
            UserRepository::set_branches(txn, &user.uuid, &assigned).await?;
            report.restored.users += 1;
        }
    }

    if let Some(records) = &archive.sales_data {
        for record in records {
            let branch_uuid = record.branch_ref().and_then(|r| branch_index.resolve(r));
            let category_ref = record.category_ref();
            let category_uuid = category_ref.as_ref().and_then(|r| category_index.resolve(r));

            let (Some(branch_uuid), Some(category_uuid)) = (branch_uuid, category_uuid) else {
                let missing = if branch_uuid.is_none() {
                    record.branch_ref().map(|r| r.name().to_string()).unwrap_or_default()
                } else {
                    category_ref.map(|r| r.name().to_string()).unwrap_or_default()
                };
                report.warn(RestoreWarning::UnresolvedReference {
                    entity: "sale".to_string(),
                    record: record.date.clone(),
                    reference: missing,
                });
                report.skipped.sales += 1;
                continue;
            };

            // Keep the denormalized category name in step with the
            // resolved reference.
            let category_name = category_names.get(&category_uuid).map(|n| n.to_string()).unwrap_or_default();

            SaleRepository::create(
                txn,
                NewSale {
                    branch_uuid,
                    category_uuid,
                    date: record.date.clone(),
                    items: record.items.clone(),
                    total: record.total,
                    cost_total: record.cost_total,
                    profit: record.profit,
                    category: category_name,
                    notes: record.notes.clone(),
                },
            )
            .await?;
            report.restored.sales += 1;
        }
    }

    Ok(report)
}

/// Parse archived permission strings into the closed enum, dropping
/// anything unknown with a warning.
fn parse_permissions(group: &str, raw: &[String], report: &mut RestoreReport) -> Vec<Permission> {
    let mut permissions = Vec::with_capacity(raw.len());
    for value in raw {
        match Permission::parse(value) {
            Some(permission) => permissions.push(permission),
            None => report.warn(RestoreWarning::UnknownPermission {
                group: group.to_string(),
                permission: value.clone(),
            }),
        }
    }
    permissions
}
