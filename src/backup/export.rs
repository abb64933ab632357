//! Snapshot exporter.
//!
//! Reads every managed collection and builds the archive with references
//! expanded to `{uuid, name}` pairs, since names (and the carried UUIDs)
//! are all the remapper has to work with on the other side. The reads
//! are independent queries, not a shared snapshot: writes racing an
//! export can leave the archive slightly inconsistent across types,
//! which is an accepted limitation of the export path.

use anyhow::Result;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

use crate::repositories::{
    BranchRepository, CategoryRepository, GroupRepository, SaleRepository, SettingsRepository, SupplierRepository,
    UserRepository,
};

use super::archive::{Archive, EntityRef, OneOrMany};

pub(crate) async fn export_archive(conn: &DatabaseConnection) -> Result<Archive> {
    let settings = SettingsRepository::get(conn).await?;
    let groups = GroupRepository::get_all(conn).await?;
    let branches = BranchRepository::get_all(conn).await?;
    let categories = CategoryRepository::get_all(conn).await?;
    let suppliers = SupplierRepository::get_all(conn).await?;
    let users = UserRepository::get_all(conn).await?;
    let sales = SaleRepository::get_all(conn).await?;

    let group_names: HashMap<_, _> = groups.iter().map(|g| (g.uuid, g.name.as_str())).collect();
    let branch_names: HashMap<_, _> = branches.iter().map(|b| (b.uuid, b.name.as_str())).collect();
    let category_names: HashMap<_, _> = categories.iter().map(|c| (c.uuid, c.name.as_str())).collect();

    let mut user_records = Vec::with_capacity(users.len());
    for user in &users {
        let group_ref = group_names.get(&user.group_uuid).map(|name| EntityRef::keyed(user.group_uuid, *name));
        let branch_refs = UserRepository::get_branches(conn, &user.uuid)
            .await?
            .into_iter()
            .map(|b| EntityRef::keyed(b.uuid, b.name))
            .collect();
        user_records.push(user.to_record(group_ref, branch_refs));
    }

    let sale_records = sales
        .iter()
        .map(|sale| {
            let branch_ref = branch_names.get(&sale.branch_uuid).map(|name| EntityRef::keyed(sale.branch_uuid, *name));
            let category_ref = category_names
                .get(&sale.category_uuid)
                .map(|name| EntityRef::keyed(sale.category_uuid, *name));
            sale.to_record(branch_ref, category_ref)
        })
        .collect();

    Ok(Archive {
        timestamp: Some(Utc::now().to_rfc3339()),
        settings_data: settings.map(|s| OneOrMany::One((&s).into())),
        groups_data: Some(groups.iter().map(Into::into).collect()),
        branches_data: Some(branches.iter().map(Into::into).collect()),
        categories_data: Some(categories.iter().map(Into::into).collect()),
        suppliers_data: Some(suppliers.iter().map(Into::into).collect()),
        users_data: Some(user_records),
        sales_data: Some(sale_records),
    })
}
