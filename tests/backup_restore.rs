use std::sync::Arc;

use sea_orm::ConnectionTrait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use backoffice::entities::group::Permission;
use backoffice::repositories::{
    ApiKeyRepository, BranchRepository, CategoryRepository, GroupRepository, NewSale, NewSupplier, SaleRepository,
    SupplierRepository, UserRepository,
};
use backoffice::{BackupService, LocalStorage, RestoreError};
use backoffice::backup::RestoreWarning;

// Looks enough like a bcrypt hash to pass the length sanity check.
const STORED_HASH: &str = "$2b$10$abcdefghijklmnopqrstuv";

async fn setup() -> (BackupService, Arc<Mutex<LocalStorage>>) {
    let storage = Arc::new(Mutex::new(LocalStorage::new(true).await.unwrap()));
    (BackupService::new(storage.clone()), storage)
}

fn sample_archive() -> Value {
    json!({
        "timestamp": "2024-05-01T10:00:00Z",
        "settingsData": [{ "companyName": "Acme Pharmacy", "currency": "USD" }],
        "groupsData": [
            {"name": "Admins", "description": "Full access", "permissions": ["admin"], "isDefault": false},
            {"name": "Staff", "permissions": ["dashboard", "sales"], "isDefault": true}
        ],
        "branchesData": [
            {"name": "Main", "address": "1 High St"},
            {"name": "Depot"}
        ],
        "categoriesData": [
            {"name": "OTC", "color": "green"},
            {"name": "Prescription"}
        ],
        "suppliersData": [{"name": "MedSupply", "contact": "Jo"}],
        "usersData": [
            {
                "username": "alice",
                "fullName": "Alice",
                "email": "alice@example.com",
                "password": STORED_HASH,
                "groupId": {"name": "Admins"},
                "branches": [{"name": "Main"}, {"name": "Depot"}],
                "isActive": true
            },
            {
                "username": "bob",
                "email": "bob@example.com",
                "password": STORED_HASH,
                "group": "Staff",
                "branches": ["Main"]
            }
        ],
        "salesData": [
            {
                "branchId": {"name": "Main"},
                "category": "OTC",
                "date": "2024-04-30",
                "items": [{"sku": "A1", "name": "Aspirin", "quantity": 2.0, "unitPrice": 3.5, "cost": 1.2}],
                "total": 7.0,
                "costTotal": 2.4,
                "profit": 4.6
            }
        ]
    })
}

#[tokio::test]
async fn test_full_archive_restore() {
    let (service, storage) = setup().await;

    let report = service.restore(sample_archive()).await.unwrap();

    assert!(report.success);
    assert_eq!(report.timestamp, "2024-05-01T10:00:00Z");
    assert_eq!(report.restored.settings, 1);
    assert_eq!(report.restored.groups, 2);
    assert_eq!(report.restored.branches, 2);
    assert_eq!(report.restored.categories, 2);
    assert_eq!(report.restored.suppliers, 1);
    assert_eq!(report.restored.users, 2);
    assert_eq!(report.restored.sales, 1);
    assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);

    let storage = storage.lock().await;

    // References were remapped onto the freshly generated keys
    let admins = GroupRepository::get_by_name(&storage.conn, "Admins").await.unwrap().unwrap();
    let alice = UserRepository::get_by_username(&storage.conn, "alice").await.unwrap().unwrap();
    assert_eq!(alice.group_uuid, admins.uuid);
    assert_eq!(UserRepository::get_branches(&storage.conn, &alice.uuid).await.unwrap().len(), 2);

    // Bare-string references resolve too
    let bob = UserRepository::get_by_username(&storage.conn, "bob").await.unwrap().unwrap();
    let bob_branches = UserRepository::get_branches(&storage.conn, &bob.uuid).await.unwrap();
    assert_eq!(bob_branches.len(), 1);
    assert_eq!(bob_branches[0].name, "Main");
    assert!(bob.is_active);

    let main = BranchRepository::get_by_name(&storage.conn, "Main").await.unwrap().unwrap();
    let otc = CategoryRepository::get_by_name(&storage.conn, "OTC").await.unwrap().unwrap();
    let sales = SaleRepository::get_all(&storage.conn).await.unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].branch_uuid, main.uuid);
    assert_eq!(sales[0].category_uuid, otc.uuid);
    assert_eq!(sales[0].category, "OTC");
    assert_eq!(sales[0].items()[0].unit_price, 3.5);

    let staff = GroupRepository::get_by_name(&storage.conn, "Staff").await.unwrap().unwrap();
    assert!(staff.has_permission(Permission::Sales));
    assert!(!staff.has_permission(Permission::Settings));
}

#[tokio::test]
async fn test_unresolved_references_skip_records() {
    let (service, storage) = setup().await;

    let payload = json!({
        "timestamp": "2024-05-01T10:00:00Z",
        "groupsData": [{"name": "Staff", "permissions": []}],
        "branchesData": [{"name": "Main"}],
        "categoriesData": [{"name": "OTC"}],
        "usersData": [
            {"username": "ghost", "email": "g@example.com", "password": STORED_HASH, "groupId": {"name": "Nobody"}},
            {"username": "alice", "email": "a@example.com", "password": STORED_HASH, "groupId": {"name": "Staff"}}
        ],
        "salesData": [
            {"branchId": {"name": "Nowhere"}, "category": "OTC", "date": "2024-04-30", "total": 1.0},
            {"branchId": {"name": "Main"}, "category": "OTC", "date": "2024-04-30", "total": 2.0}
        ]
    });

    let report = service.restore(payload).await.unwrap();

    // The batch survives, only the dangling records are dropped
    assert_eq!(report.restored.users, 1);
    assert_eq!(report.skipped.users, 1);
    assert_eq!(report.restored.sales, 1);
    assert_eq!(report.skipped.sales, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RestoreWarning::UnresolvedReference { entity, record, .. } if entity == "user" && record == "ghost")));
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RestoreWarning::UnresolvedReference { entity, reference, .. } if entity == "sale" && reference == "Nowhere")));

    let storage = storage.lock().await;
    assert_eq!(UserRepository::count(&storage.conn).await.unwrap(), 1);
    assert_eq!(SaleRepository::count(&storage.conn).await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_and_missing_names() {
    let (service, storage) = setup().await;

    let payload = json!({
        "timestamp": "2024-05-01T10:00:00Z",
        "branchesData": [
            {"name": "Main", "address": "1 High St"},
            {"name": "main ", "address": "ignored"},
            {"name": "   "}
        ]
    });

    let report = service.restore(payload).await.unwrap();

    assert_eq!(report.restored.branches, 1);
    assert_eq!(report.skipped.branches, 2);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RestoreWarning::DuplicateName { entity, name } if entity == "branch" && name == "main")));
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RestoreWarning::MissingName { entity } if entity == "branch")));

    let storage = storage.lock().await;
    let main = BranchRepository::get_by_name(&storage.conn, "Main").await.unwrap().unwrap();
    // First occurrence won
    assert_eq!(main.address, "1 High St");
}

#[tokio::test]
async fn test_weak_password_gets_fallback_hash() {
    let (service, storage) = setup().await;

    let payload = json!({
        "timestamp": "2024-05-01T10:00:00Z",
        "groupsData": [{"name": "Staff", "permissions": []}],
        "usersData": [
            {"username": "carol", "email": "c@example.com", "password": "hunter2", "groupId": {"name": "Staff"}}
        ]
    });

    let report = service.restore(payload).await.unwrap();

    assert_eq!(report.restored.users, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RestoreWarning::WeakOrMissingPassword { username } if username == "carol")));

    let storage = storage.lock().await;
    let carol = UserRepository::get_by_username(&storage.conn, "carol").await.unwrap().unwrap();
    assert_ne!(carol.password, "hunter2");
    assert!(bcrypt::verify("password123", &carol.password).unwrap());
}

#[tokio::test]
async fn test_unknown_permissions_dropped() {
    let (service, storage) = setup().await;

    let payload = json!({
        "timestamp": "2024-05-01T10:00:00Z",
        "groupsData": [{"name": "Staff", "permissions": ["sales", "teleportation"]}]
    });

    let report = service.restore(payload).await.unwrap();

    assert_eq!(report.restored.groups, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RestoreWarning::UnknownPermission { group, permission } if group == "Staff" && permission == "teleportation")));

    let storage = storage.lock().await;
    let staff = GroupRepository::get_by_name(&storage.conn, "Staff").await.unwrap().unwrap();
    assert_eq!(staff.permissions(), vec![Permission::Sales]);
}

#[tokio::test]
async fn test_invalid_payload_is_rejected_untouched() {
    let (service, storage) = setup().await;

    {
        let storage = storage.lock().await;
        BranchRepository::create(&storage.conn, "Main", "", "", "").await.unwrap();
    }

    for payload in [Value::Null, json!([1, 2, 3]), json!("backup")] {
        let err = service.restore(payload).await.unwrap_err();
        assert!(matches!(err, RestoreError::InvalidFormat));
    }

    let storage = storage.lock().await;
    assert_eq!(BranchRepository::count(&storage.conn).await.unwrap(), 1);
}

#[tokio::test]
async fn test_api_keys_survive_restore() {
    let (service, storage) = setup().await;

    {
        let storage = storage.lock().await;
        ApiKeyRepository::create(&storage.conn, "pos-terminal", "", "key-1", "secret-1").await.unwrap();
    }

    service.restore(sample_archive()).await.unwrap();

    let storage = storage.lock().await;
    assert_eq!(ApiKeyRepository::count(&storage.conn).await.unwrap(), 1);
    assert!(ApiKeyRepository::get_by_key(&storage.conn, "key-1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_partial_archive_leaves_absent_types_and_clears_dependents() {
    let (service, storage) = setup().await;

    {
        let storage = storage.lock().await;
        SupplierRepository::create(
            &storage.conn,
            NewSupplier {
                name: "MedSupply".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let branch = BranchRepository::create(&storage.conn, "Old Branch", "", "", "").await.unwrap();
        let category = CategoryRepository::create(&storage.conn, "OTC", "", "green").await.unwrap();
        SaleRepository::create(
            &storage.conn,
            NewSale {
                branch_uuid: branch.uuid,
                category_uuid: category.uuid,
                date: "2024-04-30".to_string(),
                items: Vec::new(),
                total: 5.0,
                cost_total: 2.0,
                profit: 3.0,
                category: "OTC".to_string(),
                notes: String::new(),
            },
        )
        .await
        .unwrap();
    }

    // Branches are replaced; sales are not in the archive but depend on
    // branches, so they are cleared rather than left dangling.
    let payload = json!({
        "timestamp": "2024-05-01T10:00:00Z",
        "branchesData": [{"name": "New Branch"}]
    });

    let report = service.restore(payload).await.unwrap();

    assert_eq!(report.restored.branches, 1);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RestoreWarning::DependentCleared { entity } if entity == "sales")));

    let storage = storage.lock().await;
    assert_eq!(SupplierRepository::count(&storage.conn).await.unwrap(), 1, "absent types stay untouched");
    assert_eq!(CategoryRepository::count(&storage.conn).await.unwrap(), 1);
    assert_eq!(SaleRepository::count(&storage.conn).await.unwrap(), 0);
    assert!(BranchRepository::get_by_name(&storage.conn, "Old Branch").await.unwrap().is_none());
    assert!(BranchRepository::get_by_name(&storage.conn, "New Branch").await.unwrap().is_some());
}

#[tokio::test]
async fn test_export_then_restore_roundtrip() {
    let (source, _source_storage) = setup().await;
    source.restore(sample_archive()).await.unwrap();

    let archive = source.export().await.unwrap();
    assert!(archive.timestamp.is_some());

    let (target, target_storage) = setup().await;
    let payload = serde_json::to_value(&archive).unwrap();
    let report = target.restore(payload).await.unwrap();

    assert_eq!(report.restored.groups, 2);
    assert_eq!(report.restored.users, 2);
    assert_eq!(report.restored.sales, 1);
    assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);

    {
        let storage = target_storage.lock().await;
        let admins = GroupRepository::get_by_name(&storage.conn, "Admins").await.unwrap().unwrap();
        let alice = UserRepository::get_by_username(&storage.conn, "alice").await.unwrap().unwrap();
        assert_eq!(alice.group_uuid, admins.uuid);
        // Stored hashes are carried through untouched
        assert_eq!(alice.password, STORED_HASH);
    }

    // Re-exporting yields the same data keyed by name, even though
    // every primary key was regenerated
    let names = |archive: &backoffice::Archive| {
        let groups: Vec<_> = archive.groups_data.as_ref().unwrap().iter().map(|g| g.name.clone()).collect();
        let branches: Vec<_> = archive.branches_data.as_ref().unwrap().iter().map(|b| b.name.clone()).collect();
        let users: Vec<_> = archive.users_data.as_ref().unwrap().iter().map(|u| u.username.clone()).collect();
        (groups, branches, users)
    };
    let sales = |archive: &backoffice::Archive| {
        archive
            .sales_data
            .as_ref()
            .unwrap()
            .iter()
            .map(|s| {
                (
                    s.branch_ref().unwrap().name().to_string(),
                    s.category_ref().unwrap().name().to_string(),
                    s.total,
                    s.cost_total,
                    s.profit,
                )
            })
            .collect::<Vec<_>>()
    };
    let re_export = target.export().await.unwrap();
    assert_eq!(names(&archive), names(&re_export));
    assert_eq!(sales(&archive), sales(&re_export));
}

#[tokio::test]
async fn test_legacy_settings_object_form() {
    let (service, storage) = setup().await;

    let payload = json!({
        "timestamp": "2024-05-01T10:00:00Z",
        "settingsData": {"companyName": "Corner Pharmacy", "currency": "EUR"}
    });

    let report = service.restore(payload).await.unwrap();
    assert_eq!(report.restored.settings, 1);

    let storage = storage.lock().await;
    let settings = backoffice::repositories::SettingsRepository::get(&storage.conn).await.unwrap().unwrap();
    assert_eq!(settings.company_name, "Corner Pharmacy");
    assert_eq!(settings.currency, "EUR");
}

#[tokio::test]
async fn test_missing_timestamp_reported_unknown() {
    let (service, _storage) = setup().await;

    let payload = json!({"branchesData": [{"name": "Main"}]});
    let report = service.restore(payload).await.unwrap();
    assert_eq!(report.timestamp, "Unknown");
}

#[tokio::test]
async fn test_restore_rolls_back_on_failure() {
    let (service, storage) = setup().await;

    {
        let storage = storage.lock().await;
        BranchRepository::create(&storage.conn, "Main", "", "", "").await.unwrap();
        // Sabotage the last table the restore touches so the failure
        // hits mid-transaction, after branches were already replaced.
        storage.conn.execute_unprepared("DROP TABLE settings").await.unwrap();
    }

    let err = service.restore(sample_archive()).await.unwrap_err();
    assert!(matches!(err, RestoreError::Transaction(_)));

    let storage = storage.lock().await;
    // The store is exactly as it was before the attempt
    assert_eq!(BranchRepository::count(&storage.conn).await.unwrap(), 1);
    assert!(BranchRepository::get_by_name(&storage.conn, "Main").await.unwrap().is_some());
    assert_eq!(UserRepository::count(&storage.conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_restore_rejected() {
    let (service, storage) = setup().await;

    // Holding the storage lock parks the first restore after it has
    // claimed the in-progress flag but before it can begin its
    // transaction.
    let blocker = storage.lock().await;

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.restore(sample_archive()).await })
    };
    while !service.is_restoring().await {
        tokio::task::yield_now().await;
    }

    let err = service.restore(sample_archive()).await.unwrap_err();
    assert!(matches!(err, RestoreError::InProgress));

    drop(blocker);
    first.await.unwrap().unwrap();
    assert!(!service.is_restoring().await);
}

#[tokio::test]
async fn test_cancelled_restore_releases_guard() {
    let (service, storage) = setup().await;

    let blocker = storage.lock().await;

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.restore(sample_archive()).await })
    };
    while !service.is_restoring().await {
        tokio::task::yield_now().await;
    }

    // Dropping the parked restore future must release the flag, or the
    // service would refuse every restore from here on
    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());
    assert!(!service.is_restoring().await);

    drop(blocker);
    service.restore(sample_archive()).await.unwrap();
}

#[tokio::test]
async fn test_restore_guard_resets() {
    let (service, _storage) = setup().await;

    assert!(!service.is_restoring().await);
    service.restore(sample_archive()).await.unwrap();
    assert!(!service.is_restoring().await);

    // A failed restore also releases the guard
    let _ = service.restore(Value::Null).await;
    assert!(!service.is_restoring().await);
}
