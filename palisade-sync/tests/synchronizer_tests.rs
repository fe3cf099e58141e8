//! End-to-end synchronizer scenarios over the in-memory stores: initial
//! convergence, obsolete-row cleanup, idempotence, and plan reporting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use palisade_rbac::{
    Action, ModelRegistry, PermissionDefinition, PermissionGrant, ResourceModel, RoleDefinition,
    StaticRoleDefinitionProvider,
};
use palisade_sync::{
    MemoryPermissionStore, MemoryRolePermissionStore, MemoryRoleStore, PermissionId,
    PermissionStore, RoleId, RolePermissionStore, RoleStore, RoleSynchronizer, StoreResult,
};

struct TestPermission;

impl ResourceModel for TestPermission {
    fn resource(&self) -> String {
        "test".to_string()
    }
}

/// Counts create/delete/attach/detach calls; update calls are expected on
/// every run and deliberately left out.
#[derive(Default)]
struct MutationCounter(AtomicUsize);

impl MutationCounter {
    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

struct CountingPermissionStore {
    inner: Arc<MemoryPermissionStore>,
    mutations: Arc<MutationCounter>,
}

impl PermissionStore for CountingPermissionStore {
    fn find_id_by_name(&self, name: &str) -> StoreResult<Option<PermissionId>> {
        self.inner.find_id_by_name(name)
    }

    fn create(&self, name: &str, label: Option<&str>) -> StoreResult<PermissionId> {
        self.mutations.bump();
        self.inner.create(name, label)
    }

    fn update_label(&self, id: PermissionId, label: Option<&str>) -> StoreResult<()> {
        self.inner.update_label(id, label)
    }

    fn list_ids_by_name(&self) -> StoreResult<BTreeMap<String, PermissionId>> {
        self.inner.list_ids_by_name()
    }

    fn delete_by_ids(&self, ids: &[PermissionId]) -> StoreResult<()> {
        self.mutations.bump();
        self.inner.delete_by_ids(ids)
    }
}

struct CountingRoleStore {
    inner: Arc<MemoryRoleStore>,
    mutations: Arc<MutationCounter>,
}

impl RoleStore for CountingRoleStore {
    fn find_id_by_name(&self, name: &str) -> StoreResult<Option<RoleId>> {
        self.inner.find_id_by_name(name)
    }

    fn create(&self, name: &str, label: Option<&str>, admin_access: bool) -> StoreResult<RoleId> {
        self.mutations.bump();
        self.inner.create(name, label, admin_access)
    }

    fn update(&self, name: &str, label: Option<&str>, admin_access: bool) -> StoreResult<()> {
        self.inner.update(name, label, admin_access)
    }

    fn list_ids_by_name(&self) -> StoreResult<BTreeMap<String, RoleId>> {
        self.inner.list_ids_by_name()
    }

    fn delete_by_ids(&self, ids: &[RoleId]) -> StoreResult<()> {
        self.mutations.bump();
        self.inner.delete_by_ids(ids)
    }
}

struct CountingRolePermissionStore {
    inner: Arc<MemoryRolePermissionStore>,
    mutations: Arc<MutationCounter>,
}

impl RolePermissionStore for CountingRolePermissionStore {
    fn list_permission_ids(&self, role_id: RoleId) -> StoreResult<Vec<PermissionId>> {
        self.inner.list_permission_ids(role_id)
    }

    fn attach(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        self.mutations.bump();
        self.inner.attach(role_id, permission_id)
    }

    fn detach(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        self.mutations.bump();
        self.inner.detach(role_id, permission_id)
    }

    fn detach_by_role_id(&self, role_id: RoleId) -> StoreResult<()> {
        self.mutations.bump();
        self.inner.detach_by_role_id(role_id)
    }

    fn detach_by_permission_id(&self, permission_id: PermissionId) -> StoreResult<()> {
        self.mutations.bump();
        self.inner.detach_by_permission_id(permission_id)
    }
}

struct Harness {
    synchronizer: RoleSynchronizer,
    permissions: Arc<MemoryPermissionStore>,
    roles: Arc<MemoryRoleStore>,
    role_permissions: Arc<MemoryRolePermissionStore>,
    mutations: Arc<MutationCounter>,
}

fn harness(provider: StaticRoleDefinitionProvider) -> Harness {
    let permissions = Arc::new(MemoryPermissionStore::new());
    let roles = Arc::new(MemoryRoleStore::new());
    let role_permissions = Arc::new(MemoryRolePermissionStore::new());
    let mutations = Arc::new(MutationCounter::default());

    let registry = Arc::new(ModelRegistry::new().register(TestPermission));
    let synchronizer = RoleSynchronizer::new(
        Arc::new(provider),
        Arc::new(CountingPermissionStore {
            inner: permissions.clone(),
            mutations: mutations.clone(),
        }),
        Arc::new(CountingRoleStore {
            inner: roles.clone(),
            mutations: mutations.clone(),
        }),
        Arc::new(CountingRolePermissionStore {
            inner: role_permissions.clone(),
            mutations: mutations.clone(),
        }),
        registry,
    );

    Harness {
        synchronizer,
        permissions,
        roles,
        role_permissions,
        mutations,
    }
}

fn provider() -> StaticRoleDefinitionProvider {
    StaticRoleDefinitionProvider::new(vec![
        RoleDefinition::admin("admin").allow_all(),
        RoleDefinition::named("manager")
            .allow(PermissionGrant::new("TestPermission").with_actions([Action::Read])),
    ])
    .with_models(["TestPermission"])
    .with_permissions(vec![PermissionDefinition::labeled("admin.access", "Admin area")])
}

#[test]
fn sync_creates_roles_and_permissions() {
    let harness = harness(provider());
    harness.synchronizer.sync().unwrap();

    assert_eq!(harness.roles.names(), vec!["admin", "manager"]);

    let names = harness.permissions.names();
    assert!(names.contains(&"test.base.read".to_string()));
    assert!(names.contains(&"admin.access".to_string()));
    assert_eq!(
        harness.permissions.label("admin.access"),
        Some(Some("Admin area".to_string()))
    );

    let admin_id = harness.roles.find_id_by_name("admin").unwrap().unwrap();
    let manager_id = harness.roles.find_id_by_name("manager").unwrap().unwrap();

    // Five model permissions plus admin.access.
    assert_eq!(
        harness
            .role_permissions
            .list_permission_ids(admin_id)
            .unwrap()
            .len(),
        6
    );
    assert_eq!(
        harness
            .role_permissions
            .list_permission_ids(manager_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn sync_is_idempotent() {
    let harness = harness(provider());

    harness.synchronizer.sync().unwrap();
    assert!(harness.mutations.count() > 0);

    harness.mutations.reset();
    harness.synchronizer.sync().unwrap();
    assert_eq!(harness.mutations.count(), 0);
}

#[test]
fn sync_removes_obsolete_roles_and_permissions() {
    let harness = harness(
        StaticRoleDefinitionProvider::new(vec![RoleDefinition::named("manager")
            .allow(PermissionGrant::new("TestPermission").with_actions([Action::Read]))])
        .with_models(["TestPermission"])
        .with_permissions(vec![PermissionDefinition::labeled("admin.access", "Admin area")]),
    );

    let legacy_permission = harness
        .permissions
        .create("legacy.permission", None)
        .unwrap();
    let legacy_role = harness.roles.create("legacy", Some("Legacy"), false).unwrap();
    harness
        .role_permissions
        .attach(legacy_role, legacy_permission)
        .unwrap();

    let plan = harness.synchronizer.plan().unwrap();
    assert!(plan.has_changes());
    assert_eq!(plan.roles_to_delete, vec!["legacy"]);
    assert_eq!(plan.permissions_to_delete, vec!["legacy.permission"]);
    assert!(plan.roles_to_create.contains(&"manager".to_string()));
    assert!(plan
        .permissions_to_create
        .contains(&"test.base.read".to_string()));

    harness.synchronizer.sync().unwrap();

    assert!(!harness
        .permissions
        .names()
        .contains(&"legacy.permission".to_string()));
    assert!(!harness.roles.names().contains(&"legacy".to_string()));
    assert!(harness
        .role_permissions
        .list_permission_ids(legacy_role)
        .unwrap()
        .is_empty());
}

#[test]
fn sync_overwrites_role_label_and_flags() {
    let harness = harness(provider());

    harness.roles.create("admin", Some("Old"), false).unwrap();
    harness.synchronizer.sync().unwrap();

    assert_eq!(harness.roles.label("admin"), Some(None));
    assert_eq!(harness.roles.admin_access("admin"), Some(true));
}

#[test]
fn sync_sets_labels_without_clearing_existing_ones() {
    let harness = harness(provider());

    // Pre-existing row with a label the catalog does not supply.
    harness
        .permissions
        .create("test.base.read", Some("Hand-written"))
        .unwrap();
    harness.synchronizer.sync().unwrap();

    assert_eq!(
        harness.permissions.label("test.base.read"),
        Some(Some("Hand-written".to_string()))
    );
    // Labeled catalog entries refresh on every run.
    assert_eq!(
        harness.permissions.label("admin.access"),
        Some(Some("Admin area".to_string()))
    );
}

#[test]
fn sync_creates_rows_for_denied_permissions_without_attaching() {
    let harness = harness(
        StaticRoleDefinitionProvider::new(vec![RoleDefinition::named("auditor")
            .allow("report.base.read")
            .deny("report.base.purge")]),
    );

    harness.synchronizer.sync().unwrap();

    assert!(harness
        .permissions
        .names()
        .contains(&"report.base.purge".to_string()));

    let auditor_id = harness.roles.find_id_by_name("auditor").unwrap().unwrap();
    let attached = harness
        .role_permissions
        .list_permission_ids(auditor_id)
        .unwrap();
    let read_id = harness
        .permissions
        .find_id_by_name("report.base.read")
        .unwrap()
        .unwrap();
    assert_eq!(attached, vec![read_id]);
}

#[test]
fn sync_detaches_permissions_dropped_from_a_role() {
    let permissions = Arc::new(MemoryPermissionStore::new());
    let roles = Arc::new(MemoryRoleStore::new());
    let role_permissions = Arc::new(MemoryRolePermissionStore::new());
    let registry = Arc::new(ModelRegistry::new());

    let wide = RoleSynchronizer::new(
        Arc::new(StaticRoleDefinitionProvider::new(vec![
            RoleDefinition::named("editor")
                .allow("article.base.read")
                .allow("article.base.update"),
        ])),
        permissions.clone(),
        roles.clone(),
        role_permissions.clone(),
        registry.clone(),
    );
    wide.sync().unwrap();

    let editor_id = roles.find_id_by_name("editor").unwrap().unwrap();
    assert_eq!(
        role_permissions.list_permission_ids(editor_id).unwrap().len(),
        2
    );

    // Same store, narrower declaration: the dropped grant is detached and
    // the orphaned permission row deleted.
    let narrow = RoleSynchronizer::new(
        Arc::new(StaticRoleDefinitionProvider::new(vec![
            RoleDefinition::named("editor").allow("article.base.read"),
        ])),
        permissions.clone(),
        roles.clone(),
        role_permissions.clone(),
        registry,
    );
    narrow.sync().unwrap();

    let read_id = permissions
        .find_id_by_name("article.base.read")
        .unwrap()
        .unwrap();
    assert_eq!(
        role_permissions.list_permission_ids(editor_id).unwrap(),
        vec![read_id]
    );
    assert!(!permissions
        .names()
        .contains(&"article.base.update".to_string()));
}

#[test]
fn plan_reports_no_changes_after_sync() {
    let harness = harness(provider());
    harness.synchronizer.sync().unwrap();

    let plan = harness.synchronizer.plan().unwrap();
    assert!(!plan.has_changes());
    assert_eq!(plan, palisade_sync::RoleSyncPlan::default());
}
