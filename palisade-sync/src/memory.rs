//! # In-Memory Stores
//!
//! Store implementations backed by process memory. They exist for tests
//! and as reference implementations of the store contracts; a real
//! deployment backs these traits with its SQL layer.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::store::{
    PermissionId, PermissionStore, RoleId, RolePermissionStore, RoleStore, StoreResult, UserId,
    UserRoleStore,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct PermissionRow {
    id: PermissionId,
    name: String,
    label: Option<String>,
}

/// In-memory permission rows.
#[derive(Default)]
pub struct MemoryPermissionStore {
    inner: Mutex<PermissionTable>,
}

#[derive(Default)]
struct PermissionTable {
    next_id: i64,
    rows: Vec<PermissionRow>,
}

impl MemoryPermissionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Permission names in creation order. Test helper.
    pub fn names(&self) -> Vec<String> {
        lock(&self.inner)
            .rows
            .iter()
            .map(|row| row.name.clone())
            .collect()
    }

    /// A permission's label, if the permission exists. Test helper.
    pub fn label(&self, name: &str) -> Option<Option<String>> {
        lock(&self.inner)
            .rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.label.clone())
    }
}

impl PermissionStore for MemoryPermissionStore {
    fn find_id_by_name(&self, name: &str) -> StoreResult<Option<PermissionId>> {
        Ok(lock(&self.inner)
            .rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.id))
    }

    fn create(&self, name: &str, label: Option<&str>) -> StoreResult<PermissionId> {
        let mut table = lock(&self.inner);
        table.next_id += 1;
        let id = PermissionId(table.next_id);
        table.rows.push(PermissionRow {
            id,
            name: name.to_string(),
            label: label.map(str::to_string),
        });
        Ok(id)
    }

    fn update_label(&self, id: PermissionId, label: Option<&str>) -> StoreResult<()> {
        let mut table = lock(&self.inner);
        if let Some(row) = table.rows.iter_mut().find(|row| row.id == id) {
            row.label = label.map(str::to_string);
        }
        Ok(())
    }

    fn list_ids_by_name(&self) -> StoreResult<BTreeMap<String, PermissionId>> {
        Ok(lock(&self.inner)
            .rows
            .iter()
            .map(|row| (row.name.clone(), row.id))
            .collect())
    }

    fn delete_by_ids(&self, ids: &[PermissionId]) -> StoreResult<()> {
        let mut table = lock(&self.inner);
        table.rows.retain(|row| !ids.contains(&row.id));
        Ok(())
    }
}

#[derive(Debug)]
struct RoleRow {
    id: RoleId,
    name: String,
    label: Option<String>,
    admin_access: bool,
}

/// In-memory role rows.
#[derive(Default)]
pub struct MemoryRoleStore {
    inner: Mutex<RoleTable>,
}

#[derive(Default)]
struct RoleTable {
    next_id: i64,
    rows: Vec<RoleRow>,
}

impl MemoryRoleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Role names in creation order. Test helper.
    pub fn names(&self) -> Vec<String> {
        lock(&self.inner)
            .rows
            .iter()
            .map(|row| row.name.clone())
            .collect()
    }

    /// A role's name by id.
    pub fn name_of(&self, id: RoleId) -> Option<String> {
        lock(&self.inner)
            .rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.name.clone())
    }

    /// A role's admin-access flag, if the role exists. Test helper.
    pub fn admin_access(&self, name: &str) -> Option<bool> {
        lock(&self.inner)
            .rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.admin_access)
    }

    /// A role's label, if the role exists. Test helper.
    pub fn label(&self, name: &str) -> Option<Option<String>> {
        lock(&self.inner)
            .rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.label.clone())
    }
}

impl RoleStore for MemoryRoleStore {
    fn find_id_by_name(&self, name: &str) -> StoreResult<Option<RoleId>> {
        Ok(lock(&self.inner)
            .rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.id))
    }

    fn create(&self, name: &str, label: Option<&str>, admin_access: bool) -> StoreResult<RoleId> {
        let mut table = lock(&self.inner);
        table.next_id += 1;
        let id = RoleId(table.next_id);
        table.rows.push(RoleRow {
            id,
            name: name.to_string(),
            label: label.map(str::to_string),
            admin_access,
        });
        Ok(id)
    }

    fn update(&self, name: &str, label: Option<&str>, admin_access: bool) -> StoreResult<()> {
        let mut table = lock(&self.inner);
        if let Some(row) = table.rows.iter_mut().find(|row| row.name == name) {
            row.label = label.map(str::to_string);
            row.admin_access = admin_access;
        }
        Ok(())
    }

    fn list_ids_by_name(&self) -> StoreResult<BTreeMap<String, RoleId>> {
        Ok(lock(&self.inner)
            .rows
            .iter()
            .map(|row| (row.name.clone(), row.id))
            .collect())
    }

    fn delete_by_ids(&self, ids: &[RoleId]) -> StoreResult<()> {
        let mut table = lock(&self.inner);
        table.rows.retain(|row| !ids.contains(&row.id));
        Ok(())
    }
}

/// In-memory role-to-permission links.
#[derive(Default)]
pub struct MemoryRolePermissionStore {
    inner: Mutex<BTreeMap<RoleId, Vec<PermissionId>>>,
}

impl MemoryRolePermissionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RolePermissionStore for MemoryRolePermissionStore {
    fn list_permission_ids(&self, role_id: RoleId) -> StoreResult<Vec<PermissionId>> {
        Ok(lock(&self.inner).get(&role_id).cloned().unwrap_or_default())
    }

    fn attach(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        let mut links = lock(&self.inner);
        let attached = links.entry(role_id).or_default();
        if !attached.contains(&permission_id) {
            attached.push(permission_id);
        }
        Ok(())
    }

    fn detach(&self, role_id: RoleId, permission_id: PermissionId) -> StoreResult<()> {
        let mut links = lock(&self.inner);
        if let Some(attached) = links.get_mut(&role_id) {
            attached.retain(|id| *id != permission_id);
        }
        Ok(())
    }

    fn detach_by_role_id(&self, role_id: RoleId) -> StoreResult<()> {
        lock(&self.inner).remove(&role_id);
        Ok(())
    }

    fn detach_by_permission_id(&self, permission_id: PermissionId) -> StoreResult<()> {
        let mut links = lock(&self.inner);
        for attached in links.values_mut() {
            attached.retain(|id| *id != permission_id);
        }
        Ok(())
    }
}

/// In-memory user-to-role assignments.
///
/// Shares the role table with a [`MemoryRoleStore`] to answer name
/// lookups, the way the SQL implementation joins the roles table.
pub struct MemoryUserRoleStore {
    roles: Arc<MemoryRoleStore>,
    inner: Mutex<BTreeMap<UserId, Vec<RoleId>>>,
}

impl MemoryUserRoleStore {
    /// Create an empty store over the given role table.
    pub fn new(roles: Arc<MemoryRoleStore>) -> Self {
        Self {
            roles,
            inner: Mutex::new(BTreeMap::new()),
        }
    }
}

impl UserRoleStore for MemoryUserRoleStore {
    fn list_role_ids_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<RoleId>> {
        Ok(lock(&self.inner).get(&user_id).cloned().unwrap_or_default())
    }

    fn list_role_names_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<String>> {
        let role_ids = self.list_role_ids_by_user_id(user_id)?;
        Ok(role_ids
            .into_iter()
            .filter_map(|role_id| self.roles.name_of(role_id))
            .collect())
    }

    fn attach(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let mut assignments = lock(&self.inner);
        let assigned = assignments.entry(user_id).or_default();
        if !assigned.contains(&role_id) {
            assigned.push(role_id);
        }
        Ok(())
    }

    fn detach(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let mut assignments = lock(&self.inner);
        if let Some(assigned) = assignments.get_mut(&user_id) {
            assigned.retain(|id| *id != role_id);
        }
        Ok(())
    }

    fn detach_all(&self, user_id: UserId) -> StoreResult<()> {
        lock(&self.inner).remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_store_create_and_find() {
        let store = MemoryPermissionStore::new();
        let id = store.create("article.base.read", Some("Read articles")).unwrap();

        assert_eq!(store.find_id_by_name("article.base.read").unwrap(), Some(id));
        assert_eq!(store.find_id_by_name("missing").unwrap(), None);
        assert_eq!(
            store.label("article.base.read"),
            Some(Some("Read articles".to_string()))
        );
    }

    #[test]
    fn test_permission_store_update_label() {
        let store = MemoryPermissionStore::new();
        let id = store.create("article.base.read", None).unwrap();
        store.update_label(id, Some("Read")).unwrap();
        assert_eq!(store.label("article.base.read"), Some(Some("Read".to_string())));
    }

    #[test]
    fn test_permission_store_delete_by_ids() {
        let store = MemoryPermissionStore::new();
        let first = store.create("a.base.read", None).unwrap();
        let _second = store.create("b.base.read", None).unwrap();

        store.delete_by_ids(&[first, first]).unwrap();
        assert_eq!(store.names(), vec!["b.base.read"]);
    }

    #[test]
    fn test_role_store_update_overwrites() {
        let store = MemoryRoleStore::new();
        store.create("admin", Some("Old"), false).unwrap();
        store.update("admin", Some("Administrator"), true).unwrap();

        assert_eq!(store.label("admin"), Some(Some("Administrator".to_string())));
        assert_eq!(store.admin_access("admin"), Some(true));
    }

    #[test]
    fn test_role_permission_store_attach_is_idempotent() {
        let store = MemoryRolePermissionStore::new();
        let role = RoleId(1);
        let permission = PermissionId(1);

        store.attach(role, permission).unwrap();
        store.attach(role, permission).unwrap();
        assert_eq!(store.list_permission_ids(role).unwrap(), vec![permission]);
    }

    #[test]
    fn test_role_permission_store_detach_by_permission() {
        let store = MemoryRolePermissionStore::new();
        store.attach(RoleId(1), PermissionId(9)).unwrap();
        store.attach(RoleId(2), PermissionId(9)).unwrap();
        store.attach(RoleId(2), PermissionId(3)).unwrap();

        store.detach_by_permission_id(PermissionId(9)).unwrap();
        assert!(store.list_permission_ids(RoleId(1)).unwrap().is_empty());
        assert_eq!(
            store.list_permission_ids(RoleId(2)).unwrap(),
            vec![PermissionId(3)]
        );
    }

    #[test]
    fn test_user_role_store_names_follow_role_table() {
        let roles = Arc::new(MemoryRoleStore::new());
        let admin = roles.create("admin", None, true).unwrap();
        let viewer = roles.create("viewer", None, false).unwrap();

        let store = MemoryUserRoleStore::new(roles);
        store.attach(UserId(7), admin).unwrap();
        store.attach(UserId(7), viewer).unwrap();

        assert_eq!(
            store.list_role_names_by_user_id(UserId(7)).unwrap(),
            vec!["admin", "viewer"]
        );

        store.detach(UserId(7), admin).unwrap();
        assert_eq!(
            store.list_role_names_by_user_id(UserId(7)).unwrap(),
            vec!["viewer"]
        );
    }
}
