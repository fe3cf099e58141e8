//! # Permission Checkers
//!
//! The outward authorization surface: `can(user, permission, subject)`.
//! The definition-backed checker answers from a compiled
//! [`RolePermissionMap`]; the gate composes that RBAC decision with the
//! policy registry. Checkers never error — a blank permission, an unknown
//! role, or a missing grant all simply answer `false`.

use std::any::Any;

use crate::catalog::PermissionCatalog;
use crate::error::RbacResult;
use crate::map::RolePermissionMap;
use crate::policy::PermissionPolicyRegistry;
use crate::provider::RoleDefinitionProvider;
use crate::resolver::PermissionResolver;

/// Default permission name whose check short-circuits on the admin flag.
pub const ADMIN_PERMISSION: &str = "admin.access";

/// Resolves the role names held by a user identity.
///
/// Implemented for closures, so request-handling code can plug in whatever
/// identity type it has:
///
/// ```
/// use palisade_rbac::RoleResolver;
///
/// struct User {
///     roles: Vec<String>,
/// }
///
/// let resolver = |user: &User| user.roles.clone();
/// let user = User { roles: vec!["editor".to_string()] };
/// assert_eq!(resolver.resolve(&user), vec!["editor"]);
/// ```
pub trait RoleResolver<U>: Send + Sync {
    /// Role names assigned to this user, possibly empty.
    fn resolve(&self, user: &U) -> Vec<String>;
}

impl<U, F> RoleResolver<U> for F
where
    F: Fn(&U) -> Vec<String> + Send + Sync,
{
    fn resolve(&self, user: &U) -> Vec<String> {
        self(user)
    }
}

/// Answers whether a user may exercise a permission.
pub trait PermissionChecker<U>: Send + Sync {
    /// The authorization decision. Never errors; absence means denial.
    fn can(&self, user: &U, permission: &str, subject: Option<&dyn Any>) -> bool;
}

/// A checker that denies everything. Safe default wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPermissionChecker;

impl<U> PermissionChecker<U> for NullPermissionChecker {
    fn can(&self, _user: &U, _permission: &str, _subject: Option<&dyn Any>) -> bool {
        false
    }
}

/// Checker backed by compiled role definitions.
///
/// The role-permission map is compiled once at construction and shared
/// read-only afterwards; rebuild the checker when the definitions change.
/// The configured admin permission (default [`ADMIN_PERMISSION`]) is
/// granted to any role carrying the admin-access flag, declared or not.
pub struct DefinitionPermissionChecker<U> {
    map: RolePermissionMap,
    roles: Box<dyn RoleResolver<U>>,
    admin_permission: String,
}

impl<U> DefinitionPermissionChecker<U> {
    /// Compile the checker from a definition provider.
    ///
    /// # Errors
    ///
    /// Definition and model errors surface here, at construction, so that
    /// [`PermissionChecker::can`] stays infallible.
    pub fn new(
        definitions: &dyn RoleDefinitionProvider,
        roles: Box<dyn RoleResolver<U>>,
        resolver: &PermissionResolver,
        catalog: &PermissionCatalog,
    ) -> RbacResult<Self> {
        let set = definitions.load()?;
        let map = RolePermissionMap::build(&set, resolver, catalog)?;
        Ok(Self {
            map,
            roles,
            admin_permission: ADMIN_PERMISSION.to_string(),
        })
    }

    /// Override the admin permission name.
    pub fn with_admin_permission(mut self, permission: impl Into<String>) -> Self {
        self.admin_permission = permission.into();
        self
    }

    /// The compiled role-permission map.
    pub fn map(&self) -> &RolePermissionMap {
        &self.map
    }
}

impl<U> PermissionChecker<U> for DefinitionPermissionChecker<U> {
    fn can(&self, user: &U, permission: &str, _subject: Option<&dyn Any>) -> bool {
        let permission = permission.trim();
        if permission.is_empty() {
            return false;
        }

        let role_names = self.roles.resolve(user);
        if role_names.is_empty() {
            return false;
        }

        for role_name in role_names {
            let Some(role) = self.map.role(&role_name) else {
                continue;
            };

            if permission == self.admin_permission && role.admin_access {
                return true;
            }

            if role.allows(permission) {
                return true;
            }
        }

        false
    }
}

/// Composes the RBAC decision with the policy registry.
///
/// The checker decides first; the registry is consulted only for
/// permissions the checker already allowed, and can only narrow the
/// outcome.
pub struct PermissionGate<U> {
    checker: Box<dyn PermissionChecker<U>>,
    policies: PermissionPolicyRegistry<U>,
}

impl<U> PermissionGate<U> {
    /// Create a gate with no policies.
    pub fn new(checker: Box<dyn PermissionChecker<U>>) -> Self {
        Self::with_policies(checker, PermissionPolicyRegistry::new())
    }

    /// Create a gate with a prepared policy registry.
    pub fn with_policies(
        checker: Box<dyn PermissionChecker<U>>,
        policies: PermissionPolicyRegistry<U>,
    ) -> Self {
        Self { checker, policies }
    }

    /// Mutable access to the policy registry, for registering rules.
    pub fn policies_mut(&mut self) -> &mut PermissionPolicyRegistry<U> {
        &mut self.policies
    }
}

impl<U> PermissionChecker<U> for PermissionGate<U> {
    fn can(&self, user: &U, permission: &str, subject: Option<&dyn Any>) -> bool {
        if !self.checker.can(user, permission, subject) {
            return false;
        }

        self.policies.allows(user, permission, subject)
    }
}
