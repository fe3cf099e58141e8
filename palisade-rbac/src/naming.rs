//! # Permission Naming
//!
//! Formats `(resource, action, scope)` triples into canonical permission
//! names and normalizes type names into resource slugs. All functions here
//! are pure; the same inputs always produce the same name, which is what
//! makes compiled maps and sync plans reproducible.

/// Default scope applied when a grant or model does not declare one.
pub const DEFAULT_SCOPE: &str = "base";

/// Formats permission names from their parts.
///
/// The formatter is the single seam through which every permission name in
/// the system is produced: the catalog, the resolver, and the synchronizer
/// all share one formatter so that names compare equal across the read and
/// write paths.
pub trait PermissionNameFormatter: Send + Sync {
    /// Format a canonical permission name.
    ///
    /// # Arguments
    ///
    /// * `resource` - Resource name or type name; normalized to a slug
    /// * `action` - Action segment, e.g. `read`
    /// * `scope` - Scope segment, e.g. [`DEFAULT_SCOPE`] or `own`
    fn format(&self, resource: &str, action: &str, scope: &str) -> String;
}

/// The standard `resource.scope.action` formatter.
///
/// # Example
///
/// ```
/// use palisade_rbac::{DefaultPermissionNameFormatter, PermissionNameFormatter};
///
/// let formatter = DefaultPermissionNameFormatter::new();
/// assert_eq!(formatter.format("UserProfile", "read", "base"), "user-profile.base.read");
///
/// let colon = DefaultPermissionNameFormatter::with_separator(":");
/// assert_eq!(colon.format("article", "read", "base"), "article:base:read");
/// ```
#[derive(Debug, Clone)]
pub struct DefaultPermissionNameFormatter {
    separator: String,
}

impl DefaultPermissionNameFormatter {
    /// Create a formatter joining segments with `.`.
    pub fn new() -> Self {
        Self::with_separator(".")
    }

    /// Create a formatter with a custom segment separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for DefaultPermissionNameFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionNameFormatter for DefaultPermissionNameFormatter {
    fn format(&self, resource: &str, action: &str, scope: &str) -> String {
        let resource = normalize_resource_name(resource);
        let action = normalize_segment(action);
        let scope = normalize_segment(scope);

        format!(
            "{resource}{sep}{scope}{sep}{action}",
            sep = self.separator
        )
    }
}

/// Normalize a resource or type name into a resource slug.
///
/// Strips any module path (the part before the final `::` or `\`), strips a
/// single trailing `Permission` suffix when the remaining name is non-empty,
/// kebab-cases camel humps, lowercases, and maps `_`/space to `-`.
///
/// # Example
///
/// ```
/// use palisade_rbac::normalize_resource_name;
///
/// assert_eq!(normalize_resource_name("app::perms::ArticlePermission"), "article");
/// assert_eq!(normalize_resource_name("UserProfile"), "user-profile");
/// assert_eq!(normalize_resource_name("Permission"), "permission");
/// assert_eq!(normalize_resource_name("PermissionPermission"), "permission");
/// ```
pub fn normalize_resource_name(resource: &str) -> String {
    let resource = resource.trim();
    if resource.is_empty() {
        return String::new();
    }

    let resource = match resource.rfind("::") {
        Some(index) => &resource[index + 2..],
        None => resource,
    };
    let resource = match resource.rfind('\\') {
        Some(index) => &resource[index + 1..],
        None => resource,
    };

    // Strip the suffix once, and only when something remains afterwards.
    const SUFFIX: &str = "Permission";
    let resource = if resource.len() > SUFFIX.len() && resource.ends_with(SUFFIX) {
        &resource[..resource.len() - SUFFIX.len()]
    } else {
        resource
    };

    let mut out = String::with_capacity(resource.len() + 4);
    for (index, ch) in resource.chars().enumerate() {
        if ch.is_ascii_uppercase() && index > 0 {
            out.push('-');
        }
        if ch == '_' || ch == ' ' {
            out.push('-');
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out.trim_matches('-').to_string()
}

/// Normalize an action or scope segment.
///
/// Lowercases, replaces anything outside `[a-z0-9_-]` with `-`, collapses
/// doubled separators, and trims leading/trailing `-`.
fn normalize_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.trim().chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-' {
            out.push(ch);
        } else {
            out.push('-');
        }
    }

    while out.contains("--") || out.contains("__") {
        out = out.replace("--", "-").replace("__", "-");
    }

    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_deterministic() {
        let formatter = DefaultPermissionNameFormatter::new();
        assert_eq!(
            formatter.format("UserProfile", "read", "base"),
            "user-profile.base.read"
        );
        assert_eq!(
            formatter.format("UserProfile", "read", "base"),
            formatter.format("UserProfile", "read", "base")
        );
    }

    #[test]
    fn test_format_custom_separator() {
        let formatter = DefaultPermissionNameFormatter::with_separator(":");
        assert_eq!(formatter.format("article", "update", "own"), "article:own:update");
    }

    #[test]
    fn test_format_normalizes_segments() {
        let formatter = DefaultPermissionNameFormatter::new();
        assert_eq!(
            formatter.format("article", "Bulk Export!", "Own "),
            "article.own.bulk-export"
        );
    }

    #[test]
    fn test_normalize_strips_module_path() {
        assert_eq!(
            normalize_resource_name("app::perms::ArticlePermission"),
            "article"
        );
        assert_eq!(normalize_resource_name("App\\Perms\\ArticlePermission"), "article");
    }

    #[test]
    fn test_normalize_permission_suffix() {
        assert_eq!(normalize_resource_name("Permission"), "permission");
        assert_eq!(normalize_resource_name("PermissionPermission"), "permission");
        assert_eq!(normalize_resource_name("UserPermission"), "user");
    }

    #[test]
    fn test_normalize_camel_case() {
        assert_eq!(normalize_resource_name("UserProfile"), "user-profile");
        assert_eq!(normalize_resource_name("APIKey"), "a-p-i-key");
    }

    #[test]
    fn test_normalize_underscores_and_spaces() {
        assert_eq!(normalize_resource_name("audit_log"), "audit-log");
        assert_eq!(normalize_resource_name("audit log"), "audit-log");
        assert_eq!(normalize_resource_name("  -article-  "), "article");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_resource_name(""), "");
        assert_eq!(normalize_resource_name("   "), "");
    }

    #[test]
    fn test_segment_collapses_doubled_separators() {
        let formatter = DefaultPermissionNameFormatter::new();
        assert_eq!(formatter.format("article", "re--ad", "ba__se"), "article.ba-se.re-ad");
    }
}
