//! Package, component and permission lookups.
//!
//! The host's package manager is reached through the [`PackageManager`],
//! [`PermissionChecker`] and [`LauncherApps`] traits. Lookup failures are
//! expected conditions here and are turned into `false` or `None` rather
//! than surfaced as errors.

use std::fmt;

use bitflags::bitflags;

use crate::error::PackageError;
use crate::logging::targets;

/// Permission to read shared storage.
pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
/// Approximate location permission.
pub const ACCESS_COARSE_LOCATION: &str = "android.permission.ACCESS_COARSE_LOCATION";
/// Precise location permission.
pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";

/// A user profile on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserHandle(pub u32);

impl UserHandle {
    /// The primary device owner.
    pub const OWNER: Self = Self(0);

    /// The raw user id.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A package plus the class of one of its components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentName {
    pub package_name: String,
    pub class_name: String,
}

impl ComponentName {
    /// Create a component name.
    pub fn new(package_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            class_name: class_name.into(),
        }
    }

    /// Parse the `package/class` form. A class starting with `.` is relative
    /// to the package.
    pub fn unflatten(flat: &str) -> Option<Self> {
        let (package, class) = flat.split_once('/')?;
        if package.is_empty() || class.is_empty() {
            return None;
        }
        let class_name = if class.starts_with('.') {
            format!("{package}{class}")
        } else {
            class.to_string()
        };
        Some(Self::new(package, class_name))
    }

    /// The `package/class` form.
    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package_name, self.class_name)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package_name, self.class_name)
    }
}

/// A component installed for a specific user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    pub component: ComponentName,
    pub user: UserHandle,
}

impl ComponentKey {
    /// Create a component key.
    pub fn new(component: ComponentName, user: UserHandle) -> Self {
        Self { component, user }
    }

    /// The package/user pair this component belongs to.
    pub fn package_user(&self) -> PackageUserKey {
        PackageUserKey::new(self.component.package_name.clone(), self.user)
    }
}

/// A package installed for a specific user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageUserKey {
    pub package_name: String,
    pub user: UserHandle,
}

impl PackageUserKey {
    /// Create a package/user key.
    pub fn new(package_name: impl Into<String>, user: UserHandle) -> Self {
        Self {
            package_name: package_name.into(),
            user,
        }
    }
}

bitflags! {
    /// Per-permission flags reported alongside a requested permission.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RequestedPermissionFlags: u32 {
        /// The permission is required by the package.
        const REQUIRED = 1 << 0;
        /// The permission is currently granted.
        const GRANTED = 1 << 1;
        /// The permission is never used to derive location.
        const NEVER_FOR_LOCATION = 1 << 16;
    }
}

/// One permission a package asks for in its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedPermission {
    pub name: String,
    pub flags: RequestedPermissionFlags,
}

impl RequestedPermission {
    /// Create a requested permission entry.
    pub fn new(name: impl Into<String>, flags: RequestedPermissionFlags) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }
}

/// The subset of package metadata the launcher reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub package_name: String,
    pub requested_permissions: Vec<RequestedPermission>,
}

/// Read access to installed package metadata.
pub trait PackageManager: Send + Sync {
    /// Look up a package, including its requested permissions.
    fn package_info(&self, package_name: &str) -> Result<PackageInfo, PackageError>;
}

/// Whether the launcher itself holds a permission.
pub trait PermissionChecker {
    /// Check a permission for the calling application.
    fn check_self_permission(&self, permission: &str) -> bool;
}

/// An activity that can be launched from the home screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherActivityInfo {
    pub component: ComponentName,
    pub user: UserHandle,
    pub label: String,
}

/// Enumerates launchable activities.
pub trait LauncherApps {
    /// Launchable activities of `package_name` for `user`.
    fn activity_list(&self, package_name: &str, user: UserHandle) -> Vec<LauncherActivityInfo>;
}

/// Check whether `package_name` requested `permission` and was granted it.
///
/// Returns `false` when the package is missing, does not request the
/// permission, or requested it without it being granted.
pub fn check_package_permission(
    pm: &dyn PackageManager,
    package_name: &str,
    permission: &str,
) -> bool {
    let info = match pm.package_info(package_name) {
        Ok(info) => info,
        Err(err) => {
            tracing::debug!(target: targets::PACKAGE, %err, "permission check on unavailable package");
            return false;
        }
    };

    info.requested_permissions
        .iter()
        .find(|requested| requested.name == permission)
        .is_some_and(|requested| requested.flags.contains(RequestedPermissionFlags::GRANTED))
}

/// Check whether the launcher holds `permission`.
pub fn has_permission(checker: &dyn PermissionChecker, permission: &str) -> bool {
    checker.check_self_permission(permission)
}

/// Check whether the launcher may read shared storage.
pub fn has_storage_permission(checker: &dyn PermissionChecker) -> bool {
    has_permission(checker, READ_EXTERNAL_STORAGE)
}

/// Check whether the launcher holds either location permission.
pub fn check_location_access(checker: &dyn PermissionChecker) -> bool {
    has_permission(checker, ACCESS_COARSE_LOCATION) || has_permission(checker, ACCESS_FINE_LOCATION)
}

/// Find the launchable activity that matches `key` exactly.
pub fn launcher_activity_info(
    apps: &dyn LauncherApps,
    key: &ComponentKey,
) -> Option<LauncherActivityInfo> {
    apps.activity_list(&key.component.package_name, key.user)
        .into_iter()
        .find(|info| info.component == key.component)
}

/// An item placed on the workspace.
pub trait WorkspaceItem {
    /// The component the item launches, if any.
    fn target_component(&self) -> Option<&ComponentName>;
}

/// Check whether any workspace item launches a component of `package_name`.
pub fn workspace_contains<I: WorkspaceItem>(items: &[I], package_name: &str) -> bool {
    items.iter().any(|item| {
        item.target_component()
            .is_some_and(|component| component.package_name == package_name)
    })
}
