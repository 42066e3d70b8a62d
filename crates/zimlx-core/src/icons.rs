//! Icon and prediction reload.
//!
//! Reloading icons touches the launcher model for every user profile and
//! then every requested package, so it runs on the
//! [`IconPack`](LogicalThread::IconPack) thread. When a launcher UI exists,
//! its prediction row is told to refresh on the main thread afterwards.
//!
//! A failing step aborts the rest of the reload. Completed steps are not
//! rolled back and nothing is retried; the failure goes to the icon pack
//! thread's uncaught handler.

use std::sync::Arc;

use crate::dispatch::{LogicalThread, ThreadContext};
use crate::error::{DispatchError, IconReloadError};
use crate::logging::targets;
use crate::package::{ComponentKey, PackageUserKey, UserHandle};

/// Enumerates user profiles on the device.
pub trait UserManager: Send + Sync {
    /// Every profile the launcher shows apps for.
    fn user_profiles(&self) -> Vec<UserHandle>;
}

/// The launcher's app model.
pub trait LauncherModel: Send + Sync {
    /// Reload every package of `user`.
    fn on_packages_reload(&self, user: UserHandle) -> Result<(), IconReloadError>;
}

/// Reloads a single icon through the icon pack provider.
pub trait IconReloader: Send + Sync {
    /// Reload the icon of `package_name` for `user`.
    fn reload_icon(&self, package_name: &str, user: UserHandle) -> Result<(), IconReloadError>;
}

/// The part of the launcher UI that shows app predictions.
pub trait PredictionUi: Send + Sync {
    /// Refresh predictions. Always called on the main thread.
    fn on_predictions_updated(&self);
}

/// Access to the running launcher UI, if there is one.
pub trait LauncherUiAccessor: Send + Sync {
    /// The launcher instance, or `None` when no launcher UI is alive.
    fn launcher(&self) -> Option<Arc<dyn PredictionUi>>;
}

/// The collaborators an icon reload talks to.
#[derive(Clone)]
pub struct IconReloadServices {
    pub users: Arc<dyn UserManager>,
    pub model: Arc<dyn LauncherModel>,
    pub icons: Arc<dyn IconReloader>,
    pub ui: Arc<dyn LauncherUiAccessor>,
}

/// What a completed reload did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    /// User profiles whose packages were reloaded.
    pub users: usize,
    /// Icons reloaded.
    pub icons: usize,
    /// Whether a predictions refresh was sent to the main thread.
    pub predictions_notified: bool,
}

/// Reload icons for `packages` on the icon pack thread.
///
/// Returns once the work is queued, or after it finished when already called
/// on the icon pack thread. Fails only if the work cannot be scheduled.
pub fn reload_icons(
    ctx: &Arc<ThreadContext>,
    services: &IconReloadServices,
    packages: Vec<PackageUserKey>,
) -> Result<(), DispatchError> {
    let job_ctx = Arc::clone(ctx);
    let services = services.clone();
    ctx.run_on(LogicalThread::IconPack, move || {
        if let Err(err) = run_icon_reload(&job_ctx, &services, &packages) {
            job_ctx.report_uncaught(LogicalThread::IconPack, err.to_string());
        }
    })
}

/// Reload icons for the packages that own `components`.
pub fn reload_icons_from_components(
    ctx: &Arc<ThreadContext>,
    services: &IconReloadServices,
    components: &[ComponentKey],
) -> Result<(), DispatchError> {
    let packages = components.iter().map(ComponentKey::package_user).collect();
    reload_icons(ctx, services, packages)
}

/// Run the reload on the calling thread.
///
/// Callers are expected to be on the icon pack thread already; see
/// [`reload_icons`].
#[tracing::instrument(
    skip_all,
    target = "zimlx_core::icons",
    level = "debug",
    fields(packages = packages.len())
)]
pub fn run_icon_reload(
    ctx: &ThreadContext,
    services: &IconReloadServices,
    packages: &[PackageUserKey],
) -> Result<ReloadSummary, IconReloadError> {
    let mut summary = ReloadSummary::default();

    for user in services.users.user_profiles() {
        services.model.on_packages_reload(user)?;
        summary.users += 1;
    }

    for key in packages {
        services.icons.reload_icon(&key.package_name, key.user)?;
        summary.icons += 1;
    }

    if let Some(launcher) = services.ui.launcher() {
        ctx.run_on_main(move || launcher.on_predictions_updated())?;
        summary.predictions_notified = true;
    }

    tracing::debug!(
        target: targets::ICONS,
        users = summary.users,
        icons = summary.icons,
        "icon reload finished"
    );
    Ok(summary)
}
