/*
 * Locates the application's per-user configuration directory, creating it on
 * first use.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/*
 * Retrieves the application's local (non-roaming) configuration directory,
 * creating it if necessary. No organization qualifier is used, so the directory
 * sits directly under the platform's local config root (e.g. `~/.config/<app>`
 * or `AppData/Local/<app>`).
 *
 * Returns `None` if the platform offers no suitable location or the directory
 * cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving config dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!("PathUtils: Failed to create config directory {config_path:?}: {e}");
                return None;
            }
            log::debug!("PathUtils: Created config directory: {config_path:?}");
        }
        Some(config_path.to_path_buf())
    })
}
