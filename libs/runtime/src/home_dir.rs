use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory into an absolute path.
///
/// - `None` (or an empty string) picks the platform default:
///   `%APPDATA%/<default_subdir>` on Windows, `$HOME/<default_subdir>` elsewhere.
/// - A leading `~` is expanded to the user's home directory.
/// - Relative paths are anchored at the current working directory.
///
/// When `create` is set the directory (and its parents) is created.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => expand_tilde(raw)?,
        _ => platform_base_dir()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }

    Ok(path)
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("user home directory is not available"))
}

#[cfg(target_os = "windows")]
fn platform_base_dir() -> Result<PathBuf> {
    dirs::data_dir().ok_or_else(|| anyhow!("%APPDATA% is not available"))
}

#[cfg(not(target_os = "windows"))]
fn platform_base_dir() -> Result<PathBuf> {
    user_home()
}
