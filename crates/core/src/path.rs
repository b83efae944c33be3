//! Script path helpers
//!
//! Script references stored in the configuration document are always
//! slash-separated and relative to the project root, whatever the host
//! platform, so the same package set produces the same document everywhere.

use std::path::{Component, Path};

/// Render a path with `/` separators, dropping `.` components
///
/// # Examples
///
/// ```
/// use silverhook_core::path::to_slash;
/// use std::path::Path;
///
/// assert_eq!(to_slash(Path::new("./private/scripts/qs")), "private/scripts/qs");
/// ```
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut absolute = false;
    for component in path.components() {
        match component {
            Component::RootDir => absolute = true,
            Component::CurDir => {}
            Component::ParentDir => parts.push("..".to_string()),
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned());
            }
        }
    }

    let joined = parts.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

/// Join a directory and a relative file reference with `/`
///
/// Leading `./` and redundant slashes on either side are removed.
#[must_use]
pub fn join_slash(dir: &Path, file: &str) -> String {
    let dir = to_slash(dir);
    let file = file.trim_start_matches("./").trim_start_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), file)
    }
}
