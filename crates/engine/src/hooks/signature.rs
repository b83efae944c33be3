//! Hook identity labels
//!
//! The description written into a task entry doubles as the entry's
//! identity. Ownership is decided by containment of the `[package]` tag, so
//! users may rewrite the rest of the label freely.
//!
//! Containment is loose on purpose for compatibility with existing files:
//! a tag such as `[acme/cache]` never collides with `[acme/cache-warm]`
//! because the closing bracket is part of the tag, but any free text that
//! happens to contain a full tag is claimed by that package.

use super::declaration::HookDeclaration;

/// Derived identity of a hook declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Label written as the description of newly created entries
    pub full: String,
    /// `[package-name]`, the part used for matching
    pub package_tag: String,
}

impl Signature {
    /// Whether an existing entry description belongs to this package
    #[must_use]
    pub fn matches(&self, description: &str) -> bool {
        description.contains(&self.package_tag)
    }
}

/// Tag identifying a package inside entry descriptions
#[must_use]
pub fn package_tag(package_name: &str) -> String {
    format!("[{package_name}]")
}

/// Derive the signature of a declaration
///
/// The package description is used as the readable part of the label; the
/// hook type stands in when the package has no description.
#[must_use]
pub fn signature(declaration: &HookDeclaration) -> Signature {
    let tag = package_tag(&declaration.package_name);
    let label = match declaration.package_description.trim() {
        "" => declaration.wf_type.as_str(),
        description => description,
    };

    Signature {
        full: format!("{tag} {label} (default)"),
        package_tag: tag,
    }
}
