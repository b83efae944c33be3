//! Hook declarations contributed by packages
//!
//! ## Module Organization
//!
//! - `schema`: known hook types and their stages
//! - `declaration`: raw and validated declarations, the grouped catalog
//! - `catalog`: catalog construction from package metadata
//! - `signature`: identity labels written into task entries
//! - `denylist`: project-level opt-out rules

pub mod catalog;
pub mod declaration;
pub mod denylist;
pub mod schema;
pub mod signature;

// Re-export main types for convenience
pub use catalog::{BaseDirLocator, CatalogSettings, HookCatalogBuilder};
pub use declaration::{HookCatalog, HookDeclaration, RawDeclaration};
pub use denylist::{DenyTarget, Denylist};
pub use schema::{SchemaCatalog, WorkflowSchema};
pub use signature::{Signature, package_tag, signature};
