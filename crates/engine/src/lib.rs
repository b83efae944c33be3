//! # Silverhook Engine
//!
//! Keeps the workflow hooks of a project's configuration document in sync
//! with the hooks declared by its installed packages.
//!
//! - **Hooks**: schema validation, declaration parsing, the weight-ordered
//!   catalog, identity signatures and the project denylist
//! - **Document**: order-preserving YAML tree with comment preservation and
//!   numeric literal repair, loaded and written by the document store
//! - **Reconciliation**: update, reorder and removal passes

pub mod document;
pub mod hooks;
pub mod reconcile;

// Re-export error types from core
pub use silverhook_core::{Error, Result};

// Re-export commonly used types
pub use document::{CommentLedger, ConfigurationDocument, DocumentStore, TaskEntry};
pub use hooks::{
    BaseDirLocator, CatalogSettings, Denylist, HookCatalog, HookCatalogBuilder, HookDeclaration,
    SchemaCatalog, Signature, signature,
};
pub use reconcile::{ReconcileReport, ReconciliationEngine};
