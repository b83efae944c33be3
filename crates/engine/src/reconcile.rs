//! Reconciliation of the document against the hook catalog
//!
//! The update pass makes every catalog declaration present exactly once in
//! its stage, the reorder pass sorts touched stages by weight, and the
//! removal pass deletes the entries of an uninstalled package.

use crate::document::{ConfigurationDocument, TaskEntry, entry_description, set_entry_script};
use crate::hooks::{Denylist, HookCatalog, Signature, signature};
use indexmap::IndexSet;
use serde::Serialize;
use serde_yaml_ng::Value;
use silverhook_core::Result;
use std::fmt;

/// What one pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// New entries appended
    pub inserted: usize,
    /// Existing entries whose script was rewritten
    pub updated: usize,
    /// Entries deleted
    pub removed: usize,
    /// New entries refused by the denylist
    pub suppressed: usize,
    /// Stages whose order changed
    pub reordered: usize,
}

impl ReconcileReport {
    /// Whether the document was modified
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.inserted + self.updated + self.removed + self.reordered > 0
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} removed, {} suppressed, {} reordered",
            self.inserted, self.updated, self.removed, self.suppressed, self.reordered
        )
    }
}

/// Applies a hook catalog to a configuration document
pub struct ReconciliationEngine<'a> {
    catalog: &'a HookCatalog,
    denylist: &'a Denylist,
    task_type: String,
}

impl<'a> ReconciliationEngine<'a> {
    /// Create an engine; `task_type` is the `type` of newly inserted entries
    pub fn new(
        catalog: &'a HookCatalog,
        denylist: &'a Denylist,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            denylist,
            task_type: task_type.into(),
        }
    }

    /// Run the update pass followed by the reorder pass
    ///
    /// # Errors
    ///
    /// Returns `DocumentShape` when a node on a hook path has the wrong type;
    /// the document may then be partially modified and must not be written
    pub fn update(&self, document: &mut ConfigurationDocument) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut dirty: IndexSet<(String, String)> = IndexSet::new();

        for declaration in self.catalog.declarations() {
            let wf_type = declaration.wf_type.as_str();
            let stage = declaration.stage.as_str();
            let signature = signature(declaration);

            if let Some(entries) = document.stage_mut(wf_type, stage)?
                && let Some(index) = position_of(entries, &signature)
            {
                if set_entry_script(&mut entries[index], &declaration.script) {
                    tracing::debug!(
                        "Updated script of {} in {wf_type}.{stage}: {}",
                        declaration.package_name,
                        declaration.script
                    );
                    report.updated += 1;
                }
                report.removed += remove_duplicates(entries, index, &signature);
                dirty.insert((wf_type.to_string(), stage.to_string()));
                continue;
            }

            if self
                .denylist
                .suppresses(wf_type, stage, &declaration.package_name)
            {
                tracing::info!(
                    "Not adding {wf_type}.{stage} hook of {}: denylisted by the project",
                    declaration.package_name
                );
                report.suppressed += 1;
                continue;
            }

            tracing::debug!(
                "Adding {wf_type}.{stage} hook of {}: {}",
                declaration.package_name,
                declaration.script
            );
            let entry = TaskEntry {
                kind: self.task_type.clone(),
                script: declaration.script.clone(),
                description: signature.full,
            };
            document
                .stage_mut_or_insert(wf_type, stage)?
                .push(entry.into_value());
            report.inserted += 1;
            dirty.insert((wf_type.to_string(), stage.to_string()));
        }

        for (wf_type, stage) in &dirty {
            if self.reorder(document, wf_type, stage)? {
                report.reordered += 1;
            }
        }

        Ok(report)
    }

    /// Delete every entry owned by the packages of a catalog fragment
    ///
    /// Stages that are absent from the document are skipped. No reordering
    /// is needed since nothing is added and no weight changes.
    ///
    /// # Errors
    ///
    /// Returns `DocumentShape` when a node on a hook path has the wrong type
    pub fn remove(
        fragment: &HookCatalog,
        document: &mut ConfigurationDocument,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for declaration in fragment.declarations() {
            let Some(entries) = document.stage_mut(&declaration.wf_type, &declaration.stage)?
            else {
                continue;
            };

            let signature = signature(declaration);
            let before = entries.len();
            entries.retain(|entry| !owned_by(entry, &signature));
            let removed = before - entries.len();

            if removed > 0 {
                tracing::debug!(
                    "Removed {removed} entries of {} from {}.{}",
                    declaration.package_name,
                    declaration.wf_type,
                    declaration.stage
                );
            }
            report.removed += removed;
        }

        Ok(report)
    }

    /// Stable-sort one stage by the weight of each entry's declaration
    ///
    /// Returns `true` when the order changed.
    fn reorder(
        &self,
        document: &mut ConfigurationDocument,
        wf_type: &str,
        stage: &str,
    ) -> Result<bool> {
        let signatures: Vec<(Signature, i64)> = self
            .catalog
            .for_stage(wf_type, stage)
            .map(|d| (signature(d), d.weight))
            .collect();

        let Some(entries) = document.stage_mut(wf_type, stage)? else {
            return Ok(false);
        };

        let weights: Vec<i64> = entries
            .iter()
            .map(|entry| {
                signatures
                    .iter()
                    .find(|(signature, _)| owned_by(entry, signature))
                    .map_or(0, |(_, weight)| *weight)
            })
            .collect();

        if weights.windows(2).all(|pair| pair[0] <= pair[1]) {
            return Ok(false);
        }

        let mut keyed: Vec<(i64, Value)> = weights.into_iter().zip(entries.drain(..)).collect();
        keyed.sort_by_key(|(weight, _)| *weight);
        entries.extend(keyed.into_iter().map(|(_, entry)| entry));

        tracing::debug!("Reordered {wf_type}.{stage} by weight");
        Ok(true)
    }
}

fn owned_by(entry: &Value, signature: &Signature) -> bool {
    entry_description(entry).is_some_and(|description| signature.matches(description))
}

fn position_of(entries: &[Value], signature: &Signature) -> Option<usize> {
    entries.iter().position(|entry| owned_by(entry, signature))
}

/// Drop entries after `keep` that belong to the same package
fn remove_duplicates(entries: &mut Vec<Value>, keep: usize, signature: &Signature) -> usize {
    let before = entries.len();
    let mut index = 0;
    entries.retain(|entry| {
        let retain = index <= keep || !owned_by(entry, signature);
        index += 1;
        retain
    });
    let removed = before - entries.len();
    if removed > 0 {
        tracing::warn!(
            "Removed {removed} duplicate entries tagged {}",
            signature.package_tag
        );
    }
    removed
}
