use crate::model::ClassRecord;
use crate::ops::{apply, Mutation};
use crate::reconcile::reconcile;
use anyhow::Context;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const DATA_FILE: &str = "classpulse.json";
/// Storage keys inside the data file, kept byte-identical to the keys the
/// historical app used in browser storage.
pub const DATA_KEY: &str = "classPulseData";
pub const CURRENT_CLASS_KEY: &str = "classPulseCurrentClassId";

/// Owns the in-memory canonical record and the on-disk snapshot. Every
/// mutation is written through synchronously; there is exactly one writer
/// (the request loop), so no locking.
pub struct Store {
    data_path: PathBuf,
    record: ClassRecord,
    /// Notes emitted by the reconciler on open; surfaced over IPC so the
    /// shell can log or display them.
    notes: Vec<String>,
}

impl Store {
    /// Open (or create) the snapshot under `workspace`. Unreadable or
    /// outdated data is reconciled and the normalized snapshot written
    /// back immediately.
    pub fn open(workspace: &Path) -> anyhow::Result<Store> {
        std::fs::create_dir_all(workspace).with_context(|| {
            format!("failed to create workspace {}", workspace.to_string_lossy())
        })?;
        let data_path = workspace.join(DATA_FILE);

        let raw_data: Option<Value> = match std::fs::read_to_string(&data_path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(root) => root.get(DATA_KEY).cloned(),
                Err(_) => None,
            },
            Err(_) => None,
        };

        let outcome = reconcile(raw_data.as_ref());
        let store = Store {
            data_path,
            record: outcome.record,
            notes: outcome.notes,
        };
        if outcome.repaired {
            store.save()?;
        }
        Ok(store)
    }

    pub fn record(&self) -> &ClassRecord {
        &self.record
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Apply one intent and write the full snapshot through.
    pub fn dispatch(&mut self, mutation: &Mutation) -> anyhow::Result<()> {
        self.record = apply(&self.record, mutation);
        self.save()
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn save(&self) -> anyhow::Result<()> {
        let mut root = serde_json::Map::new();
        root.insert(
            DATA_KEY.to_string(),
            serde_json::to_value(std::slice::from_ref(&self.record))
                .context("failed to serialize class record")?,
        );
        root.insert(
            CURRENT_CLASS_KEY.to_string(),
            Value::String(self.record.id.clone()),
        );
        let text = serde_json::to_string_pretty(&Value::Object(root))
            .context("failed to serialize snapshot")?;

        // Full-snapshot overwrite via temp file + rename, so a crash can
        // never leave a half-written data file.
        let tmp_path = self.data_path.with_extension("json.saving");
        std::fs::write(&tmp_path, text).with_context(|| {
            format!(
                "failed to write temp snapshot {}",
                tmp_path.to_string_lossy()
            )
        })?;
        std::fs::rename(&tmp_path, &self.data_path).with_context(|| {
            format!(
                "failed to move snapshot into place at {}",
                self.data_path.to_string_lossy()
            )
        })?;
        Ok(())
    }
}
