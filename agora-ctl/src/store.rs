use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use agora_client::SessionStore;
use anyhow::Context;

/// Session storage in a JSON object on disk, rewritten on every change
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: &Path) -> anyhow::Result<FileStore> {
        let values = match std::fs::read(path) {
            Ok(data) => serde_json::from_slice(&data)
                .with_context(|| format!("parsing session file {path:?}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading session file {path:?}"));
            }
        };
        Ok(FileStore {
            path: path.to_path_buf(),
            values,
        })
    }

    fn save(&self) -> anyhow::Result<()> {
        let data = serde_json::to_vec_pretty(&self.values).context("serializing session")?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("writing session file {:?}", self.path))
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(String::from(key), String::from(value));
        self.save()
    }

    fn delete(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            if let Err(err) = self.save() {
                tracing::warn!(?err, key, "failed removing key from session file");
            }
        }
    }

    fn set_all(&mut self, values: &[(&str, &str)]) -> anyhow::Result<()> {
        for (k, v) in values {
            self.values.insert(String::from(*k), String::from(*v));
        }
        self.save()
    }
}
