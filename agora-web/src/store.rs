use agora_client::SessionStore;
use anyhow::Context;
use gloo_storage::{LocalStorage, Storage};

/// Session storage in the browser's `localStorage`, so that it survives
/// reloads
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStore;

impl SessionStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        LocalStorage::set(key, value).with_context(|| format!("saving {key} to local storage"))
    }

    fn delete(&mut self, key: &str) {
        LocalStorage::delete(key);
    }
}
