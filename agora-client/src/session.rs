use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::api::{AuthToken, Error, Role, Session, UserId};

pub const KEY_TOKEN: &str = "authToken";
pub const KEY_USER_ID: &str = "userId";
pub const KEY_ROLE: &str = "userRole";

const KEYS: [&str; 3] = [KEY_TOKEN, KEY_USER_ID, KEY_ROLE];

/// Persistent string key-value storage the session lives in
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&mut self, key: &str);

    fn set_all(&mut self, values: &[(&str, &str)]) -> anyhow::Result<()> {
        for (k, v) in values {
            self.set(k, v)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore(HashMap<String, String>);

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.0.insert(String::from(key), String::from(value));
        Ok(())
    }

    fn delete(&mut self, key: &str) {
        self.0.remove(key);
    }
}

/// Owns the session triple. Every write either stores all three keys or
/// none of them, and a partially-stored triple reads as anonymous.
pub struct SessionManager<S> {
    store: Arc<Mutex<S>>,
}

impl<S> Clone for SessionManager<S> {
    fn clone(&self) -> SessionManager<S> {
        SessionManager {
            store: self.store.clone(),
        }
    }
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> SessionManager<S> {
        SessionManager {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn current(&self) -> Option<Session> {
        let mut store = self.store.lock();
        let values = KEYS.map(|k| store.get(k));
        match values {
            [None, None, None] => None,
            [Some(token), Some(user_id), Some(role)] => {
                match (user_id.parse::<u64>(), role.parse::<Role>()) {
                    (Ok(user_id), Ok(role)) => Some(Session {
                        token: AuthToken(token),
                        user_id: UserId(user_id),
                        role,
                    }),
                    _ => {
                        tracing::warn!(%user_id, %role, "stored session is unreadable, clearing it");
                        clear(&mut *store);
                        None
                    }
                }
            }
            _ => {
                tracing::warn!("stored session is incomplete, clearing it");
                clear(&mut *store);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn set(&self, session: &Session) -> Result<(), Error> {
        let user_id = session.user_id.to_string();
        let mut store = self.store.lock();
        let res = store.set_all(&[
            (KEY_TOKEN, &session.token.0),
            (KEY_USER_ID, &user_id),
            (KEY_ROLE, session.role.as_str()),
        ]);
        if let Err(err) = res {
            tracing::error!(?err, "failed saving session");
            clear(&mut *store);
            return Err(Error::Storage(format!("failed saving session: {err:#}")));
        }
        tracing::info!(user = %session.user_id, role = %session.role, "session saved");
        Ok(())
    }

    pub fn clear(&self) {
        clear(&mut *self.store.lock());
        tracing::info!("session cleared");
    }

    /// Direct access to the underlying store
    pub fn with_store<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut *self.store.lock())
    }
}

fn clear<S: SessionStore>(store: &mut S) {
    for k in KEYS {
        store.delete(k);
    }
}
