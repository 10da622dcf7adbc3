mod action;
pub use action::Action;

mod client;
pub use client::ApiClient;

mod comment;
pub use comment::{CommentEntry, CommentTree, SiblingOrder};

mod config;
pub use config::Config;

mod controller;
pub use controller::{Controller, Notice, NoticeKind, Outcome};

pub mod format;

pub mod http;
pub use crate::http::{Backend, ReqwestBackend};

mod navigator;
pub use navigator::{Navigator, Ticket};

mod screen;
pub use screen::{Dashboard, Profile, Screen, ThreadCard, ThreadScreen};

mod session;
pub use session::{MemoryStore, SessionManager, SessionStore, KEY_ROLE, KEY_TOKEN, KEY_USER_ID};

pub mod view;

pub mod api {
    pub use agora_api::*;
}
