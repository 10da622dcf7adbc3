use std::collections::BTreeMap;

use crate::{
    api::{CommentId, Role, Thread, ThreadId, ThreadPage, User, UserId},
    view::{Field, Form},
    CommentTree,
};

/// Name shown for authors whose lookup failed
pub const UNKNOWN_USER: &str = "Unknown User";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Screen {
    Login,
    Register,
    Dashboard(Dashboard),
    CreateThread,
    Thread(ThreadScreen),
    EditThread(Thread),
    Profile(Profile),
    EditProfile(User),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dashboard {
    pub cards: Vec<ThreadCard>,

    /// Last page that got fetched
    pub page: ThreadPage,

    /// Whether the last page came back full
    pub has_more: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ThreadCard {
    Loaded { thread: Thread, author: String },
    Failed(ThreadId),
}

impl ThreadCard {
    pub fn id(&self) -> ThreadId {
        match self {
            ThreadCard::Loaded { thread, .. } => thread.id,
            ThreadCard::Failed(id) => *id,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThreadScreen {
    pub thread: Thread,
    pub comments: CommentTree,

    /// Display names of the thread's and comments' authors
    pub names: BTreeMap<UserId, String>,

    /// Comment whose reply box is open
    pub replying_to: Option<CommentId>,

    /// Comment whose edit box is open
    pub editing: Option<CommentId>,
}

impl ThreadScreen {
    pub fn name_of(&self, user: UserId) -> &str {
        self.names
            .get(&user)
            .map(|n| n.as_str())
            .unwrap_or(UNKNOWN_USER)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    pub user: User,
    pub threads: Vec<Thread>,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Register => "register",
            Screen::Dashboard(_) => "dashboard",
            Screen::CreateThread => "create-thread",
            Screen::Thread(_) => "thread",
            Screen::EditThread(_) => "edit-thread",
            Screen::Profile(_) => "profile",
            Screen::EditProfile(_) => "edit-profile",
        }
    }

    /// Values the inputs of this screen start with
    pub fn initial_form(&self) -> Form {
        let mut form = Form::new();
        match self {
            Screen::EditThread(t) => {
                form.set(Field::Title, t.title.clone());
                form.set(Field::Content, t.content.clone());
                form.set_flag(Field::Public, t.is_public);
                form.set_flag(Field::Locked, t.lock);
            }
            Screen::EditProfile(u) => {
                form.set(Field::Email, u.email.clone());
                form.set(Field::Name, u.name.clone());
            }
            Screen::Profile(p) => {
                form.set(Field::Role, Role::from_admin(p.user.admin).as_str());
            }
            Screen::Thread(t) => {
                if let Some(c) = t.editing.and_then(|id| t.comments.find(id)) {
                    form.set(Field::CommentEdit(c.id), c.content.clone());
                }
            }
            Screen::Login
            | Screen::Register
            | Screen::Dashboard(_)
            | Screen::CreateThread => (),
        }
        form
    }
}
