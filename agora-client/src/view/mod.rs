//! Pure renderers from [`Screen`]s to [`Node`] trees. Front-ends only have
//! to turn `Node`s into their own widgets.

use std::collections::BTreeMap;

use crate::{
    api::{CommentId, Session, Time},
    Action, Notice, NoticeKind, Screen,
};

mod auth;
mod comments;
mod profile;
mod threads;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Field {
    Email,
    Name,
    Password,
    ConfirmPassword,
    Image,
    Title,
    Content,
    Public,
    Locked,
    Role,
    /// Reply box, or new-comment box when `None`
    Comment(Option<CommentId>),
    CommentEdit(CommentId),
}

impl Field {
    /// Stable element id
    pub fn key(&self) -> String {
        match self {
            Field::Email => String::from("email"),
            Field::Name => String::from("name"),
            Field::Password => String::from("password"),
            Field::ConfirmPassword => String::from("confirm-password"),
            Field::Image => String::from("image"),
            Field::Title => String::from("title"),
            Field::Content => String::from("content"),
            Field::Public => String::from("is-public"),
            Field::Locked => String::from("lock"),
            Field::Role => String::from("user-role"),
            Field::Comment(None) => String::from("new-comment"),
            Field::Comment(Some(c)) => format!("reply-{c}"),
            Field::CommentEdit(c) => format!("edit-comment-{c}"),
        }
    }
}

/// Current values of the inputs on screen. Checkboxes hold `"true"` or
/// `"false"`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Form(BTreeMap<Field, String>);

impl Form {
    pub fn new() -> Form {
        Form::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Form {
        self.set(field, value);
        self
    }

    pub fn set_flag(&mut self, field: Field, value: bool) {
        self.set(field, value.to_string());
    }

    pub fn text(&self, field: Field) -> &str {
        self.0.get(&field).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn flag(&self, field: Field) -> bool {
        self.text(field) == "true"
    }

    /// The value, if it is not blank
    pub fn optional(&self, field: Field) -> Option<String> {
        Some(self.text(field))
            .filter(|v| !v.trim().is_empty())
            .map(String::from)
    }

    /// Adds the values of `other` for the fields not set yet
    pub fn fill_missing(&mut self, other: Form) {
        for (f, v) in other.0 {
            self.0.entry(f).or_insert(v);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Text,
    Email,
    Password,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    Group {
        class: &'static str,
        /// Nesting level, for comment replies
        indent: usize,
        children: Vec<Node>,
    },
    Heading {
        level: u8,
        text: String,
    },
    Text {
        class: &'static str,
        text: String,
    },
    Image {
        src: String,
        alt: String,
    },
    Input {
        field: Field,
        label: &'static str,
        kind: InputKind,
    },
    Checkbox {
        field: Field,
        label: &'static str,
    },
    Select {
        field: Field,
        label: &'static str,
        /// `(value, label)` pairs
        options: Vec<(&'static str, &'static str)>,
    },
    TextArea {
        field: Field,
        placeholder: &'static str,
    },
    Button {
        label: &'static str,
        action: Action,
        enabled: bool,
    },
    Link {
        text: String,
        action: Action,
    },
}

impl Node {
    pub fn group(class: &'static str, children: Vec<Node>) -> Node {
        Node::Group {
            class,
            indent: 0,
            children,
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Node {
        Node::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn text(class: &'static str, text: impl Into<String>) -> Node {
        Node::Text {
            class,
            text: text.into(),
        }
    }

    pub fn input(field: Field, label: &'static str, kind: InputKind) -> Node {
        Node::Input { field, label, kind }
    }

    pub fn button(label: &'static str, action: Action) -> Node {
        Node::Button {
            label,
            action,
            enabled: true,
        }
    }

    pub fn link(text: impl Into<String>, action: Action) -> Node {
        Node::Link {
            text: text.into(),
            action,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// Pre-order walk over this node and all its descendants
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for c in self.children() {
            c.walk(f);
        }
    }

    /// Actions reachable through enabled buttons and links
    pub fn actions(&self) -> Vec<Action> {
        let mut res = Vec::new();
        self.walk(&mut |n| match n {
            Node::Button {
                action,
                enabled: true,
                ..
            }
            | Node::Link { action, .. } => res.push(*action),
            _ => (),
        });
        res
    }

    pub fn find_button(&self, label: &str) -> Option<&Node> {
        let mut res = None;
        self.walk(&mut |n| {
            if let Node::Button { label: l, .. } = n {
                if res.is_none() && *l == label {
                    res = Some(n);
                }
            }
        });
        res
    }

    pub fn fields(&self) -> Vec<Field> {
        let mut res = Vec::new();
        self.walk(&mut |n| match n {
            Node::Input { field, .. }
            | Node::Checkbox { field, .. }
            | Node::Select { field, .. }
            | Node::TextArea { field, .. } => res.push(*field),
            _ => (),
        });
        res
    }

    /// All displayed strings, in display order
    pub fn texts(&self) -> Vec<&str> {
        let mut res = Vec::new();
        self.walk(&mut |n| match n {
            Node::Heading { text, .. } | Node::Text { text, .. } | Node::Link { text, .. } => {
                res.push(text.as_str())
            }
            Node::Button { label, .. } => res.push(*label),
            _ => (),
        });
        res
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

pub fn render(screen: &Screen, session: Option<&Session>, now: Time) -> Node {
    match screen {
        Screen::Login => auth::login(),
        Screen::Register => auth::register(),
        Screen::Dashboard(d) => threads::dashboard(d, session, now),
        Screen::CreateThread => threads::create_thread(),
        Screen::Thread(t) => threads::thread(t, session, now),
        Screen::EditThread(t) => threads::edit_thread(t),
        Screen::Profile(p) => profile::profile(p, session, now),
        Screen::EditProfile(u) => profile::edit_profile(u),
    }
}

pub fn notice(notice: &Notice) -> Node {
    let class = match notice.kind {
        NoticeKind::Success => "notice-success",
        NoticeKind::Error => "notice-error",
    };
    Node::text(class, notice.message.clone())
}
