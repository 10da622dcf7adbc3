use super::{comments, Field, InputKind, Node};
use crate::{
    api::{Session, Thread, Time},
    format::time_since,
    screen::{Dashboard, ThreadCard, ThreadScreen},
    Action,
};

pub fn dashboard(d: &Dashboard, session: Option<&Session>, now: Time) -> Node {
    let mut menu = vec![Node::button("Create Thread", Action::ShowCreateThread)];
    if let Some(s) = session {
        menu.push(Node::button("View Profile", Action::OpenProfile(s.user_id)));
    }
    menu.push(Node::button("Logout", Action::Logout));

    let mut children = vec![Node::heading(2, "Threads"), Node::group("menu", menu)];
    if d.cards.is_empty() {
        children.push(Node::text("empty", "No threads found."));
    }
    children.extend(d.cards.iter().map(|c| card(c, now)));
    if d.has_more {
        children.push(Node::button("More", Action::MoreThreads));
    }
    Node::group("dashboard", children)
}

fn card(card: &ThreadCard, now: Time) -> Node {
    match card {
        ThreadCard::Failed(_) => Node::group(
            "thread-card",
            vec![Node::text("error", "Failed to load thread details")],
        ),
        ThreadCard::Loaded { thread, author } => Node::group(
            "thread-card",
            vec![
                Node::link(thread.title.clone(), Action::OpenThread(thread.id)),
                Node::text("time", time_since(thread.created_at, now)),
                Node::text("content", thread.content.clone()),
                Node::text("likes", format!("Likes: {}", thread.likes.len())),
                Node::link(author.clone(), Action::OpenProfile(thread.creator_id)),
            ],
        ),
    }
}

pub fn create_thread() -> Node {
    Node::group(
        "create-thread",
        vec![
            Node::heading(2, "Create Thread"),
            Node::input(Field::Title, "Title", InputKind::Text),
            Node::TextArea {
                field: Field::Content,
                placeholder: "Content",
            },
            Node::Checkbox {
                field: Field::Public,
                label: "Make Public",
            },
            Node::button("Submit", Action::CreateThread),
            Node::button("Back", Action::Back),
        ],
    )
}

pub fn thread(t: &ThreadScreen, session: Option<&Session>, now: Time) -> Node {
    let thread = &t.thread;
    let mut posted = format!("Posted {}", time_since(thread.created_at, now));
    if thread.updated_at.is_some() {
        posted.push_str(" (Edited)");
    }
    let status = match thread.is_public {
        true => "Status: Public",
        false => "Status: Private",
    };

    let mut buttons = Vec::new();
    if session.map_or(false, |s| s.can_modify(thread.creator_id)) {
        buttons.push(Node::button("Edit Thread", Action::EditThread(thread.id)));
        buttons.push(Node::button(
            "Delete Thread",
            Action::DeleteThread(thread.id),
        ));
    }
    let liked = session.map_or(false, |s| thread.is_liked_by(s.user_id));
    buttons.push(Node::Button {
        label: if liked { "Unlike" } else { "Like" },
        action: Action::LikeThread {
            thread: thread.id,
            like: !liked,
        },
        enabled: !thread.lock,
    });
    let watched = session.map_or(false, |s| thread.is_watched_by(s.user_id));
    buttons.push(Node::button(
        if watched { "Unwatch" } else { "Watch" },
        Action::WatchThread {
            thread: thread.id,
            watch: !watched,
        },
    ));
    buttons.push(Node::button("Back", Action::Back));

    let mut children = vec![
        Node::heading(2, thread.title.clone()),
        Node::text("time", posted),
        Node::text("status", status),
        Node::text("content", thread.content.clone()),
        Node::text("likes", format!("Likes: {}", thread.likes.len())),
        Node::group(
            "author",
            vec![
                Node::text("label", "By"),
                Node::link(
                    t.name_of(thread.creator_id),
                    Action::OpenProfile(thread.creator_id),
                ),
            ],
        ),
    ];
    if thread.lock {
        children.push(Node::text("locked", "This thread is locked."));
    }
    children.push(Node::group("thread-actions", buttons));
    children.push(comments::list(t, session, now));
    if !thread.lock {
        children.push(Node::group(
            "new-comment",
            vec![
                Node::TextArea {
                    field: Field::Comment(None),
                    placeholder: "Write a comment...",
                },
                Node::button(
                    "Post Comment",
                    Action::PostComment {
                        thread: thread.id,
                        parent: None,
                    },
                ),
            ],
        ));
    }
    Node::group("thread", children)
}

pub fn edit_thread(t: &Thread) -> Node {
    Node::group(
        "edit-thread",
        vec![
            Node::heading(2, "Edit Thread"),
            Node::input(Field::Title, "Title", InputKind::Text),
            Node::TextArea {
                field: Field::Content,
                placeholder: "Content",
            },
            Node::Checkbox {
                field: Field::Public,
                label: "Make Public",
            },
            Node::Checkbox {
                field: Field::Locked,
                label: "Lock Thread",
            },
            Node::button("Save", Action::SaveThread(t.id)),
            Node::button("Cancel", Action::Back),
        ],
    )
}
