use super::{Field, Node};
use crate::{
    api::{Comment, Session, Time},
    format::time_since,
    screen::ThreadScreen,
    Action,
};

pub fn list(t: &ThreadScreen, session: Option<&Session>, now: Time) -> Node {
    let mut children = vec![Node::heading(3, "Comments")];
    if t.comments.is_empty() {
        children.push(Node::text("empty", "No comments yet."));
    }
    children.extend(
        t.comments
            .entries
            .iter()
            .map(|e| entry(t, &e.comment, e.depth, session, now)),
    );
    Node::group("comments", children)
}

fn entry(
    t: &ThreadScreen,
    c: &Comment,
    depth: usize,
    session: Option<&Session>,
    now: Time,
) -> Node {
    let thread = t.thread.id;
    let locked = t.thread.lock;
    let mut children = vec![
        Node::text("content", c.content.clone()),
        Node::text("time", time_since(c.created_at, now)),
        Node::link(t.name_of(c.creator_id), Action::OpenProfile(c.creator_id)),
    ];

    let mut buttons = Vec::new();
    if !locked {
        buttons.push(Node::button("Reply", Action::ToggleReply(c.id)));
    }
    if session.map_or(false, |s| s.can_modify(c.creator_id)) {
        buttons.push(Node::button("Edit", Action::ToggleEditComment(c.id)));
        buttons.push(Node::button(
            "Delete",
            Action::DeleteComment {
                thread,
                comment: c.id,
            },
        ));
    }
    let liked = session.map_or(false, |s| c.is_liked_by(s.user_id));
    buttons.push(Node::button(
        if liked { "Unlike" } else { "Like" },
        Action::LikeComment {
            thread,
            comment: c.id,
            like: !liked,
        },
    ));
    children.push(Node::group("comment-actions", buttons));
    children.push(Node::text("likes", format!("Likes: {}", c.likes.len())));

    if t.replying_to == Some(c.id) && !locked {
        children.push(Node::group(
            "reply-box",
            vec![
                Node::TextArea {
                    field: Field::Comment(Some(c.id)),
                    placeholder: "Write a reply...",
                },
                Node::button(
                    "Post Reply",
                    Action::PostComment {
                        thread,
                        parent: Some(c.id),
                    },
                ),
                Node::button("Cancel", Action::ToggleReply(c.id)),
            ],
        ));
    }
    if t.editing == Some(c.id) {
        children.push(Node::group(
            "edit-box",
            vec![
                Node::TextArea {
                    field: Field::CommentEdit(c.id),
                    placeholder: "",
                },
                Node::button(
                    "Save",
                    Action::SaveComment {
                        thread,
                        comment: c.id,
                    },
                ),
                Node::button("Cancel", Action::ToggleEditComment(c.id)),
            ],
        ));
    }

    Node::Group {
        class: "comment",
        indent: depth,
        children,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        api::{CommentId, Role, UserId},
        view::threads::tests::{now, sample_thread, session, thread_screen},
        CommentTree, SiblingOrder,
    };

    fn comment(id: u64, parent: Option<u64>, creator: u64, mins_ago: i64) -> Comment {
        Comment {
            id: CommentId(id),
            thread_id: sample_thread(1, 2).id,
            parent_comment_id: parent.map(CommentId),
            creator_id: UserId(creator),
            content: format!("comment {id}"),
            created_at: now() - Duration::minutes(mins_ago),
            likes: Vec::new(),
        }
    }

    fn screen() -> ThreadScreen {
        let mut t = thread_screen(sample_thread(1, 2));
        t.comments = CommentTree::build(
            &[comment(1, None, 2, 10), comment(2, Some(1), 3, 5)],
            SiblingOrder::Stacked,
        );
        t.names.insert(UserId(3), String::from("Grace"));
        t
    }

    fn indents(node: &Node) -> Vec<usize> {
        node.children()
            .iter()
            .filter_map(|n| match n {
                Node::Group {
                    class: "comment",
                    indent,
                    ..
                } => Some(*indent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn entries_are_indented_by_depth() {
        let node = list(&screen(), Some(&session(3, Role::User)), now());
        assert_eq!(indents(&node), vec![0, 1]);
        assert!(node.contains_text("10 minutes ago"));
        assert!(node.contains_text("Grace"));
        assert!(!node.contains_text("No comments yet."));
    }

    #[test]
    fn only_own_comments_are_editable() {
        let node = list(&screen(), Some(&session(3, Role::User)), now());
        let actions = node.actions();
        assert!(actions.contains(&Action::ToggleEditComment(CommentId(2))));
        assert!(!actions.contains(&Action::ToggleEditComment(CommentId(1))));
        assert!(actions.contains(&Action::ToggleReply(CommentId(1))));
    }

    #[test]
    fn open_boxes() {
        let mut t = screen();
        t.replying_to = Some(CommentId(1));
        t.editing = Some(CommentId(2));
        let node = list(&t, Some(&session(3, Role::User)), now());
        let fields = node.fields();
        assert!(fields.contains(&Field::Comment(Some(CommentId(1)))));
        assert!(fields.contains(&Field::CommentEdit(CommentId(2))));

        t.thread.lock = true;
        let node = list(&t, Some(&session(3, Role::User)), now());
        assert!(node.find_button("Reply").is_none());
        assert!(!node.fields().contains(&Field::Comment(Some(CommentId(1)))));
    }
}
