use super::{Field, InputKind, Node};
use crate::{
    api::{Session, Time, User},
    format::{time_since, yes_no},
    screen::Profile,
    Action,
};

pub fn profile(p: &Profile, session: Option<&Session>, now: Time) -> Node {
    let user = &p.user;
    let own = session.map_or(false, |s| s.user_id == user.id);
    let mut children = vec![match user.image() {
        Some(src) => Node::Image {
            src: String::from(src),
            alt: user.display_name(),
        },
        None => Node::text("image", "Image: null"),
    }];
    children.push(Node::heading(2, format!("{}'s Profile", user.display_name())));
    children.push(Node::text(
        "email",
        match user.email.trim().is_empty() {
            true => String::from("Email: null"),
            false => format!("Email: {}", user.email),
        },
    ));
    children.push(Node::text("admin", format!("Admin: {}", yes_no(user.admin))));

    let mut buttons = Vec::new();
    if session.map_or(false, |s| s.is_admin()) && !own {
        buttons.push(Node::Select {
            field: Field::Role,
            label: "Role",
            options: vec![("user", "User"), ("admin", "Admin")],
        });
        buttons.push(Node::button("Update", Action::SetRole(user.id)));
    }
    if own {
        buttons.push(Node::button("Update Profile", Action::ShowEditProfile));
    }
    buttons.push(Node::button("Back", Action::Back));
    children.push(Node::group("profile-actions", buttons));

    children.push(Node::heading(3, format!("{} Threads by User", p.threads.len())));
    children.extend(p.threads.iter().map(|t| {
        Node::group(
            "profile-thread",
            vec![
                Node::link(t.title.clone(), Action::OpenThread(t.id)),
                Node::text("time", time_since(t.created_at, now)),
            ],
        )
    }));
    Node::group("profile", children)
}

pub fn edit_profile(_user: &User) -> Node {
    Node::group(
        "edit-profile",
        vec![
            Node::heading(2, "Edit Profile"),
            Node::input(Field::Email, "Email", InputKind::Email),
            Node::input(Field::Name, "Name", InputKind::Text),
            Node::input(Field::Password, "Password", InputKind::Password),
            Node::input(Field::Image, "Image", InputKind::Text),
            Node::button("Save Changes", Action::SaveProfile),
            Node::button("Cancel", Action::Back),
        ],
    )
}
