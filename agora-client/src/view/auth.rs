use super::{Field, InputKind, Node};
use crate::Action;

pub fn login() -> Node {
    Node::group(
        "login",
        vec![
            Node::heading(2, "Login"),
            Node::input(Field::Email, "Email", InputKind::Email),
            Node::input(Field::Password, "Password", InputKind::Password),
            Node::button("Login", Action::Login),
            Node::button("Register", Action::ShowRegister),
        ],
    )
}

pub fn register() -> Node {
    Node::group(
        "register",
        vec![
            Node::heading(2, "Register"),
            Node::input(Field::Email, "Email", InputKind::Email),
            Node::input(Field::Name, "Name", InputKind::Text),
            Node::input(Field::Password, "Password", InputKind::Password),
            Node::input(
                Field::ConfirmPassword,
                "Confirm Password",
                InputKind::Password,
            ),
            Node::button("Register", Action::Register),
            Node::button("Back to Login", Action::ShowLogin),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_has_every_field() {
        assert_eq!(
            register().fields(),
            vec![
                Field::Email,
                Field::Name,
                Field::Password,
                Field::ConfirmPassword
            ]
        );
        assert_eq!(
            login().actions(),
            vec![Action::Login, Action::ShowRegister]
        );
    }
}
