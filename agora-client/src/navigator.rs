use crate::{view::Form, Notice, Outcome, Screen};

/// Generation stamp of a dispatched action
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ticket(u64);

/// Holds what is currently on display, and makes sure only the outcome of
/// the latest dispatched action ever lands there.
#[derive(Clone, Debug)]
pub struct Navigator {
    screen: Screen,
    form: Form,
    notice: Option<Notice>,
    latest: u64,
}

impl Navigator {
    pub fn new(screen: Screen) -> Navigator {
        Navigator {
            form: screen.initial_form(),
            screen,
            notice: None,
            latest: 0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Stamps a new action, superseding all the ones in flight
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Returns whether the outcome got applied
    pub fn apply(&mut self, ticket: Ticket, outcome: Outcome) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                ?ticket,
                latest = self.latest,
                "dropping outcome of superseded action"
            );
            return false;
        }
        if let Some(screen) = outcome.screen {
            let initial = screen.initial_form();
            match outcome.keep_form {
                true => self.form.fill_missing(initial),
                false => self.form = initial,
            }
            self.screen = screen;
        }
        self.notice = outcome.notice;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Field;

    #[test]
    fn stale_outcomes_are_dropped() {
        let mut nav = Navigator::new(Screen::Login);
        let first = nav.issue();
        let second = nav.issue();
        assert!(!nav.apply(first, Outcome::show(Screen::Register)));
        assert_eq!(nav.screen(), &Screen::Login);
        assert!(nav.apply(second, Outcome::show(Screen::CreateThread)));
        assert_eq!(nav.screen(), &Screen::CreateThread);
    }

    #[test]
    fn errors_keep_screen_and_form() {
        let mut nav = Navigator::new(Screen::CreateThread);
        nav.form_mut().set(Field::Title, "draft");
        let t = nav.issue();
        assert!(nav.apply(t, Outcome::error("Error creating thread: boom")));
        assert_eq!(nav.screen(), &Screen::CreateThread);
        assert_eq!(nav.form().text(Field::Title), "draft");
        assert_eq!(
            nav.notice().map(|n| n.message.as_str()),
            Some("Error creating thread: boom")
        );
        nav.dismiss_notice();
        assert_eq!(nav.notice(), None);
    }

    #[test]
    fn new_screen_resets_form() {
        let mut nav = Navigator::new(Screen::Login);
        nav.form_mut().set(Field::Password, "secret");
        let t = nav.issue();
        nav.apply(t, Outcome::show(Screen::Register));
        assert_eq!(nav.form().text(Field::Password), "");
    }
}
