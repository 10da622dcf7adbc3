use agora_client::{
    api::{CommentId, Role, ThreadId, UserId},
    view::{self, Field, Node},
    Action, Config, Controller, MemoryStore, Navigator, Screen, SessionManager, SessionStore,
    ThreadCard, ThreadScreen, KEY_ROLE, KEY_TOKEN, KEY_USER_ID,
};
use agora_mock_server::{MockBackend, MockServer};

struct Harness {
    backend: MockBackend,
    controller: Controller<MockBackend, MemoryStore>,
    nav: Navigator,
}

impl Harness {
    fn new() -> Harness {
        Harness::on(MockBackend::new(MockServer::new()))
    }

    /// Another client talking to the same server
    fn on(backend: MockBackend) -> Harness {
        let config = Config {
            page_size: 2,
            ..Config::default()
        };
        Harness {
            controller: Controller::new(
                backend.clone(),
                SessionManager::new(MemoryStore::new()),
                config,
            ),
            backend,
            nav: Navigator::new(Screen::Login),
        }
    }

    fn fill(&mut self, field: Field, value: &str) {
        self.nav.form_mut().set(field, value);
    }

    async fn act(&mut self, action: Action) -> bool {
        let ticket = self.nav.issue();
        let out = self
            .controller
            .dispatch(self.nav.screen(), action, self.nav.form())
            .await;
        self.nav.apply(ticket, out)
    }

    async fn register(&mut self, email: &str, name: &str) {
        self.act(Action::ShowRegister).await;
        self.fill(Field::Email, email);
        self.fill(Field::Name, name);
        self.fill(Field::Password, "pw");
        self.fill(Field::ConfirmPassword, "pw");
        self.act(Action::Register).await;
        assert_eq!(self.notice(), Some("Registration successful!"));
    }

    async fn create_thread(&mut self, title: &str) -> ThreadId {
        self.act(Action::ShowCreateThread).await;
        self.fill(Field::Title, title);
        self.fill(Field::Content, "Some content");
        self.nav.form_mut().set_flag(Field::Public, true);
        self.act(Action::CreateThread).await;
        assert_eq!(self.notice(), Some("Thread created successfully!"));
        self.thread().thread.id
    }

    async fn comment(&mut self, thread: ThreadId, parent: Option<CommentId>, text: &str) {
        if let Some(p) = parent {
            self.act(Action::ToggleReply(p)).await;
        }
        self.fill(Field::Comment(parent), text);
        self.act(Action::PostComment { thread, parent }).await;
    }

    fn notice(&self) -> Option<&str> {
        self.nav.notice().map(|n| n.message.as_str())
    }

    fn thread(&self) -> &ThreadScreen {
        match self.nav.screen() {
            Screen::Thread(t) => t,
            s => panic!("expected thread screen, got {s:?}"),
        }
    }

    fn view(&self) -> Node {
        let now = self.backend.server().test_now();
        view::render(self.nav.screen(), self.controller.session().as_ref(), now)
    }
}

#[tokio::test]
async fn session_lives_from_login_to_logout() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    assert!(matches!(h.nav.screen(), Screen::Dashboard(_)));
    let session = h.controller.session().unwrap();
    assert_eq!(session.role, Role::Admin);

    h.act(Action::Logout).await;
    assert_eq!(h.nav.screen(), &Screen::Login);
    assert_eq!(h.controller.session(), None);
    h.controller.sessions().with_store(|s| {
        for k in [KEY_TOKEN, KEY_USER_ID, KEY_ROLE] {
            assert_eq!(s.get(k), None, "{k} survived logout");
        }
    });

    h.fill(Field::Email, "ada@example.org");
    h.fill(Field::Password, "wrong");
    h.act(Action::Login).await;
    assert_eq!(h.notice(), Some("Invalid email or password."));
    assert_eq!(h.controller.session(), None);

    h.fill(Field::Password, "pw");
    h.act(Action::Login).await;
    assert_eq!(h.notice(), Some("Login successful!"));
    h.controller.sessions().with_store(|s| {
        assert!(s.get(KEY_TOKEN).is_some());
        assert_eq!(s.get(KEY_USER_ID), Some(session.user_id.to_string()));
        assert_eq!(s.get(KEY_ROLE).as_deref(), Some("admin"));
    });
}

#[tokio::test]
async fn password_mismatch_sends_nothing() {
    let mut h = Harness::new();
    h.act(Action::ShowRegister).await;
    h.fill(Field::Email, "ada@example.org");
    h.fill(Field::Password, "one");
    h.fill(Field::ConfirmPassword, "two");
    h.act(Action::Register).await;
    assert_eq!(h.notice(), Some("Passwords do not match."));
    assert_eq!(h.nav.screen(), &Screen::Register);
    assert_eq!(h.backend.server().test_num_requests(), 0);
}

#[tokio::test]
async fn replies_nest_under_their_parent() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    let thread = h.create_thread("Hello").await;

    h.comment(thread, None, "first").await;
    let first = h.thread().comments.entries[0].comment.id;
    h.comment(thread, Some(first), "reply").await;
    h.comment(thread, None, "second").await;

    let shape = h
        .thread()
        .comments
        .entries
        .iter()
        .map(|e| (e.comment.content.as_str(), e.depth))
        .collect::<Vec<_>>();
    assert_eq!(shape, vec![("second", 0), ("first", 0), ("reply", 1)]);
    assert_eq!(h.thread().replying_to, None);
    assert!(h.view().contains_text("Ada"));
}

#[tokio::test]
async fn reply_box_keeps_typed_text() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    let thread = h.create_thread("Hello").await;
    h.comment(thread, None, "first").await;
    let first = h.thread().comments.entries[0].comment.id;

    h.fill(Field::Comment(None), "draft");
    h.act(Action::ToggleReply(first)).await;
    assert_eq!(h.thread().replying_to, Some(first));
    assert_eq!(h.nav.form().text(Field::Comment(None)), "draft");
    assert!(h.view().fields().contains(&Field::Comment(Some(first))));

    h.act(Action::ToggleEditComment(first)).await;
    assert_eq!(h.nav.form().text(Field::CommentEdit(first)), "first");
    h.fill(Field::CommentEdit(first), "edited");
    h.act(Action::SaveComment {
        thread,
        comment: first,
    })
    .await;
    assert_eq!(h.notice(), Some("Comment updated successfully"));
    assert_eq!(h.thread().comments.entries[0].comment.content, "edited");
}

#[tokio::test]
async fn locked_threads_take_no_comments() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    let thread = h.create_thread("Hello").await;
    h.comment(thread, None, "first").await;

    h.act(Action::EditThread(thread)).await;
    assert_eq!(h.nav.form().text(Field::Title), "Hello");
    h.nav.form_mut().set_flag(Field::Locked, true);
    h.act(Action::SaveThread(thread)).await;
    assert_eq!(h.notice(), Some("Thread updated successfully!"));
    assert!(h.thread().thread.lock);
    assert!(h.thread().thread.updated_at.is_some());

    let view = h.view();
    assert!(view.find_button("Post Comment").is_none());
    assert!(view.find_button("Reply").is_none());
    assert!(!view.actions().iter().any(|a| matches!(a, Action::LikeThread { .. })));
    assert!(view.contains_text("(Edited)"));

    h.fill(Field::Comment(None), "sneaky");
    h.act(Action::PostComment {
        thread,
        parent: None,
    })
    .await;
    assert_eq!(h.notice(), Some("Failed to post comment: Thread is locked"));
    assert_eq!(h.thread().comments.len(), 1);
}

#[tokio::test]
async fn only_creators_and_admins_get_controls() {
    let mut admin = Harness::new();
    admin.register("ada@example.org", "Ada").await;
    let mut bob = Harness::on(admin.backend.clone());
    bob.register("bob@example.org", "Bob").await;
    assert_eq!(bob.controller.session().unwrap().role, Role::User);

    let ada_thread = admin.create_thread("Ada's").await;
    let bob_thread = bob.create_thread("Bob's").await;

    bob.act(Action::OpenThread(ada_thread)).await;
    assert!(bob.view().find_button("Edit Thread").is_none());
    bob.act(Action::DeleteThread(ada_thread)).await;
    assert_eq!(
        bob.notice(),
        Some("Thread delete error: permission denied")
    );

    admin.act(Action::OpenThread(bob_thread)).await;
    assert!(admin.view().find_button("Delete Thread").is_some());
    admin.act(Action::DeleteThread(bob_thread)).await;
    assert_eq!(admin.notice(), Some("Thread deleted successfully!"));
    assert!(matches!(admin.nav.screen(), Screen::Dashboard(_)));
}

#[tokio::test]
async fn admins_change_roles() {
    let mut admin = Harness::new();
    admin.register("ada@example.org", "Ada").await;
    let mut bob = Harness::on(admin.backend.clone());
    bob.register("bob@example.org", "").await;
    let bob_id = bob.controller.session().unwrap().user_id;

    admin.act(Action::OpenProfile(bob_id)).await;
    let view = admin.view();
    assert!(view.contains_text(&format!("User {bob_id}'s Profile")));
    assert!(view.contains_text("Admin: No"));
    assert_eq!(admin.nav.form().text(Field::Role), "user");

    admin.fill(Field::Role, "admin");
    admin.act(Action::SetRole(bob_id)).await;
    assert_eq!(admin.notice(), Some("User role updated successfully!"));
    assert!(admin.view().contains_text("Admin: Yes"));

    bob.act(Action::OpenProfile(bob_id)).await;
    assert!(bob.view().find_button("Update Profile").is_some());
    bob.act(Action::ShowEditProfile).await;
    bob.fill(Field::Name, "Bob");
    bob.act(Action::SaveProfile).await;
    assert_eq!(bob.notice(), Some("Profile updated successfully!"));
    assert!(bob.view().contains_text("Bob's Profile"));
}

#[tokio::test]
async fn superseded_outcomes_are_dropped() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    let thread = h.create_thread("Hello").await;
    h.act(Action::ShowDashboard).await;

    let slow = h.nav.issue();
    let slow_out = h
        .controller
        .dispatch(h.nav.screen(), Action::OpenThread(thread), h.nav.form())
        .await;
    let fast = h.nav.issue();
    let fast_out = h
        .controller
        .dispatch(h.nav.screen(), Action::OpenProfile(UserId(1)), h.nav.form())
        .await;

    assert!(h.nav.apply(fast, fast_out));
    assert!(!h.nav.apply(slow, slow_out));
    assert!(matches!(h.nav.screen(), Screen::Profile(_)));
}

#[tokio::test]
async fn network_failures_leave_the_screen_alone() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    let thread = h.create_thread("Hello").await;
    let before = h.nav.screen().clone();

    h.backend.set_offline(true);
    h.act(Action::LikeThread { thread, like: true }).await;
    assert_eq!(
        h.notice(),
        Some("Thread like/unlike error: network unreachable")
    );
    assert_eq!(h.nav.screen(), &before);

    h.backend.set_offline(false);
    h.act(Action::LikeThread { thread, like: true }).await;
    assert_eq!(h.thread().thread.likes.len(), 1);
    assert!(h.view().find_button("Unlike").is_some());
}

#[tokio::test]
async fn dashboard_pages() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    for t in ["one", "two", "three"] {
        h.create_thread(t).await;
    }
    h.act(Action::ShowDashboard).await;
    let titles = |h: &Harness| match h.nav.screen() {
        Screen::Dashboard(d) => d
            .cards
            .iter()
            .map(|c| match c {
                ThreadCard::Loaded { thread, .. } => thread.title.clone(),
                ThreadCard::Failed(id) => format!("failed {id}"),
            })
            .collect::<Vec<_>>(),
        s => panic!("expected dashboard, got {s:?}"),
    };
    assert_eq!(titles(&h), vec!["three", "two"]);
    assert!(h.view().find_button("More").is_some());

    h.act(Action::MoreThreads).await;
    assert_eq!(titles(&h), vec!["three", "two", "one"]);
    assert!(h.view().find_button("More").is_none());
}

#[tokio::test]
async fn orphaned_comments_are_reported() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;
    let thread = h.create_thread("Hello").await;
    h.comment(thread, None, "root").await;
    let mut orphan = h.thread().comments.entries[0].comment.clone();
    orphan.id = CommentId(1000);
    orphan.parent_comment_id = Some(CommentId(999));
    orphan.content = String::from("lost");
    h.backend.server().test_insert_comment(orphan);

    h.act(Action::OpenThread(thread)).await;
    let t = h.thread();
    assert_eq!(t.comments.len(), 1);
    assert_eq!(t.comments.orphans.len(), 1);
    assert!(!h.view().contains_text("lost"));
}

#[tokio::test]
async fn returning_users_land_on_the_dashboard() {
    let mut h = Harness::new();
    h.register("ada@example.org", "Ada").await;

    let out = h.controller.initial_screen().await;
    assert!(matches!(out.screen, Some(Screen::Dashboard(_))));

    h.controller.sessions().clear();
    let out = h.controller.initial_screen().await;
    assert_eq!(out.screen, Some(Screen::Login));
}
