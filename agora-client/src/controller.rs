use std::collections::{BTreeMap, BTreeSet};

use futures::future::join_all;

use crate::{
    api::{
        CommentId, CommentUpdate, Error, NewComment, NewSession, NewThread, NewUser, Role,
        Session, ThreadId, ThreadPage, ThreadUpdate, UserId, UserUpdate,
    },
    screen::{Dashboard, Profile, ThreadCard, ThreadScreen, UNKNOWN_USER},
    view::{Field, Form},
    Action, ApiClient, Backend, CommentTree, Config, Screen, SessionManager, SessionStore,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown above the current screen
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Notice {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Result of one action: the screen to switch to, if any, and the notice to
/// show
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Outcome {
    pub screen: Option<Screen>,
    pub notice: Option<Notice>,

    /// Whether the inputs already typed in should survive the screen change
    pub keep_form: bool,
}

impl Outcome {
    pub fn none() -> Outcome {
        Outcome::default()
    }

    pub fn show(screen: Screen) -> Outcome {
        Outcome {
            screen: Some(screen),
            ..Outcome::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Outcome {
        Outcome {
            notice: Some(Notice::error(message)),
            ..Outcome::default()
        }
    }

    pub fn success(screen: Screen, message: impl Into<String>) -> Outcome {
        Outcome::show(screen).with_notice(Notice::success(message))
    }

    pub fn with_notice(mut self, notice: Notice) -> Outcome {
        self.notice = Some(notice);
        self
    }

    fn or_notice(mut self, notice: Option<Notice>) -> Outcome {
        if self.notice.is_none() {
            self.notice = notice;
        }
        self
    }

    fn keeping_form(mut self) -> Outcome {
        self.keep_form = true;
        self
    }
}

fn failed(what: &str, err: Error) -> Outcome {
    tracing::error!(%err, "{what}");
    Outcome::error(format!("{what}: {err}"))
}

fn not_logged_in() -> Outcome {
    Outcome::show(Screen::Login).with_notice(Notice::error("Please log in first."))
}

/// Runs actions against the backend and tells what to display next
pub struct Controller<B, S> {
    api: ApiClient<B>,
    sessions: SessionManager<S>,
    config: Config,
}

impl<B: Clone, S> Clone for Controller<B, S> {
    fn clone(&self) -> Controller<B, S> {
        Controller {
            api: self.api.clone(),
            sessions: self.sessions.clone(),
            config: self.config.clone(),
        }
    }
}

impl<B, S> Controller<B, S>
where
    B: Backend + Clone,
    S: SessionStore,
{
    pub fn new(backend: B, sessions: SessionManager<S>, config: Config) -> Controller<B, S> {
        Controller {
            api: ApiClient::new(backend),
            sessions,
            config,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.current()
    }

    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn api(&self, session: Option<&Session>) -> ApiClient<B> {
        self.api.for_session(session)
    }

    /// Dashboard for a returning user, login form otherwise
    pub async fn initial_screen(&self) -> Outcome {
        match self.session() {
            Some(s) => self.dashboard(&s).await,
            None => Outcome::show(Screen::Login),
        }
    }

    pub async fn dispatch(&self, current: &Screen, action: Action, form: &Form) -> Outcome {
        tracing::debug!(?action, screen = current.name(), "dispatching action");
        let session = self.session();
        match action {
            Action::ShowLogin => Outcome::show(Screen::Login),
            Action::ShowRegister => Outcome::show(Screen::Register),
            Action::Login => self.login(form).await,
            Action::Register => self.register(form).await,
            Action::Logout => {
                self.sessions.clear();
                Outcome::show(Screen::Login)
            }
            action => match session {
                Some(s) => self.dispatch_authenticated(current, action, form, &s).await,
                None => not_logged_in(),
            },
        }
    }

    async fn dispatch_authenticated(
        &self,
        current: &Screen,
        action: Action,
        form: &Form,
        session: &Session,
    ) -> Outcome {
        match action {
            Action::ShowLogin
            | Action::ShowRegister
            | Action::Login
            | Action::Register
            | Action::Logout => Outcome::none(),
            Action::ShowDashboard => self.dashboard(session).await,
            Action::Back => self.back(current, session).await,
            Action::MoreThreads => match current {
                Screen::Dashboard(d) => self.more_threads(d, session).await,
                _ => self.dashboard(session).await,
            },
            Action::ShowCreateThread => Outcome::show(Screen::CreateThread),
            Action::CreateThread => self.create_thread(form, session).await,
            Action::OpenThread(id) => self.open_thread(id, session).await,
            Action::EditThread(id) => match self.api(Some(session)).get_thread(id).await {
                Ok(t) => Outcome::show(Screen::EditThread(t)),
                Err(e) => failed("Failed to load thread", e),
            },
            Action::SaveThread(id) => self.save_thread(id, form, session).await,
            Action::DeleteThread(id) => {
                match self.api(Some(session)).delete_thread(id).await {
                    Ok(()) => self.landing(session, "Thread deleted successfully!").await,
                    Err(e) => failed("Thread delete error", e),
                }
            }
            Action::LikeThread { thread, like } => {
                match self.api(Some(session)).like_thread(thread, like).await {
                    Ok(()) => self.open_thread(thread, session).await,
                    Err(e) => failed("Thread like/unlike error", e),
                }
            }
            Action::WatchThread { thread, watch } => {
                match self.api(Some(session)).watch_thread(thread, watch).await {
                    Ok(()) => self.open_thread(thread, session).await,
                    Err(e) => failed("Thread watch/unwatch error", e),
                }
            }
            Action::ToggleReply(c) => toggle(current, |t| {
                t.replying_to = match t.replying_to {
                    Some(open) if open == c => None,
                    _ => Some(c),
                };
            }),
            Action::ToggleEditComment(c) => toggle(current, |t| {
                t.editing = match t.editing {
                    Some(open) if open == c => None,
                    _ => Some(c),
                };
            }),
            Action::PostComment { thread, parent } => {
                self.post_comment(thread, parent, form, session).await
            }
            Action::SaveComment { thread, comment } => {
                let data = CommentUpdate {
                    id: comment,
                    content: form.text(Field::CommentEdit(comment)).to_string(),
                };
                if let Err(e) = data.validate() {
                    return Outcome::error(e.to_string());
                }
                match self.api(Some(session)).update_comment(&data).await {
                    Ok(()) => self
                        .open_thread(thread, session)
                        .await
                        .or_notice(Some(Notice::success("Comment updated successfully"))),
                    Err(e) => failed("Failed to edit comment", e),
                }
            }
            Action::DeleteComment { thread, comment } => {
                match self.api(Some(session)).delete_comment(comment).await {
                    Ok(()) => self
                        .open_thread(thread, session)
                        .await
                        .or_notice(Some(Notice::success("Comment deleted successfully"))),
                    Err(e) => failed("Failed to delete comment", e),
                }
            }
            Action::LikeComment {
                thread,
                comment,
                like,
            } => match self.api(Some(session)).like_comment(comment, like).await {
                Ok(()) => self.open_thread(thread, session).await,
                Err(e) => failed("Failed to like/unlike comment", e),
            },
            Action::OpenProfile(user) => self.open_profile(user, session).await,
            Action::ShowEditProfile => match current {
                Screen::Profile(p) if p.user.id == session.user_id => {
                    Outcome::show(Screen::EditProfile(p.user.clone()))
                }
                _ => match self.api(Some(session)).get_user(session.user_id).await {
                    Ok(u) => Outcome::show(Screen::EditProfile(u)),
                    Err(e) => failed("Failed to fetch user profile", e),
                },
            },
            Action::SaveProfile => self.save_profile(form, session).await,
            Action::SetRole(user) => self.set_role(user, form, session).await,
        }
    }

    async fn login(&self, form: &Form) -> Outcome {
        let data = NewSession {
            email: form.text(Field::Email).to_string(),
            password: form.text(Field::Password).to_string(),
        };
        if let Err(e) = data.validate() {
            return Outcome::error(e.to_string());
        }
        let resp = match self.api.login(&data).await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::error!(%err, "login failed");
                return Outcome::error("Invalid email or password.");
            }
        };
        match self.establish(resp.token, resp.user_id).await {
            Ok(s) => self.landing(&s, "Login successful!").await,
            Err(Error::Storage(msg)) => Outcome::error(msg),
            Err(err) => {
                tracing::error!(%err, "fetching user details after login failed");
                Outcome::error("Invalid email or password.")
            }
        }
    }

    async fn register(&self, form: &Form) -> Outcome {
        if form.text(Field::Password) != form.text(Field::ConfirmPassword) {
            return Outcome::error("Passwords do not match.");
        }
        let data = NewUser {
            email: form.text(Field::Email).to_string(),
            name: form.text(Field::Name).to_string(),
            password: form.text(Field::Password).to_string(),
        };
        if let Err(e) = data.validate() {
            return Outcome::error(e.to_string());
        }
        let res = match self.api.register(&data).await {
            Ok(resp) => self.establish(resp.token, resp.user_id).await,
            Err(e) => Err(e),
        };
        match res {
            Ok(s) => self.landing(&s, "Registration successful!").await,
            Err(e) => failed("Registration error", e),
        }
    }

    /// Looks up the role of a freshly authenticated user and stores the
    /// session. Nothing gets stored on failure.
    async fn establish(
        &self,
        token: crate::api::AuthToken,
        user_id: UserId,
    ) -> Result<Session, Error> {
        let user = self
            .api
            .with_token(Some(token.clone()))
            .get_user(user_id)
            .await?;
        let session = Session {
            token,
            user_id,
            role: Role::from_admin(user.admin),
        };
        self.sessions.set(&session)?;
        Ok(session)
    }

    async fn back(&self, current: &Screen, session: &Session) -> Outcome {
        match current {
            Screen::Login | Screen::Register => Outcome::show(Screen::Login),
            Screen::EditThread(t) => self.open_thread(t.id, session).await,
            Screen::EditProfile(u) => self.open_profile(u.id, session).await,
            Screen::Dashboard(_)
            | Screen::CreateThread
            | Screen::Thread(_)
            | Screen::Profile(_) => self.dashboard(session).await,
        }
    }

    async fn dashboard(&self, session: &Session) -> Outcome {
        let page = ThreadPage::first(self.config.page_size);
        match self.thread_cards(&page, session).await {
            Ok((cards, has_more)) => Outcome::show(Screen::Dashboard(Dashboard {
                cards,
                page,
                has_more,
            })),
            Err(e) => failed("Failed to load threads", e),
        }
    }

    /// Dashboard after a successful action. The dashboard is shown even if
    /// its threads fail to load.
    async fn landing(&self, session: &Session, message: &str) -> Outcome {
        let out = self.dashboard(session).await;
        match out.screen {
            Some(_) => out.or_notice(Some(Notice::success(message))),
            None => Outcome {
                screen: Some(Screen::Dashboard(Dashboard {
                    cards: Vec::new(),
                    page: ThreadPage::first(self.config.page_size),
                    has_more: false,
                })),
                ..out
            },
        }
    }

    async fn more_threads(&self, current: &Dashboard, session: &Session) -> Outcome {
        let page = current.page.next();
        match self.thread_cards(&page, session).await {
            Ok((cards, has_more)) => {
                let mut all = current.cards.clone();
                all.extend(cards);
                Outcome::show(Screen::Dashboard(Dashboard {
                    cards: all,
                    page,
                    has_more,
                }))
                .keeping_form()
            }
            Err(e) => failed("Failed to load threads", e),
        }
    }

    /// Fetches one page of threads. A thread whose details cannot be fetched
    /// gets a `Failed` card, the others are unaffected.
    async fn thread_cards(
        &self,
        page: &ThreadPage,
        session: &Session,
    ) -> Result<(Vec<ThreadCard>, bool), Error> {
        let api = self.api(Some(session));
        let ids = api.list_threads(page).await?;
        let has_more = page.limit > 0 && ids.len() == page.limit;
        let threads = join_all(ids.iter().map(|id| api.get_thread(*id))).await;
        let names = self
            .names(
                &api,
                threads.iter().filter_map(|t| t.as_ref().ok()).map(|t| t.creator_id),
            )
            .await;
        let cards = ids
            .into_iter()
            .zip(threads)
            .map(|(id, res)| match res {
                Ok(thread) => ThreadCard::Loaded {
                    author: name_in(&names, thread.creator_id),
                    thread,
                },
                Err(err) => {
                    tracing::warn!(%err, thread = %id, "failed loading thread details");
                    ThreadCard::Failed(id)
                }
            })
            .collect();
        Ok((cards, has_more))
    }

    /// Display names of `users`, `Unknown User` for failed lookups
    async fn names(
        &self,
        api: &ApiClient<B>,
        users: impl IntoIterator<Item = UserId>,
    ) -> BTreeMap<UserId, String> {
        let users = users.into_iter().collect::<BTreeSet<_>>();
        let names = join_all(users.iter().map(|u| async move {
            match api.get_user(*u).await {
                Ok(user) => user.display_name(),
                Err(err) => {
                    tracing::warn!(%err, user = %u, "failed resolving user name");
                    String::from(UNKNOWN_USER)
                }
            }
        }))
        .await;
        users.into_iter().zip(names).collect()
    }

    async fn open_thread(&self, id: ThreadId, session: &Session) -> Outcome {
        let api = self.api(Some(session));
        let thread = match api.get_thread(id).await {
            Ok(t) => t,
            Err(e) => return failed("Failed to load thread", e),
        };
        let (comments, notice) = match api.list_comments(id).await {
            Ok(c) => (c, None),
            Err(err) => {
                tracing::error!(%err, thread = %id, "failed loading comments");
                (
                    Vec::new(),
                    Some(Notice::error(format!("Failed to load comments: {err}"))),
                )
            }
        };
        let comments = CommentTree::build(&comments, self.config.comment_order);
        let names = self
            .names(
                &api,
                std::iter::once(thread.creator_id)
                    .chain(comments.entries.iter().map(|e| e.comment.creator_id)),
            )
            .await;
        Outcome::show(Screen::Thread(ThreadScreen {
            thread,
            comments,
            names,
            replying_to: None,
            editing: None,
        }))
        .or_notice(notice)
    }

    async fn create_thread(&self, form: &Form, session: &Session) -> Outcome {
        let data = NewThread {
            title: form.text(Field::Title).to_string(),
            is_public: form.flag(Field::Public),
            content: form.text(Field::Content).to_string(),
        };
        if let Err(e) = data.validate() {
            return Outcome::error(e.to_string());
        }
        match self.api(Some(session)).create_thread(&data).await {
            Ok(id) => self
                .open_thread(id, session)
                .await
                .or_notice(Some(Notice::success("Thread created successfully!"))),
            Err(e) => failed("Error creating thread", e),
        }
    }

    async fn save_thread(&self, id: ThreadId, form: &Form, session: &Session) -> Outcome {
        let data = ThreadUpdate {
            id,
            title: form.text(Field::Title).to_string(),
            content: form.text(Field::Content).to_string(),
            is_public: form.flag(Field::Public),
            lock: form.flag(Field::Locked),
        };
        if let Err(e) = data.validate() {
            return Outcome::error(e.to_string());
        }
        match self.api(Some(session)).update_thread(&data).await {
            Ok(()) => self
                .open_thread(id, session)
                .await
                .or_notice(Some(Notice::success("Thread updated successfully!"))),
            Err(e) => failed("Thread update error", e),
        }
    }

    async fn post_comment(
        &self,
        thread: ThreadId,
        parent: Option<CommentId>,
        form: &Form,
        session: &Session,
    ) -> Outcome {
        let data = NewComment {
            content: form.text(Field::Comment(parent)).to_string(),
            thread_id: thread,
            parent_comment_id: parent,
        };
        if let Err(e) = data.validate() {
            return Outcome::error(e.to_string());
        }
        match self.api(Some(session)).create_comment(&data).await {
            Ok(_) => self.open_thread(thread, session).await,
            Err(e) => failed("Failed to post comment", e),
        }
    }

    async fn open_profile(&self, user: UserId, session: &Session) -> Outcome {
        let api = self.api(Some(session));
        let user = match api.get_user(user).await {
            Ok(u) => u,
            Err(e) => return failed("Failed to fetch user profile", e),
        };
        let page = ThreadPage::first(self.config.page_size);
        let (threads, notice) = match api.list_threads(&page).await {
            Ok(ids) => {
                let threads = join_all(ids.iter().map(|id| api.get_thread(*id))).await;
                let threads = threads
                    .into_iter()
                    .filter_map(|t| t.ok())
                    .filter(|t| t.creator_id == user.id)
                    .collect();
                (threads, None)
            }
            Err(err) => {
                tracing::error!(%err, user = %user.id, "failed loading user threads");
                (
                    Vec::new(),
                    Some(Notice::error(format!("Failed to load user threads: {err}"))),
                )
            }
        };
        Outcome::show(Screen::Profile(Profile { user, threads })).or_notice(notice)
    }

    async fn save_profile(&self, form: &Form, session: &Session) -> Outcome {
        let data = UserUpdate {
            email: form.optional(Field::Email),
            name: form.optional(Field::Name),
            password: form.optional(Field::Password),
            image: form.optional(Field::Image),
        };
        match self.api(Some(session)).update_user(&data).await {
            Ok(()) => self
                .open_profile(session.user_id, session)
                .await
                .or_notice(Some(Notice::success("Profile updated successfully!"))),
            Err(e) => failed("Failed to update profile", e),
        }
    }

    async fn set_role(&self, user: UserId, form: &Form, session: &Session) -> Outcome {
        let role = match form.text(Field::Role).parse::<Role>() {
            Ok(r) => r,
            Err(e) => return failed("Failed to update user role", e),
        };
        match self
            .api(Some(session))
            .set_admin(user, role == Role::Admin)
            .await
        {
            Ok(()) => self
                .open_profile(user, session)
                .await
                .or_notice(Some(Notice::success("User role updated successfully!"))),
            Err(e) => failed("Failed to update user role", e),
        }
    }
}

/// Local change to the thread screen on display
fn toggle(current: &Screen, f: impl FnOnce(&mut ThreadScreen)) -> Outcome {
    match current {
        Screen::Thread(t) => {
            let mut t = t.clone();
            f(&mut t);
            Outcome::show(Screen::Thread(t)).keeping_form()
        }
        _ => Outcome::none(),
    }
}

fn name_in(names: &BTreeMap<UserId, String>, user: UserId) -> String {
    names
        .get(&user)
        .cloned()
        .unwrap_or_else(|| String::from(UNKNOWN_USER))
}
