use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use agora_client::{
    api::{
        AuthResponse, AuthToken, Comment, CommentId, CommentUpdate, Error, NewComment,
        NewSession, NewThread, NewUser, SetAdmin, Target, Thread, ThreadId, ThreadPage,
        ThreadSort, ThreadUpdate, Time, Toggle, User, UserId, UserUpdate,
    },
    http::{Method, Request, Response, StatusCode},
    Backend,
};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

/// 2024-01-01T00:00:00Z
const EPOCH: i64 = 1_704_067_200;

/// In-memory forum backend. Every mutation advances a logical clock by one
/// minute, so timestamps are deterministic.
pub struct MockServer {
    users: BTreeMap<UserId, DbUser>,
    tokens: HashMap<AuthToken, UserId>,
    threads: BTreeMap<ThreadId, Thread>,
    comments: BTreeMap<CommentId, Comment>,
    next_id: u64,
    now: Time,
    num_requests: usize,
}

#[derive(Debug)]
struct DbUser {
    user: User,
    password: String,
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            tokens: HashMap::new(),
            threads: BTreeMap::new(),
            comments: BTreeMap::new(),
            next_id: 1,
            now: Utc
                .timestamp_opt(EPOCH, 0)
                .single()
                .expect("epoch is a valid timestamp"),
            num_requests: 0,
        }
    }

    /// Return the number of requests handled so far
    pub fn test_num_requests(&self) -> usize {
        self.num_requests
    }

    /// Return the current number of users
    pub fn test_num_users(&self) -> usize {
        self.users.len()
    }

    /// Return the current logical time
    pub fn test_now(&self) -> Time {
        self.now
    }

    /// Insert a comment as-is, skipping every check
    pub fn test_insert_comment(&mut self, c: Comment) {
        self.next_id = self.next_id.max(c.id.0 + 1);
        self.comments.insert(c.id, c);
    }

    fn tick(&mut self) -> (u64, Time) {
        let id = self.next_id;
        self.next_id += 1;
        self.now = self.now + Duration::minutes(1);
        (id, self.now)
    }

    fn issue_token(&mut self, user: UserId) -> AuthToken {
        let (id, _) = self.tick();
        let tok = AuthToken(format!("token-{}-{id}", user.0));
        self.tokens.insert(tok.clone(), user);
        tok
    }

    fn resolve(&self, tok: Option<&AuthToken>) -> Result<&User, Error> {
        tok.and_then(|t| self.tokens.get(t))
            .and_then(|u| self.users.get(u))
            .map(|u| &u.user)
            .ok_or_else(|| Error::rejected(StatusCode::FORBIDDEN, "Invalid token"))
    }

    fn check_modify(&self, tok: Option<&AuthToken>, creator: UserId) -> Result<(), Error> {
        let u = self.resolve(tok)?;
        if !u.admin && u.id != creator {
            return Err(Error::permission_denied());
        }
        Ok(())
    }

    fn thread(&self, id: ThreadId) -> Result<&Thread, Error> {
        self.threads
            .get(&id)
            .ok_or_else(|| Error::not_found("thread"))
    }

    fn thread_mut(&mut self, id: ThreadId) -> Result<&mut Thread, Error> {
        self.threads
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("thread"))
    }

    fn unlocked_thread(&self, id: ThreadId) -> Result<&Thread, Error> {
        let t = self.thread(id)?;
        if t.lock {
            return Err(Error::rejected(StatusCode::FORBIDDEN, "Thread is locked"));
        }
        Ok(t)
    }

    fn comment(&self, id: CommentId) -> Result<&Comment, Error> {
        self.comments
            .get(&id)
            .ok_or_else(|| Error::not_found("comment"))
    }

    pub fn register(&mut self, u: NewUser) -> Result<AuthResponse, Error> {
        u.validate()?;
        if self.users.values().any(|db| db.user.email == u.email) {
            return Err(Error::bad_request("Email address already taken"));
        }
        let (id, _) = self.tick();
        let id = UserId(id);
        let admin = self.users.is_empty();
        self.users.insert(
            id,
            DbUser {
                user: User {
                    id,
                    name: u.name,
                    email: u.email,
                    admin,
                    image: None,
                },
                password: u.password,
            },
        );
        let token = self.issue_token(id);
        Ok(AuthResponse { token, user_id: id })
    }

    pub fn login(&mut self, s: NewSession) -> Result<AuthResponse, Error> {
        s.validate()?;
        let user = self
            .users
            .values()
            .find(|u| u.user.email == s.email && u.password == s.password)
            .map(|u| u.user.id)
            .ok_or_else(|| Error::bad_request("Invalid email or password"))?;
        let token = self.issue_token(user);
        Ok(AuthResponse {
            token,
            user_id: user,
        })
    }

    pub fn get_user(&self, tok: Option<&AuthToken>, id: UserId) -> Result<User, Error> {
        self.resolve(tok)?;
        self.users
            .get(&id)
            .map(|u| u.user.clone())
            .ok_or_else(|| Error::not_found("user"))
    }

    pub fn update_user(&mut self, tok: Option<&AuthToken>, up: UserUpdate) -> Result<(), Error> {
        let me = self.resolve(tok)?.id;
        if let Some(email) = &up.email {
            if self
                .users
                .values()
                .any(|db| db.user.id != me && db.user.email == *email)
            {
                return Err(Error::bad_request("Email address already taken"));
            }
        }
        self.tick();
        let db = self
            .users
            .get_mut(&me)
            .ok_or_else(|| Error::not_found("user"))?;
        if let Some(email) = up.email {
            db.user.email = email;
        }
        if let Some(name) = up.name {
            db.user.name = name;
        }
        if let Some(password) = up.password {
            db.password = password;
        }
        if let Some(image) = up.image {
            db.user.image = Some(image);
        }
        Ok(())
    }

    pub fn set_admin(&mut self, tok: Option<&AuthToken>, s: SetAdmin) -> Result<(), Error> {
        if !self.resolve(tok)?.admin {
            return Err(Error::permission_denied());
        }
        self.tick();
        let db = self
            .users
            .get_mut(&s.user_id)
            .ok_or_else(|| Error::not_found("user"))?;
        db.user.admin = s.turnon;
        Ok(())
    }

    pub fn create_thread(
        &mut self,
        tok: Option<&AuthToken>,
        t: NewThread,
    ) -> Result<ThreadId, Error> {
        let creator = self.resolve(tok)?.id;
        t.validate()?;
        let (id, now) = self.tick();
        let id = ThreadId(id);
        self.threads.insert(
            id,
            Thread {
                id,
                title: t.title,
                content: t.content,
                creator_id: creator,
                is_public: t.is_public,
                lock: false,
                created_at: now,
                updated_at: None,
                likes: Vec::new(),
                watchees: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn get_thread(&self, tok: Option<&AuthToken>, id: ThreadId) -> Result<Thread, Error> {
        self.resolve(tok)?;
        self.thread(id).cloned()
    }

    /// Newest first
    pub fn list_threads(
        &self,
        tok: Option<&AuthToken>,
        page: ThreadPage,
    ) -> Result<Vec<ThreadId>, Error> {
        self.resolve(tok)?;
        let mut threads = self.threads.values().collect::<Vec<_>>();
        match page.sort_by {
            ThreadSort::Recent => {
                threads.sort_by_key(|t| std::cmp::Reverse((t.created_at, t.id)))
            }
        }
        Ok(threads
            .into_iter()
            .skip(page.start)
            .take(page.limit)
            .map(|t| t.id)
            .collect())
    }

    pub fn update_thread(&mut self, tok: Option<&AuthToken>, up: ThreadUpdate) -> Result<(), Error> {
        let creator = self.thread(up.id)?.creator_id;
        self.check_modify(tok, creator)?;
        up.validate()?;
        let (_, now) = self.tick();
        let t = self.thread_mut(up.id)?;
        t.title = up.title;
        t.content = up.content;
        t.is_public = up.is_public;
        t.lock = up.lock;
        t.updated_at = Some(now);
        Ok(())
    }

    pub fn delete_thread(&mut self, tok: Option<&AuthToken>, id: ThreadId) -> Result<(), Error> {
        let creator = self.thread(id)?.creator_id;
        self.check_modify(tok, creator)?;
        self.tick();
        self.threads.remove(&id);
        self.comments.retain(|_, c| c.thread_id != id);
        Ok(())
    }

    pub fn like_thread(
        &mut self,
        tok: Option<&AuthToken>,
        t: Toggle<ThreadId>,
    ) -> Result<(), Error> {
        let me = self.resolve(tok)?.id;
        self.unlocked_thread(t.id)?;
        self.tick();
        toggle(&mut self.thread_mut(t.id)?.likes, me, t.turnon);
        Ok(())
    }

    pub fn watch_thread(
        &mut self,
        tok: Option<&AuthToken>,
        t: Toggle<ThreadId>,
    ) -> Result<(), Error> {
        let me = self.resolve(tok)?.id;
        self.tick();
        toggle(&mut self.thread_mut(t.id)?.watchees, me, t.turnon);
        Ok(())
    }

    pub fn list_comments(
        &self,
        tok: Option<&AuthToken>,
        thread: ThreadId,
    ) -> Result<Vec<Comment>, Error> {
        self.resolve(tok)?;
        self.thread(thread)?;
        Ok(self
            .comments
            .values()
            .filter(|c| c.thread_id == thread)
            .cloned()
            .collect())
    }

    pub fn create_comment(
        &mut self,
        tok: Option<&AuthToken>,
        c: NewComment,
    ) -> Result<CommentId, Error> {
        let creator = self.resolve(tok)?.id;
        c.validate()?;
        self.unlocked_thread(c.thread_id)?;
        if let Some(parent) = c.parent_comment_id {
            if self.comment(parent)?.thread_id != c.thread_id {
                return Err(Error::bad_request("Parent comment is in another thread"));
            }
        }
        let (id, now) = self.tick();
        let id = CommentId(id);
        self.comments.insert(
            id,
            Comment {
                id,
                thread_id: c.thread_id,
                parent_comment_id: c.parent_comment_id,
                creator_id: creator,
                content: c.content,
                created_at: now,
                likes: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn update_comment(
        &mut self,
        tok: Option<&AuthToken>,
        up: CommentUpdate,
    ) -> Result<(), Error> {
        let c = self.comment(up.id)?;
        let creator = c.creator_id;
        self.unlocked_thread(c.thread_id)?;
        self.check_modify(tok, creator)?;
        up.validate()?;
        self.tick();
        if let Some(c) = self.comments.get_mut(&up.id) {
            c.content = up.content;
        }
        Ok(())
    }

    /// Also deletes all the replies below the comment
    pub fn delete_comment(&mut self, tok: Option<&AuthToken>, id: CommentId) -> Result<(), Error> {
        let creator = self.comment(id)?.creator_id;
        self.check_modify(tok, creator)?;
        self.tick();
        let mut doomed = vec![id];
        while let Some(d) = doomed.pop() {
            self.comments.remove(&d);
            doomed.extend(
                self.comments
                    .values()
                    .filter(|c| c.parent_comment_id == Some(d))
                    .map(|c| c.id),
            );
        }
        Ok(())
    }

    pub fn like_comment(
        &mut self,
        tok: Option<&AuthToken>,
        t: Toggle<CommentId>,
    ) -> Result<(), Error> {
        let me = self.resolve(tok)?.id;
        let thread = self.comment(t.id)?.thread_id;
        self.unlocked_thread(thread)?;
        self.tick();
        if let Some(c) = self.comments.get_mut(&t.id) {
            toggle(&mut c.likes, me, t.turnon);
        }
        Ok(())
    }

    /// Routes one REST request to the matching operation
    pub fn handle(&mut self, req: &Request) -> Result<Value, Error> {
        self.num_requests += 1;
        tracing::debug!(method = %req.method, path = req.path, "mock server got request");
        let tok = req.bearer.as_ref();
        match (&req.method, req.path) {
            (&Method::POST, "/auth/login") => reply(self.login(body(req)?)?),
            (&Method::POST, "/auth/register") => reply(self.register(body(req)?)?),
            (&Method::GET, "/user") => reply(self.get_user(tok, UserId(query(req, "userId")?))?),
            (&Method::PUT, "/user") => ack(self.update_user(tok, body(req)?)),
            (&Method::PUT, "/user/admin") => ack(self.set_admin(tok, body(req)?)),
            (&Method::POST, "/thread") => reply(Target {
                id: self.create_thread(tok, body(req)?)?,
            }),
            (&Method::GET, "/thread") => reply(self.get_thread(tok, ThreadId(query(req, "id")?))?),
            (&Method::GET, "/threads") => {
                let sort_by = match req.query_param("sortBy") {
                    None | Some("recent") => ThreadSort::Recent,
                    Some(s) => return Err(Error::bad_request(format!("unknown sort {s:?}"))),
                };
                let page = ThreadPage {
                    start: query(req, "start")? as usize,
                    limit: query(req, "limit")? as usize,
                    sort_by,
                };
                reply(self.list_threads(tok, page)?)
            }
            (&Method::PUT, "/thread") => ack(self.update_thread(tok, body(req)?)),
            (&Method::DELETE, "/thread") => {
                let t: Target<ThreadId> = body(req)?;
                ack(self.delete_thread(tok, t.id))
            }
            (&Method::PUT, "/thread/like") => ack(self.like_thread(tok, body(req)?)),
            (&Method::PUT, "/thread/watch") => ack(self.watch_thread(tok, body(req)?)),
            (&Method::GET, "/comments") => {
                reply(self.list_comments(tok, ThreadId(query(req, "threadId")?))?)
            }
            (&Method::POST, "/comment") => reply(Target {
                id: self.create_comment(tok, body(req)?)?,
            }),
            (&Method::PUT, "/comment") => ack(self.update_comment(tok, body(req)?)),
            (&Method::DELETE, "/comment") => {
                let t: Target<CommentId> = body(req)?;
                ack(self.delete_comment(tok, t.id))
            }
            (&Method::PUT, "/comment/like") => ack(self.like_comment(tok, body(req)?)),
            (m, p) => Err(Error::not_found(&format!("{m} {p}"))),
        }
    }
}

fn toggle(set: &mut Vec<UserId>, user: UserId, on: bool) {
    set.retain(|u| *u != user);
    if on {
        set.push(user);
    }
}

fn body<T: DeserializeOwned>(req: &Request) -> Result<T, Error> {
    let body = req
        .body
        .clone()
        .ok_or_else(|| Error::bad_request("missing request body"))?;
    serde_json::from_value(body).map_err(|e| Error::bad_request(format!("invalid body: {e}")))
}

fn query(req: &Request, name: &str) -> Result<u64, Error> {
    req.query_param(name)
        .ok_or_else(|| Error::bad_request(format!("missing query parameter {name}")))?
        .parse()
        .map_err(|_| Error::bad_request(format!("invalid query parameter {name}")))
}

fn reply<T: Serialize>(v: T) -> Result<Value, Error> {
    serde_json::to_value(v)
        .map_err(|e| Error::rejected(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

fn ack(res: Result<(), Error>) -> Result<Value, Error> {
    res.map(|()| json!({}))
}

/// [`Backend`] serving requests from a shared [`MockServer`]
#[derive(Clone)]
pub struct MockBackend {
    server: Arc<Mutex<MockServer>>,
    offline: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn new(server: MockServer) -> MockBackend {
        MockBackend {
            server: Arc::new(Mutex::new(server)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn server(&self) -> MutexGuard<'_, MockServer> {
        self.server.lock()
    }

    /// While offline, every request fails as if the network was down
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }
}

#[async_trait(?Send)]
impl Backend for MockBackend {
    async fn send(&self, req: Request) -> Result<Response, Error> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(Error::Transport(String::from("network unreachable")));
        }
        let res = self.server.lock().handle(&req);
        Ok(match res {
            Ok(v) => Response {
                status: StatusCode::OK,
                body: v.to_string().into_bytes(),
            },
            Err(e) => Response {
                status: e.status_code(),
                body: e.contents(),
            },
        })
    }
}
