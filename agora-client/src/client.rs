use serde::{de::DeserializeOwned, Serialize};

use crate::{
    api::{
        AuthResponse, AuthToken, Comment, CommentId, CommentUpdate, Error, NewComment,
        NewSession, NewThread, NewUser, Session, SetAdmin, Target, Thread, ThreadId, ThreadPage,
        ThreadUpdate, Toggle, User, UserId, UserUpdate,
    },
    http::{Backend, Method, Request},
};

/// Typed access to the forum REST API. Cheap to clone when the backend is;
/// carries the bearer token of at most one session.
#[derive(Clone, Debug)]
pub struct ApiClient<B> {
    backend: B,
    token: Option<AuthToken>,
}

impl<B: Backend> ApiClient<B> {
    pub fn new(backend: B) -> ApiClient<B> {
        ApiClient {
            backend,
            token: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn with_token(&self, token: Option<AuthToken>) -> ApiClient<B>
    where
        B: Clone,
    {
        ApiClient {
            backend: self.backend.clone(),
            token,
        }
    }

    pub fn for_session(&self, session: Option<&Session>) -> ApiClient<B>
    where
        B: Clone,
    {
        self.with_token(session.map(|s| s.token.clone()))
    }

    async fn call<R>(
        &self,
        method: Method,
        path: &'static str,
        query: Vec<(&'static str, String)>,
        body: Option<serde_json::Value>,
    ) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        tracing::debug!(%method, path, "sending api request");
        let resp = self
            .backend
            .send(Request {
                method,
                path,
                query,
                bearer: self.token.clone(),
                body,
            })
            .await
            .map_err(|err| {
                tracing::error!(?err, path, "api request did not go through");
                err
            })?;
        if !resp.status.is_success() {
            let err = Error::parse(resp.status, &resp.body);
            tracing::debug!(status = %resp.status, %err, path, "api request rejected");
            return Err(err);
        }
        let body: &[u8] = match resp.body.iter().all(u8::is_ascii_whitespace) {
            true => b"null",
            false => &resp.body,
        };
        serde_json::from_slice(body).map_err(|e| Error::Decode(format!("{path}: {e}")))
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &'static str,
        query: Vec<(&'static str, String)>,
    ) -> Result<R, Error> {
        self.call(Method::GET, path, query, None).await
    }

    async fn send<R: DeserializeOwned, T: Serialize>(
        &self,
        method: Method,
        path: &'static str,
        body: &T,
    ) -> Result<R, Error> {
        let body = serde_json::to_value(body)
            .map_err(|e| Error::Validation(format!("{path}: cannot encode request: {e}")))?;
        self.call(method, path, Vec::new(), Some(body)).await
    }

    /// For endpoints whose answer carries nothing we use
    async fn ack<T: Serialize>(
        &self,
        method: Method,
        path: &'static str,
        body: &T,
    ) -> Result<(), Error> {
        let _: serde::de::IgnoredAny = self.send(method, path, body).await?;
        Ok(())
    }

    pub async fn login(&self, data: &NewSession) -> Result<AuthResponse, Error> {
        self.send(Method::POST, "/auth/login", data).await
    }

    pub async fn register(&self, data: &NewUser) -> Result<AuthResponse, Error> {
        self.send(Method::POST, "/auth/register", data).await
    }

    pub async fn get_user(&self, user: UserId) -> Result<User, Error> {
        self.get("/user", vec![("userId", user.to_string())]).await
    }

    pub async fn update_user(&self, data: &UserUpdate) -> Result<(), Error> {
        self.ack(Method::PUT, "/user", data).await
    }

    pub async fn set_admin(&self, user: UserId, turnon: bool) -> Result<(), Error> {
        self.ack(
            Method::PUT,
            "/user/admin",
            &SetAdmin {
                user_id: user,
                turnon,
            },
        )
        .await
    }

    pub async fn create_thread(&self, data: &NewThread) -> Result<ThreadId, Error> {
        let created: Target<ThreadId> = self.send(Method::POST, "/thread", data).await?;
        Ok(created.id)
    }

    pub async fn get_thread(&self, thread: ThreadId) -> Result<Thread, Error> {
        self.get("/thread", vec![("id", thread.to_string())]).await
    }

    pub async fn list_threads(&self, page: &ThreadPage) -> Result<Vec<ThreadId>, Error> {
        self.get(
            "/threads",
            vec![
                ("start", page.start.to_string()),
                ("limit", page.limit.to_string()),
                ("sortBy", String::from(page.sort_by.as_str())),
            ],
        )
        .await
    }

    pub async fn update_thread(&self, data: &ThreadUpdate) -> Result<(), Error> {
        self.ack(Method::PUT, "/thread", data).await
    }

    pub async fn delete_thread(&self, thread: ThreadId) -> Result<(), Error> {
        self.ack(Method::DELETE, "/thread", &Target { id: thread })
            .await
    }

    pub async fn like_thread(&self, thread: ThreadId, turnon: bool) -> Result<(), Error> {
        self.ack(Method::PUT, "/thread/like", &Toggle { id: thread, turnon })
            .await
    }

    pub async fn watch_thread(&self, thread: ThreadId, turnon: bool) -> Result<(), Error> {
        self.ack(Method::PUT, "/thread/watch", &Toggle { id: thread, turnon })
            .await
    }

    pub async fn list_comments(&self, thread: ThreadId) -> Result<Vec<Comment>, Error> {
        self.get("/comments", vec![("threadId", thread.to_string())])
            .await
    }

    pub async fn create_comment(&self, data: &NewComment) -> Result<CommentId, Error> {
        let created: Target<CommentId> = self.send(Method::POST, "/comment", data).await?;
        Ok(created.id)
    }

    pub async fn update_comment(&self, data: &CommentUpdate) -> Result<(), Error> {
        self.ack(Method::PUT, "/comment", data).await
    }

    pub async fn delete_comment(&self, comment: CommentId) -> Result<(), Error> {
        self.ack(Method::DELETE, "/comment", &Target { id: comment })
            .await
    }

    pub async fn like_comment(&self, comment: CommentId, turnon: bool) -> Result<(), Error> {
        self.ack(Method::PUT, "/comment/like", &Toggle { id: comment, turnon })
            .await
    }
}
