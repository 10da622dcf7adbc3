use std::fmt;

use crate::{Error, ThreadId, Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub thread_id: ThreadId,

    /// None for top-level comments
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,

    pub creator_id: UserId,
    pub content: String,
    pub created_at: Time,

    /// Users who liked this comment
    #[serde(default)]
    pub likes: Vec<UserId>,
}

impl Comment {
    pub fn is_liked_by(&self, user: UserId) -> bool {
        self.likes.contains(&user)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub thread_id: ThreadId,
    pub parent_comment_id: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_required("Comment", &self.content)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentUpdate {
    pub id: CommentId,
    pub content: String,
}

impl CommentUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_required("Comment", &self.content)
    }
}
