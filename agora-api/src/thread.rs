use std::fmt;

use crate::{Error, Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    pub title: String,
    pub content: String,
    pub creator_id: UserId,
    pub is_public: bool,
    #[serde(default)]
    pub lock: bool,
    pub created_at: Time,
    #[serde(default)]
    pub updated_at: Option<Time>,
    #[serde(default)]
    pub likes: Vec<UserId>,
    #[serde(default)]
    pub watchees: Vec<UserId>,
}

impl Thread {
    pub fn is_liked_by(&self, user: UserId) -> bool {
        self.likes.contains(&user)
    }

    pub fn is_watched_by(&self, user: UserId) -> bool {
        self.watchees.contains(&user)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThread {
    pub title: String,
    pub is_public: bool,
    pub content: String,
}

impl NewThread {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_required("Thread title", &self.title)?;
        crate::validate_required("Thread content", &self.content)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadUpdate {
    pub id: ThreadId,
    pub title: String,
    pub content: String,
    pub is_public: bool,
    pub lock: bool,
}

impl ThreadUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_required("Thread title", &self.title)?;
        crate::validate_required("Thread content", &self.content)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadSort {
    #[default]
    Recent,
}

impl ThreadSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadSort::Recent => "recent",
        }
    }
}

/// Query of `GET /threads`
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPage {
    pub start: usize,
    pub limit: usize,
    pub sort_by: ThreadSort,
}

impl ThreadPage {
    pub fn first(limit: usize) -> ThreadPage {
        ThreadPage {
            start: 0,
            limit,
            sort_by: ThreadSort::Recent,
        }
    }

    pub fn next(&self) -> ThreadPage {
        ThreadPage {
            start: self.start + self.limit,
            ..*self
        }
    }
}
