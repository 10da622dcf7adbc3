use crate::api::{CommentId, ThreadId, UserId};

/// Everything a user can ask for. Renderers attach these to buttons and
/// links; front-ends hand them to `Controller::dispatch`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    ShowLogin,
    ShowRegister,
    Login,
    Register,
    Logout,

    ShowDashboard,
    /// Leave the current screen for the one it was opened from
    Back,
    MoreThreads,

    ShowCreateThread,
    CreateThread,
    OpenThread(ThreadId),
    EditThread(ThreadId),
    SaveThread(ThreadId),
    DeleteThread(ThreadId),
    LikeThread {
        thread: ThreadId,
        like: bool,
    },
    WatchThread {
        thread: ThreadId,
        watch: bool,
    },

    /// Open or close the reply box under a comment
    ToggleReply(CommentId),
    /// Open or close the edit box of a comment
    ToggleEditComment(CommentId),
    PostComment {
        thread: ThreadId,
        parent: Option<CommentId>,
    },
    SaveComment {
        thread: ThreadId,
        comment: CommentId,
    },
    DeleteComment {
        thread: ThreadId,
        comment: CommentId,
    },
    LikeComment {
        thread: ThreadId,
        comment: CommentId,
        like: bool,
    },

    OpenProfile(UserId),
    ShowEditProfile,
    SaveProfile,
    SetRole(UserId),
}

impl Action {
    /// Question to ask the user before dispatching, if any
    pub fn confirmation(&self) -> Option<&'static str> {
        match self {
            Action::DeleteThread(_) => Some("Are you sure you want to delete this thread?"),
            Action::DeleteComment { .. } => Some("Are you sure you want to delete this comment?"),
            _ => None,
        }
    }

    /// Whether the action only changes local view state
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Action::ShowLogin
                | Action::ShowRegister
                | Action::ShowCreateThread
                | Action::ToggleReply(_)
                | Action::ToggleEditComment(_)
        )
    }
}
