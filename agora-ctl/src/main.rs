use std::path::PathBuf;

use agora_client::{
    api::{Comment, CommentId, Role, ThreadId, UserId},
    view::{self, Field},
    Action, CommentTree, Config, Controller, Navigator, NoticeKind, Outcome, ReqwestBackend,
    Screen, SessionManager, SiblingOrder,
};
use anyhow::Context;

mod render;
mod store;

use store::FileStore;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the forum backend
    #[structopt(short, long, env = "AGORA_HOST", default_value = "http://localhost:5005")]
    host: String,

    /// Where the session is kept between invocations
    #[structopt(
        long,
        env = "AGORA_SESSION_FILE",
        default_value = ".agora-session.json",
        parse(from_os_str)
    )]
    session_file: PathBuf,

    /// Number of threads per dashboard page
    #[structopt(long, env = "AGORA_PAGE_SIZE", default_value = "10")]
    page_size: usize,

    /// Either `stacked` or `chronological`
    #[structopt(long, env = "AGORA_COMMENT_ORDER", default_value = "stacked")]
    comment_order: SiblingOrder,

    /// Do not ask before deleting things
    #[structopt(short, long)]
    yes: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Lay out a JSON list of comments as a thread would, without any
    /// network access
    Tree {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },

    #[structopt(flatten)]
    Forum(ForumCommand),
}

/// Commands that talk to the backend
#[derive(structopt::StructOpt)]
enum ForumCommand {
    /// Log in and remember the session
    Login { email: String, password: String },

    /// Create an account and log into it
    Register {
        email: String,
        name: String,
        password: String,
    },

    /// Forget the session
    Logout,

    /// List the most recent threads
    Threads {
        /// Number of pages to fetch
        #[structopt(long, default_value = "1")]
        pages: usize,
    },

    /// Show a thread and its comments
    Thread { id: u64 },

    CreateThread {
        title: String,
        content: String,

        #[structopt(long)]
        public: bool,
    },

    /// Change a thread. Unset fields keep their current value.
    EditThread {
        id: u64,

        #[structopt(long)]
        title: Option<String>,

        #[structopt(long)]
        content: Option<String>,

        #[structopt(long)]
        public: Option<bool>,

        #[structopt(long)]
        lock: Option<bool>,
    },

    DeleteThread { id: u64 },

    Like {
        id: u64,

        #[structopt(long)]
        undo: bool,
    },

    Watch {
        id: u64,

        #[structopt(long)]
        undo: bool,
    },

    /// Comment on a thread, or reply to a comment with --parent
    Comment {
        thread: u64,
        content: String,

        #[structopt(long)]
        parent: Option<u64>,
    },

    EditComment {
        thread: u64,
        comment: u64,
        content: String,
    },

    DeleteComment { thread: u64, comment: u64 },

    LikeComment {
        thread: u64,
        comment: u64,

        #[structopt(long)]
        undo: bool,
    },

    /// Show a user's profile, defaults to one's own
    Profile { user: Option<u64> },

    /// Change one's own profile. Unset fields are left alone.
    UpdateProfile {
        #[structopt(long)]
        email: Option<String>,

        #[structopt(long)]
        name: Option<String>,

        #[structopt(long)]
        password: Option<String>,

        /// Image file to use as avatar
        #[structopt(long, parse(from_os_str))]
        image: Option<PathBuf>,
    },

    /// Make a user admin or not (admins only)
    SetRole { user: u64, role: Role },
}

struct Cli {
    controller: Controller<ReqwestBackend, FileStore>,
    nav: Navigator,
    yes: bool,
}

impl Cli {
    fn fill(&mut self, field: Field, value: impl Into<String>) {
        self.nav.form_mut().set(field, value);
    }

    async fn act(&mut self, action: Action) -> anyhow::Result<()> {
        if let Some(question) = action.confirmation() {
            if !self.yes {
                anyhow::bail!("{question} Pass --yes to confirm.");
            }
        }
        let ticket = self.nav.issue();
        let out = self
            .controller
            .dispatch(self.nav.screen(), action, self.nav.form())
            .await;
        let res = settle(&out);
        self.nav.apply(ticket, out);
        res
    }

    fn print(&self) {
        let session = self.controller.session();
        let node = view::render(self.nav.screen(), session.as_ref(), chrono::Utc::now());
        print!("{}", render::to_text(&node));
    }

    fn own_id(&self) -> anyhow::Result<UserId> {
        self.controller
            .session()
            .map(|s| s.user_id)
            .context("not logged in, run `agora-ctl login` first")
    }

    async fn run(&mut self, cmd: ForumCommand) -> anyhow::Result<()> {
        match cmd {
            ForumCommand::Login { email, password } => {
                self.fill(Field::Email, email);
                self.fill(Field::Password, password);
                self.act(Action::Login).await?;
            }
            ForumCommand::Register {
                email,
                name,
                password,
            } => {
                self.fill(Field::Email, email);
                self.fill(Field::Name, name);
                self.fill(Field::ConfirmPassword, password.clone());
                self.fill(Field::Password, password);
                self.act(Action::Register).await?;
            }
            ForumCommand::Logout => {
                self.act(Action::Logout).await?;
                return Ok(());
            }
            ForumCommand::Threads { pages } => {
                self.act(Action::ShowDashboard).await?;
                for _ in 1..pages {
                    match self.nav.screen() {
                        Screen::Dashboard(d) if d.has_more => {
                            self.act(Action::MoreThreads).await?
                        }
                        _ => break,
                    }
                }
            }
            ForumCommand::Thread { id } => self.act(Action::OpenThread(ThreadId(id))).await?,
            ForumCommand::CreateThread {
                title,
                content,
                public,
            } => {
                self.act(Action::ShowCreateThread).await?;
                self.fill(Field::Title, title);
                self.fill(Field::Content, content);
                self.nav.form_mut().set_flag(Field::Public, public);
                self.act(Action::CreateThread).await?;
            }
            ForumCommand::EditThread {
                id,
                title,
                content,
                public,
                lock,
            } => {
                let id = ThreadId(id);
                self.act(Action::EditThread(id)).await?;
                if let Some(title) = title {
                    self.fill(Field::Title, title);
                }
                if let Some(content) = content {
                    self.fill(Field::Content, content);
                }
                if let Some(public) = public {
                    self.nav.form_mut().set_flag(Field::Public, public);
                }
                if let Some(lock) = lock {
                    self.nav.form_mut().set_flag(Field::Locked, lock);
                }
                self.act(Action::SaveThread(id)).await?;
            }
            ForumCommand::DeleteThread { id } => {
                self.act(Action::DeleteThread(ThreadId(id))).await?
            }
            ForumCommand::Like { id, undo } => {
                self.act(Action::LikeThread {
                    thread: ThreadId(id),
                    like: !undo,
                })
                .await?
            }
            ForumCommand::Watch { id, undo } => {
                self.act(Action::WatchThread {
                    thread: ThreadId(id),
                    watch: !undo,
                })
                .await?
            }
            ForumCommand::Comment {
                thread,
                content,
                parent,
            } => {
                let parent = parent.map(CommentId);
                self.fill(Field::Comment(parent), content);
                self.act(Action::PostComment {
                    thread: ThreadId(thread),
                    parent,
                })
                .await?;
            }
            ForumCommand::EditComment {
                thread,
                comment,
                content,
            } => {
                let comment = CommentId(comment);
                self.fill(Field::CommentEdit(comment), content);
                self.act(Action::SaveComment {
                    thread: ThreadId(thread),
                    comment,
                })
                .await?;
            }
            ForumCommand::DeleteComment { thread, comment } => {
                self.act(Action::DeleteComment {
                    thread: ThreadId(thread),
                    comment: CommentId(comment),
                })
                .await?
            }
            ForumCommand::LikeComment {
                thread,
                comment,
                undo,
            } => {
                self.act(Action::LikeComment {
                    thread: ThreadId(thread),
                    comment: CommentId(comment),
                    like: !undo,
                })
                .await?
            }
            ForumCommand::Profile { user } => {
                let user = match user {
                    Some(u) => UserId(u),
                    None => self.own_id()?,
                };
                self.act(Action::OpenProfile(user)).await?;
            }
            ForumCommand::UpdateProfile {
                email,
                name,
                password,
                image,
            } => {
                self.act(Action::ShowEditProfile).await?;
                // Only what was asked for gets sent
                *self.nav.form_mut() = view::Form::new();
                for (field, value) in [
                    (Field::Email, email),
                    (Field::Name, name),
                    (Field::Password, password),
                ] {
                    if let Some(v) = value {
                        self.fill(field, v);
                    }
                }
                if let Some(path) = image {
                    self.fill(Field::Image, image_data_url(&path)?);
                }
                self.act(Action::SaveProfile).await?;
            }
            ForumCommand::SetRole { user, role } => {
                let user = UserId(user);
                self.act(Action::OpenProfile(user)).await?;
                self.fill(Field::Role, role.as_str());
                self.act(Action::SetRole(user)).await?;
            }
        }
        self.print();
        Ok(())
    }
}

/// Errors only fail the command when nothing could be shown. A screen that
/// loaded partially is still printed, with the error on stderr.
fn settle(out: &Outcome) -> anyhow::Result<()> {
    match &out.notice {
        Some(n) if n.kind == NoticeKind::Error && out.screen.is_none() => {
            anyhow::bail!("{}", n.message)
        }
        Some(n) => eprintln!("{}", n.message),
        None => (),
    }
    Ok(())
}

/// Reads an image file into a `data:` URL
fn image_data_url(path: &std::path::Path) -> anyhow::Result<String> {
    let data = std::fs::read(path).with_context(|| format!("reading image {path:?}"))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let mime = match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };
    Ok(format!("data:{mime};base64,{}", base64::encode(data)))
}

fn print_tree(file: &std::path::Path, order: SiblingOrder) -> anyhow::Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {file:?}"))?;
    let comments: Vec<Comment> =
        serde_json::from_slice(&data).with_context(|| format!("parsing comments from {file:?}"))?;
    print!("{}", render::tree_to_text(&CommentTree::build(&comments, order)));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let cmd = match opt.cmd {
        Command::Tree { file } => return print_tree(&file, opt.comment_order),
        Command::Forum(cmd) => cmd,
    };

    let config = Config {
        backend_url: opt.host,
        page_size: opt.page_size,
        comment_order: opt.comment_order,
    };
    let store = FileStore::open(&opt.session_file)?;
    let controller = Controller::new(
        ReqwestBackend::new(config.backend_url.clone()),
        SessionManager::new(store),
        config,
    );
    // Every command names its targets, so there is no need to load a landing
    // screen first
    let mut cli = Cli {
        controller,
        nav: Navigator::new(Screen::Login),
        yes: opt.yes,
    };
    cli.run(cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use agora_client::Notice;
    use structopt::StructOpt;

    #[test]
    fn partial_screens_are_not_failures() {
        let partial = Outcome::show(Screen::Login)
            .with_notice(Notice::error("Failed to load threads: db down"));
        assert!(settle(&partial).is_ok());

        let err = settle(&Outcome::error("Invalid email or password.")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");

        assert!(settle(&Outcome::success(Screen::Login, "Login successful!")).is_ok());
    }

    #[test]
    fn tree_is_told_apart_from_forum_commands() {
        let opt = Opt::from_iter_safe(["agora-ctl", "tree", "comments.json"]).unwrap();
        assert!(matches!(
            opt.cmd,
            Command::Tree { file } if file == PathBuf::from("comments.json")
        ));

        let opt = Opt::from_iter_safe(["agora-ctl", "thread", "3"]).unwrap();
        assert!(matches!(opt.cmd, Command::Forum(ForumCommand::Thread { id: 3 })));
    }

    #[test]
    fn images_become_data_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.PNG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert_eq!(image_data_url(&path).unwrap(), "data:image/png;base64,AQID");
    }
}
