mod app;
pub use app::{App, AppMsg};

mod node;
pub use node::to_html;
