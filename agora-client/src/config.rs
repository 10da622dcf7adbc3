use crate::SiblingOrder;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5005";
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Base URL the REST paths get appended to
    pub backend_url: String,

    /// Number of threads fetched per dashboard page
    pub page_size: usize,

    pub comment_order: SiblingOrder,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            backend_url: String::from(DEFAULT_BACKEND_URL),
            page_size: DEFAULT_PAGE_SIZE,
            comment_order: SiblingOrder::default(),
        }
    }
}
