pub mod articles;
pub mod preferences;
pub mod proxy;

pub use articles::{list_saved, save_article, unsave_article};
pub use preferences::{get_preferences, set_preferences};
pub use proxy::{completion, completion_preflight, news, news_preflight};
