pub mod controller;

pub use controller::{DisplayMode, FeedController, FeedState, FALLBACK_PAGE_LIMIT, LOAD_ERROR_MESSAGE};

pub mod prelude {
    pub use super::{DisplayMode, FeedController, FeedState};
    pub use nh_core::{EnrichedArticle, InferenceModel, NewsProvider, Result, Error};
}
