pub mod client;

pub use client::{NewsApiClient, SearchQuery};

pub mod prelude {
    pub use super::{NewsApiClient, SearchQuery};
    pub use nh_core::{HeadlineQuery, HeadlinesResponse, NewsProvider, RawArticle, Result, Error};
}
