pub mod models;
pub mod sentiment;

pub use models::create_model;
pub use models::dummy::DummyModel;
pub use models::openrouter::OpenRouterModel;
pub use sentiment::parse_sentiment_reply;

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{DummyModel, OpenRouterModel};
    pub use nh_core::{InferenceModel, RawArticle, Result, Error, Sentiment, SentimentAnalysis};
}
