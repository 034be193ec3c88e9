use serde::Deserialize;
use tracing::{debug, warn};

use nh_core::{Sentiment, SentimentAnalysis};

/// Longest explanation kept when the reply has to be scanned as plain text.
pub const FALLBACK_EXPLANATION_CHARS: usize = 200;

#[derive(Deserialize)]
struct StructuredReply {
    sentiment: String,
    explanation: String,
}

/// Interprets a sentiment completion.
///
/// A well-formed `{"sentiment", "explanation"}` object is taken as is.
/// Anything else is scanned for "positive" / "negative", defaulting to
/// neutral, and its first 200 characters become the explanation.
pub fn parse_sentiment_reply(raw: &str) -> SentimentAnalysis {
    match serde_json::from_str::<StructuredReply>(raw.trim()) {
        Ok(reply) => match reply.sentiment.parse::<Sentiment>() {
            Ok(sentiment) => {
                return SentimentAnalysis {
                    sentiment,
                    explanation: reply.explanation,
                }
            }
            Err(e) => debug!("Structured sentiment reply rejected: {}", e),
        },
        Err(e) => debug!("Sentiment reply is not structured: {}", e),
    }

    warn!("Falling back to text scan for sentiment reply");
    SentimentAnalysis {
        sentiment: Sentiment::scan(raw),
        explanation: raw.chars().take(FALLBACK_EXPLANATION_CHARS).collect(),
    }
}
