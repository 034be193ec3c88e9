use nh_core::{EnrichedArticle, HeadlinesResponse};
use nh_feed::DisplayMode;

pub fn enriched(article: &EnrichedArticle, mode: DisplayMode) -> String {
    let sentiment = article
        .sentiment
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unrated".to_string());
    let summary = article.summary.as_deref().unwrap_or("(no summary)");

    match mode {
        DisplayMode::Summarized => format!("• {} [{}]\n  {}", article.title, sentiment, summary),
        DisplayMode::Detailed => {
            let mut out = format!(
                "• {}\n  {} · {}\n  {}\n  Sentiment: {}",
                article.title,
                article.source,
                article.published_at.format("%Y-%m-%d %H:%M"),
                summary,
                sentiment
            );
            if let Some(explanation) = article.sentiment_explanation.as_deref().filter(|e| !e.is_empty()) {
                out.push_str(&format!(" ({})", explanation));
            }
            out.push_str(&format!("\n  {}", article.url));
            out
        }
    }
}

pub fn headlines(response: &HeadlinesResponse) -> String {
    let mut lines = Vec::with_capacity(response.articles.len() + 1);
    if let Some(error) = &response.error {
        lines.push(format!("⚠️ {}", error));
    }
    for article in &response.articles {
        lines.push(format!(
            "• {} ({}, {})\n  {}",
            article.title,
            article.source.name,
            article.published_at.format("%Y-%m-%d"),
            article.url
        ));
    }
    lines.join("\n")
}
