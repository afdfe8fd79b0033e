//! Rationale writer backed by an OpenAI-compatible chat completion endpoint.
//!
//! Any failure, including a missing API key, falls back to a fixed template so a
//! recommendation never fails because of the LLM.

use crate::error::RecommendationError;
use lvai_domain::config::AiConfig;
use lvai_domain::lottery::LotteryType;
use lvai_domain::strategy::Strategy;
use lvai_lottery::{NumberStatistics, sort_by_frequency};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const SUMMARY_SIZE: usize = 5;

/// What the analyst is asked to explain.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub lottery_type: LotteryType,
    pub strategy: Strategy,
    pub numbers: &'a [u8],
    pub special_number: Option<u8>,
    pub stats: &'a [NumberStatistics],
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Analyst {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl Analyst {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(config: &AiConfig) -> Result<Self, RecommendationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| RecommendationError::Ai {
                message: format!("Failed to create HTTP client: {err}").into(),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// A short rationale for the pick, from the LLM when possible.
    pub async fn explain(&self, request: &AnalysisRequest<'_>) -> String {
        if !self.is_enabled() {
            return template(request.lottery_type, request.strategy, request.numbers.len());
        }

        match self.complete(&prompt(request)).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, lottery_type = %request.lottery_type, "Analyst unavailable, using template");
                template(request.lottery_type, request.strategy, request.numbers.len())
            },
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, RecommendationError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [ChatMessage { role: "user", content: prompt }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| RecommendationError::Ai { message: err.to_string().into() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecommendationError::Ai { message: format!("completion returned {status}").into() });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|err| RecommendationError::Ai { message: err.to_string().into() })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| RecommendationError::Ai { message: "completion has no content".into() })?;

        debug!(chars = text.chars().count(), "Analyst replied");
        Ok(text)
    }
}

fn prompt(request: &AnalysisRequest<'_>) -> String {
    let rules = request.lottery_type.rules();
    let special = request.special_number.map_or_else(|| "none".to_owned(), |n| n.to_string());

    let summary = if request.stats.is_empty() {
        String::new()
    } else {
        let mut stats = request.stats.to_vec();
        sort_by_frequency(&mut stats);
        let hot: Vec<u8> = stats.iter().take(SUMMARY_SIZE).map(|s| s.number).collect();
        let cold: Vec<u8> =
            stats[stats.len().saturating_sub(SUMMARY_SIZE)..].iter().map(|s| s.number).collect();
        format!("hot numbers {hot:?}, cold numbers {cold:?}")
    };

    format!(
        "You are a lottery analyst. Write a short rationale (50 to 100 words) for the \
         recommended numbers below.\n\
         Lottery: {}\n\
         Numbers: {:?}\n\
         Special number: {special}\n\
         Strategy: {}\n\
         Statistics: {summary}\n\
         Reply in Traditional Chinese and explain why these numbers were chosen.",
        rules.name,
        request.numbers,
        request.strategy,
    )
}

/// Fallback rationale naming the strategy, the lottery and how many numbers were picked.
#[must_use]
pub fn template(lottery_type: LotteryType, strategy: Strategy, count: usize) -> String {
    format!(
        "This pick uses the {} strategy and selects {count} numbers from the {} draw history. \
         Please play responsibly. Good luck!",
        strategy.title(),
        lottery_type.rules().name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_names_strategy_lottery_and_count() {
        let text = template(LotteryType::PowerLottery, Strategy::Overdue, 6);
        assert!(text.contains("Overdue numbers"));
        assert!(text.contains("威力彩"));
        assert!(text.contains("6 numbers"));
    }

    #[test]
    fn prompt_summarises_the_pick() {
        let stats = lvai_lottery::rebuild(10, [(0, &[1u8, 2][..]), (0, &[1u8, 3][..])]);
        let request = AnalysisRequest {
            lottery_type: LotteryType::Daily539,
            strategy: Strategy::Hot,
            numbers: &[1, 2, 3, 4, 5],
            special_number: None,
            stats: &stats,
        };
        let text = prompt(&request);
        assert!(text.contains("今彩539"));
        assert!(text.contains("[1, 2, 3, 4, 5]"));
        assert!(text.contains("Special number: none"));
        assert!(text.contains("Strategy: hot"));
        assert!(text.contains("hot numbers [1, 2, 3, 4, 5]"));
    }

    #[test]
    fn blank_keys_disable_the_llm() {
        let config = AiConfig { api_key: Some("  ".to_owned()), ..AiConfig::default() };
        assert!(!Analyst::new(&config).unwrap().is_enabled());
    }
}
