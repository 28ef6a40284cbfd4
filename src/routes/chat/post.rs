use std::{error::Error, fmt::Debug};

use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ai_client::AiClient, analytics_client::AnalyticsClient, auth::extractors::IsOwner, utils::error_fmt_chain};

pub const UNKNOWN_QUESTION_MESSAGE: &str =
    "Sorry, I couldn't understand the question. Try asking about revenue or top products.";

#[derive(Deserialize, Debug)]
pub struct ChatRequest{
    pub question: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub take: Option<i64>
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChatResponse{
    pub answer: String,
    pub data: serde_json::Value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent{
    Revenue,
    TopProducts,
    Unknown
}

// Intent detection is a handful of substring checks over the lower-cased
// question, nothing fancier.
pub fn detect_intent(question: &str) -> Intent {
    let question = question.to_lowercase();

    if question.contains("revenue") || question.contains("sales") || question.contains("income") {
        return Intent::Revenue
    }

    if question.contains("top") && question.contains("product") {
        return Intent::TopProducts
    }

    Intent::Unknown
}

#[derive(Error)]
pub enum ChatError{
    #[error("{}", UNKNOWN_QUESTION_MESSAGE)]
    UnknownQuestion,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Failed to reach the analytics endpoint")]
    AnalyticsUnavailable(#[source] reqwest::Error),
    #[error("Failed to reach the text-generation service")]
    AiUnavailable(#[source] reqwest::Error)
}

impl Debug for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for ChatError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            ChatError::UnknownQuestion => {
                HttpResponse::BadRequest().body(format!("{}", self))
            },
            ChatError::MissingToken => {
                HttpResponse::Unauthorized().body(format!("{}", self))
            },
            // No fallback and no retry; a failed hop fails the request
            ChatError::AnalyticsUnavailable(_) | ChatError::AiUnavailable(_) => {
                HttpResponse::BadGateway().body(format!("{}", self))
            }
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, ChatError> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer"))
        .map(|token| token.trim().to_string())
        .ok_or(ChatError::MissingToken)
}

// The analytics call goes over the network with the caller's own token, so
// the aggregator re-applies every authorization rule itself.
#[tracing::instrument(
    "Answering analytics question",
    skip(req, analytics_client, ai_client)
)]
pub async fn post_chat(
    req: HttpRequest,
    form: web::Json<ChatRequest>,
    analytics_client: web::Data<AnalyticsClient>,
    ai_client: web::Data<AiClient>,
    _owner: IsOwner
) -> Result<HttpResponse, ChatError> {
    let intent = detect_intent(&form.question);

    if intent == Intent::Unknown {
        return Err(ChatError::UnknownQuestion)
    }

    let token = bearer_token(&req)?;

    let end = form.end.unwrap_or_else(Utc::now);
    let start = form.start.unwrap_or(end - Duration::days(7));
    let take = form.take.unwrap_or(5);

    let (sentence, data) = match intent {
        Intent::Revenue => {
            let revenue = analytics_client
                .get_revenue(&token, start, end)
                .await
                .map_err(ChatError::AnalyticsUnavailable)?;

            let sentence = format!(
                "Revenue from {} to {} is {:.0} {}.",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d"),
                revenue.total,
                revenue.currency
            );

            (sentence, serde_json::json!(revenue))
        },
        Intent::TopProducts => {
            let ranking = analytics_client
                .get_top_products(&token, start, end, take)
                .await
                .map_err(ChatError::AnalyticsUnavailable)?;

            let summary: Vec<String> = ranking
                .iter()
                .map(|product| format!("{} ({:.0})", product.name, product.revenue))
                .collect();

            let sentence = format!("Top {} products: {}.", take, summary.join(", "));

            (sentence, serde_json::json!(ranking))
        },
        Intent::Unknown => return Err(ChatError::UnknownQuestion)
    };

    let answer = ai_client
        .summarize(&sentence)
        .await
        .map_err(ChatError::AiUnavailable)?;

    Ok(HttpResponse::Ok().json(ChatResponse{ answer, data }))
}
