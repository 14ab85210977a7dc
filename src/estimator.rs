//! Claude-backed nutrition estimation for food names the store has never
//! seen. The estimator is an optional capability: any failure (missing
//! key, timeout, malformed output) is reported as an error the resolver
//! downgrades to "no estimate available".

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Request timeout for estimate calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ESTIMATE_MAX_TOKENS: u32 = 256;

#[derive(Debug, Error)]
pub enum EstimatorError {
    /// The configured API key was empty or whitespace-only.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Response did not match the four-field numeric contract.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Estimated nutrition per 100g. Calories are always present; the other
/// macros are whatever the model was willing to commit to.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionEstimate {
    pub calories_per_100g: f64,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fat_per_100g: Option<f64>,
}

/// External text-to-nutrition capability.
#[async_trait]
pub trait Estimator: Send + Sync {
    async fn estimate(&self, food_name: &str) -> Result<NutritionEstimate, EstimatorError>;
}

/// Claude API estimator.
pub struct ClaudeEstimator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl fmt::Debug for ClaudeEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeEstimator")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ClaudeEstimator {
    /// Creates an estimator with the given API key and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, EstimatorError> {
        let api_key = api_key.into();

        if api_key.trim().is_empty() {
            return Err(EstimatorError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(EstimatorError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            model: model.into(),
        })
    }
}

#[async_trait]
impl Estimator for ClaudeEstimator {
    async fn estimate(&self, food_name: &str) -> Result<NutritionEstimate, EstimatorError> {
        let request = MessageRequest {
            model: &self.model,
            max_tokens: ESTIMATE_MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: build_estimate_prompt(food_name),
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| EstimatorError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: MessageResponse = serde_json::from_str(&body)
            .map_err(|err| EstimatorError::InvalidResponse(err.to_string()))?;
        let text = extract_text(payload.content)?;
        parse_estimate(&text)
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

fn extract_text(blocks: Vec<ContentBlock>) -> Result<String, EstimatorError> {
    let mut pieces = Vec::new();
    for block in blocks {
        let ContentBlock::Text { text } = block;
        pieces.push(text);
    }
    if pieces.is_empty() {
        return Err(EstimatorError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(pieces.join("\n"))
}

fn parse_api_error(body: &str) -> Option<EstimatorError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| EstimatorError::Api {
            message: payload.error.message,
        })
}

fn build_estimate_prompt(food_name: &str) -> String {
    format!(
        "You are a nutrition expert. Return realistic nutrition values per 100g \
         for the food below, in strict JSON with exactly these keys:\n\
         {{\"calories_per_100g\": number, \"protein_per_100g\": number|null, \
         \"carbs_per_100g\": number|null, \"fat_per_100g\": number|null}}\n\n\
         Food: {food_name}\n\
         Return only JSON."
    )
}

/// Validates the model's output against the wire contract: a required
/// numeric calorie field and three nullable macro fields, all finite and
/// non-negative. Anything else is a failure, never a partial record.
fn parse_estimate(text: &str) -> Result<NutritionEstimate, EstimatorError> {
    #[derive(Deserialize)]
    struct Payload {
        calories_per_100g: f64,
        #[serde(default)]
        protein_per_100g: Option<f64>,
        #[serde(default)]
        carbs_per_100g: Option<f64>,
        #[serde(default)]
        fat_per_100g: Option<f64>,
    }

    let payload: Payload =
        serde_json::from_str(text).map_err(|err| EstimatorError::InvalidResponse(err.to_string()))?;

    let fields = [
        ("calories_per_100g", Some(payload.calories_per_100g)),
        ("protein_per_100g", payload.protein_per_100g),
        ("carbs_per_100g", payload.carbs_per_100g),
        ("fat_per_100g", payload.fat_per_100g),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(EstimatorError::InvalidResponse(format!(
                    "{key} must be a non-negative finite number, got {v}"
                )));
            }
        }
    }

    Ok(NutritionEstimate {
        calories_per_100g: payload.calories_per_100g,
        protein_per_100g: payload.protein_per_100g,
        carbs_per_100g: payload.carbs_per_100g,
        fat_per_100g: payload.fat_per_100g,
    })
}
