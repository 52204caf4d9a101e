use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    services::providers::TextGenerator,
};

/// Client for the Generative Language REST API
///
/// One endpoint only: `models/{model}:generateContent`. The response text is
/// free-form; interpreting it is the recommendation engine's problem.
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiProvider {
    /// Creates a new generation client with an explicit request timeout
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            model,
        })
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_url, self.model
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Text-generation request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Generation API returned status {}: {}",
                status, body
            )));
        }

        let payload: serde_json::Value = response.json().await?;

        // First candidate's concatenated text parts.
        let text = payload["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                AppError::ExternalApi("Generation response carried no text candidate".to_string())
            })?;

        tracing::debug!(chars = text.len(), "Generation call completed");

        Ok(text)
    }
}
