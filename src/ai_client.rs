use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

// Client for the external text-generation service used by the chat
// endpoint. The service is a plain text-in / text-out JSON API.
#[derive(Clone)]
pub struct AiClient {
    http_client: Client,
    base_url: String,
    api_key: SecretString,
}

impl AiClient {
    #[tracing::instrument(
        "Requesting summary from text-generation service",
        skip(self, prompt)
    )]
    pub async fn summarize(&self, prompt: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}/v1/generate", self.base_url);
        let request_body = GenerateRequest { prompt };

        let response = self.http_client
            .post(url)
            .json(&request_body)
            .header("X-Api-Key", self.api_key.expose_secret())
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        Ok(response.text)
    }

    // create new ai client
    pub fn new(
        base_url: String,
        api_key: SecretString,
        timeout: u64,
    ) -> AiClient {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .unwrap();

        Self {
            http_client,
            base_url,
            api_key,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
}
