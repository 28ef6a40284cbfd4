use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;

use crate::db_interaction::TopProduct;
use crate::routes::analytics::RevenueResponse;

// Loop-back client the chat endpoint uses to query the analytics routes
// over HTTP, re-authenticating with the caller's own bearer token.
#[derive(Clone)]
pub struct AnalyticsClient {
    http_client: Client,
    base_url: String,
}

impl AnalyticsClient {
    #[tracing::instrument(
        "Requesting revenue aggregate",
        skip(self, bearer_token)
    )]
    pub async fn get_revenue(
        &self,
        bearer_token: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RevenueResponse, reqwest::Error> {
        let url = format!("{}/api/analytics/revenue", self.base_url);

        self.http_client
            .get(url)
            .bearer_auth(bearer_token)
            .query(&[
                ("start", start.to_rfc3339_opts(SecondsFormat::Micros, true)),
                ("end", end.to_rfc3339_opts(SecondsFormat::Micros, true)),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<RevenueResponse>()
            .await
    }

    #[tracing::instrument(
        "Requesting top products aggregate",
        skip(self, bearer_token)
    )]
    pub async fn get_top_products(
        &self,
        bearer_token: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        take: i64,
    ) -> Result<Vec<TopProduct>, reqwest::Error> {
        let url = format!("{}/api/analytics/top-products", self.base_url);

        self.http_client
            .get(url)
            .bearer_auth(bearer_token)
            .query(&[
                ("start", start.to_rfc3339_opts(SecondsFormat::Micros, true)),
                ("end", end.to_rfc3339_opts(SecondsFormat::Micros, true)),
                ("take", take.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<TopProduct>>()
            .await
    }

    // create new analytics client
    pub fn new(base_url: String, timeout: u64) -> AnalyticsClient {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .unwrap();

        Self {
            http_client,
            base_url,
        }
    }
}
