//! REST client for the Kalshi trade API

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::auth::KalshiAuth;
use super::messages::*;
use crate::common::errors::AdapterError;
use crate::common::traits::{AdapterResult, ExecutionAdapter};
use crate::common::types::{OrderAck, OrderIntent, Settlement};
use crate::config::KalshiConfig;

/// REST client for the Kalshi trade API
///
/// Portfolio endpoints require a [`KalshiAuth`]; calling them without one
/// fails with [`AdapterError::Authentication`] before any request is sent.
#[derive(Debug, Clone)]
pub struct KalshiRestClient {
    /// HTTP client
    client: Client,
    /// Base URL, e.g. `https://api.elections.kalshi.com/trade-api/v2`
    base_url: String,
    /// Path component of the base URL, prefixed to every signed path
    base_path: String,
    auth: Option<Arc<KalshiAuth>>,
}

impl KalshiRestClient {
    /// Create a new REST client (unauthenticated)
    pub fn new(base_url: &str) -> AdapterResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> AdapterResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| AdapterError::InvalidResponse(format!("Invalid base URL {}: {}", base_url, e)))?;
        let base_path = parsed.path().trim_end_matches('/').to_string();

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            base_path,
            auth: None,
        })
    }

    /// Build a signed client from configuration
    pub fn from_config(config: &KalshiConfig) -> AdapterResult<Self> {
        let (key_id, key_path) = match (&config.api_key_id, &config.private_key_path) {
            (Some(id), Some(path)) => (id, path),
            _ => {
                return Err(AdapterError::Authentication(
                    "KALSHI_API_KEY_ID and KALSHI_PRIVATE_KEY_PATH are required".to_string(),
                ))
            }
        };
        let auth = KalshiAuth::from_pem_file(key_id.clone(), key_path)?;
        Ok(Self::with_timeout(
            &config.rest_url,
            Duration::from_secs(config.request_timeout_seconds),
        )?
        .with_auth(auth))
    }

    /// Set credentials for authenticated requests
    pub fn with_auth(mut self, auth: KalshiAuth) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signed request for `path` (relative to the base URL, may carry a query)
    fn signed(&self, method: Method, path: &str) -> AdapterResult<RequestBuilder> {
        let auth = self.auth.as_ref().ok_or_else(|| {
            AdapterError::Authentication("Kalshi credentials are not configured".to_string())
        })?;
        let url = format!("{}{}", self.base_url, path);
        let headers = auth.sign_request(method.as_str(), &format!("{}{}", self.base_path, path));
        Ok(headers.apply_to_request(self.client.request(method, url)))
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> AdapterResult<T> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_seconds = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            warn!(?retry_after_seconds, "Kalshi rate limit hit");
            return Err(AdapterError::RateLimit { retry_after_seconds });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message.or(e.error.code))
                .unwrap_or(body);
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    // ========================================================================
    // Portfolio Endpoints (Authentication Required)
    // ========================================================================

    /// Submit an order
    #[instrument(skip(self, request), fields(ticker = %request.ticker, count = request.count))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> AdapterResult<KalshiOrder> {
        let response = self
            .signed(Method::POST, "/portfolio/orders")?
            .json(request)
            .send()
            .await?;
        let created: CreateOrderResponse = Self::handle_response(response).await?;
        debug!(order_id = %created.order.order_id, status = %created.order.status, "order created");
        Ok(created.order)
    }

    /// Positions in every market of an event
    #[instrument(skip(self))]
    pub async fn get_positions(&self, event_ticker: &str) -> AdapterResult<PositionsResponse> {
        let path = format!("/portfolio/positions?event_ticker={}", event_ticker);
        let response = self.signed(Method::GET, &path)?.send().await?;
        Self::handle_response(response).await
    }

    /// Orders still resting on the book for an event
    #[instrument(skip(self))]
    pub async fn get_resting_orders(&self, event_ticker: &str) -> AdapterResult<Vec<KalshiOrder>> {
        let path = format!("/portfolio/orders?event_ticker={}&status=resting", event_ticker);
        let response = self.signed(Method::GET, &path)?.send().await?;
        let orders: OrdersResponse = Self::handle_response(response).await?;
        Ok(orders.orders)
    }

    /// Settled positions for an event
    #[instrument(skip(self))]
    pub async fn get_settlements(&self, event_ticker: &str) -> AdapterResult<SettlementsResponse> {
        let path = format!("/portfolio/settlements?event_ticker={}", event_ticker);
        let response = self.signed(Method::GET, &path)?.send().await?;
        Self::handle_response(response).await
    }

    /// Cancel a single resting order
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> AdapterResult<()> {
        if order_id.is_empty() || order_id.contains('/') {
            return Err(AdapterError::InvalidResponse(format!(
                "Invalid order id: {:?}",
                order_id
            )));
        }
        let path = format!("/portfolio/orders/{}", order_id);
        let response = self.signed(Method::DELETE, &path)?.send().await?;
        let _: serde_json::Value = Self::handle_response(response).await?;
        Ok(())
    }
}

fn client_order_id(intent: &OrderIntent) -> String {
    format!(
        "courtside-{}-{}-{:08x}",
        intent.ticker,
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

#[async_trait]
impl ExecutionAdapter for KalshiRestClient {
    async fn place_order(&self, intent: &OrderIntent) -> AdapterResult<OrderAck> {
        let request = CreateOrderRequest::from_intent(intent, client_order_id(intent));
        let order = self.create_order(&request).await?;
        let filled = order.filled();

        Ok(OrderAck {
            order_id: Some(order.order_id.clone()),
            status: order.order_status(),
            filled_contracts: filled,
            avg_fill_price_cents: if filled > 0 {
                order.side_price().or(Some(intent.limit_price_cents))
            } else {
                None
            },
            submitted_at: Utc::now(),
        })
    }

    async fn get_position(&self, game_id: &str) -> AdapterResult<u32> {
        let held = self.get_positions(game_id).await?.total_contracts();
        let resting: u32 = self
            .get_resting_orders(game_id)
            .await?
            .iter()
            .map(KalshiOrder::resting_contracts)
            .sum();
        debug!(%game_id, held, resting, "position");
        Ok(held.saturating_add(resting))
    }

    async fn settlement(&self, game_id: &str) -> AdapterResult<Option<Settlement>> {
        let settled = self.get_settlements(game_id).await?;
        Ok(settled.totals().map(|(cost, payout)| Settlement {
            game_id: game_id.to_string(),
            cost,
            payout,
        }))
    }

    async fn cancel_open_orders(&self, game_id: &str) -> AdapterResult<usize> {
        let orders = self.get_resting_orders(game_id).await?;
        let mut cancelled = 0;
        for order in &orders {
            self.cancel_order(&order.order_id).await?;
            cancelled += 1;
        }
        Ok(cancelled)
    }

    fn name(&self) -> &'static str {
        "kalshi"
    }
}
