use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Lesson, LessonId, Order},
    error::{ApiError, GatewayError},
    protocol::{AdjustSpacesRequest, OrderReceipt, SearchQuery},
};
use tracing::{debug, warn};

pub const LIST_FAILED: &str = "Failed to load lessons";
pub const SEARCH_FAILED: &str = "Failed to search lessons";
pub const ADJUST_FAILED: &str = "Failed to update lesson availability";
pub const ORDER_FAILED: &str = "Failed to submit order";

/// Remote catalog service. It owns the authoritative availability counts.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn list_lessons(&self) -> Result<Vec<Lesson>, GatewayError>;
    async fn search_lessons(&self, query: &str) -> Result<Vec<Lesson>, GatewayError>;
    async fn adjust_spaces(&self, lesson_id: &LessonId, delta: i32)
        -> Result<Lesson, GatewayError>;
    async fn submit_order(&self, order: &Order) -> Result<OrderReceipt, GatewayError>;
}

pub struct HttpCatalogGateway {
    http: Client,
    base_url: Url,
}

impl HttpCatalogGateway {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str], fallback: &str) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport(fallback.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<Response, GatewayError> {
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "gateway: request failed");
            GatewayError::Transport(fallback.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ApiError>().await.ok();
        debug!(status = status.as_u16(), body = ?body, "gateway: non-success response");
        Err(GatewayError::rejected(status.as_u16(), body, fallback))
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        fallback: &str,
    ) -> Result<T, GatewayError> {
        response.json::<T>().await.map_err(|err| {
            warn!(error = %err, "gateway: malformed response body");
            GatewayError::Transport(fallback.to_string())
        })
    }
}

#[async_trait]
impl CatalogGateway for HttpCatalogGateway {
    async fn list_lessons(&self) -> Result<Vec<Lesson>, GatewayError> {
        let url = self.endpoint(&["lessons"], LIST_FAILED)?;
        let response = self.send(self.http.get(url), LIST_FAILED).await?;
        Self::read_json(response, LIST_FAILED).await
    }

    async fn search_lessons(&self, query: &str) -> Result<Vec<Lesson>, GatewayError> {
        let url = self.endpoint(&["search"], SEARCH_FAILED)?;
        let request = self.http.get(url).query(&SearchQuery {
            q: query.to_string(),
        });
        let response = self.send(request, SEARCH_FAILED).await?;
        Self::read_json(response, SEARCH_FAILED).await
    }

    async fn adjust_spaces(
        &self,
        lesson_id: &LessonId,
        delta: i32,
    ) -> Result<Lesson, GatewayError> {
        let url = self.endpoint(&["lessons", lesson_id.0.as_str()], ADJUST_FAILED)?;
        let request = self.http.put(url).json(&AdjustSpacesRequest {
            spaces_delta: delta,
        });
        let response = self.send(request, ADJUST_FAILED).await?;
        Self::read_json(response, ADJUST_FAILED).await
    }

    async fn submit_order(&self, order: &Order) -> Result<OrderReceipt, GatewayError> {
        let url = self.endpoint(&["orders"], ORDER_FAILED)?;
        let response = self
            .send(self.http.post(url).json(order), ORDER_FAILED)
            .await?;
        let body = response.text().await.map_err(|err| {
            warn!(error = %err, "gateway: failed to read order response");
            GatewayError::Transport(ORDER_FAILED.to_string())
        })?;
        if body.trim().is_empty() {
            return Ok(OrderReceipt::default());
        }
        serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, "gateway: malformed order response");
            GatewayError::Transport(ORDER_FAILED.to_string())
        })
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
