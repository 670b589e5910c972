//! HTTP ledger gateway handler
//!
//! Talks to a gateway that fronts the review contract:
//!
//! - `POST {endpoint}/reviews` with a camelCase `ReviewSubmission` body
//! - `GET {endpoint}/reviews/{productId}` returning an array of ledger records
//!
//! Contract encoding and transaction signing are the gateway's business.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use review_core::{
    LedgerError, LedgerReadEffects, LedgerReview, LedgerWriteEffects, ProductId, ReviewSubmission,
};
use std::time::Duration;
use tracing::{debug, warn};

/// Ledger handler backed by an HTTP gateway
#[derive(Debug, Clone)]
pub struct HttpLedgerHandler {
    client: Client,
    endpoint: Url,
}

impl HttpLedgerHandler {
    /// Create a handler for `endpoint`, bounding every request by `timeout`
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LedgerError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            LedgerError::unavailable(format!("invalid ledger endpoint {endpoint}: {e}"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(LedgerError::unavailable(format!(
                "ledger endpoint {endpoint} cannot carry a path"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// Gateway base URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn reviews_url(&self, product_id: Option<&ProductId>) -> Result<Url, LedgerError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| LedgerError::unavailable("ledger endpoint cannot carry a path"))?;
            segments.pop_if_empty().push("reviews");
            if let Some(product_id) = product_id {
                segments.push(product_id.as_str());
            }
        }
        Ok(url)
    }
}

fn transport_error(err: reqwest::Error) -> LedgerError {
    if err.is_timeout() {
        LedgerError::unavailable(format!("ledger gateway timed out: {err}"))
    } else {
        LedgerError::unavailable(format!("ledger gateway unreachable: {err}"))
    }
}

async fn ensure_success(response: Response) -> Result<Response, LedgerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), body = %body, "ledger gateway rejected request");
    let message = if body.is_empty() {
        status.to_string()
    } else {
        body
    };
    Err(LedgerError::rejected(Some(status.as_u16()), message))
}

#[async_trait]
impl LedgerWriteEffects for HttpLedgerHandler {
    async fn add_review(&self, submission: &ReviewSubmission) -> Result<(), LedgerError> {
        let url = self.reviews_url(None)?;
        debug!(%url, product_id = %submission.product_id, "posting review to ledger gateway");
        let response = self
            .client
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerReadEffects for HttpLedgerHandler {
    async fn reviews_by_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<LedgerReview>, LedgerError> {
        let url = self.reviews_url(Some(product_id))?;
        debug!(%url, "querying ledger gateway");
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        let response = ensure_success(response).await?;
        response
            .json::<Vec<LedgerReview>>()
            .await
            .map_err(|e| LedgerError::malformed(format!("unexpected ledger payload: {e}")))
    }
}
