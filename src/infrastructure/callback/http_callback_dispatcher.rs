use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{CallbackNotifier, DeliveryError};
use crate::domain::JobResult;

use super::CallbackPayload;

/// Single-attempt POST of a job result. Failures are reported, never retried.
pub struct HttpCallbackDispatcher {
    client: reqwest::Client,
}

impl HttpCallbackDispatcher {
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Unreachable {
                url: String::new(),
                reason: format!("client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CallbackNotifier for HttpCallbackDispatcher {
    async fn deliver(&self, callback_url: &str, result: &JobResult) -> Result<(), DeliveryError> {
        let payload = CallbackPayload::from(result);

        let response = self
            .client
            .post(callback_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::TimedOut {
                        url: callback_url.to_string(),
                    }
                } else {
                    DeliveryError::Unreachable {
                        url: callback_url.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                url: callback_url.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::info!(
            callback_url = %callback_url,
            result = %payload.result,
            "Callback delivered"
        );
        Ok(())
    }
}
