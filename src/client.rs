use log::{debug, error, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::segment::{SegmentationRequest, SegmentationResponse};

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ModelStatus {
    pub loaded: bool,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub can_reload: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
struct ReloadReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the remote segmentation model.
///
/// At most one segmentation request is in flight per client; a call made
/// while another is pending fails with [`Error::Busy`] and sends nothing.
pub struct SegmentationClient {
    client: Client,
    endpoint: String,
    in_flight: AtomicBool,
}

struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SegmentationClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<FlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                warn!("Segmentation request rejected, another one is pending");
                Error::Busy
            })?;
        Ok(FlightGuard(&self.in_flight))
    }

    pub async fn segment(&self, request: &SegmentationRequest) -> Result<SegmentationResponse> {
        let _guard = self.begin()?;

        let url = format!("{}/run_segmentation", self.endpoint);
        info!(
            "Sending segmentation request to {} ({} positive, {} negative points, box: {})",
            url,
            request.positive_points.len(),
            request.negative_points.len(),
            request.bbox.is_some()
        );

        let res = self.client.post(url).json(request).send().await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            error!("Server returned {}: {}", status, text);
            // Failed predictions still carry `{"success": false, "error": ...}`
            if let Ok(SegmentationResponse {
                success: false,
                error: Some(message),
                ..
            }) = serde_json::from_str::<SegmentationResponse>(&text)
            {
                return Err(Error::Service(message));
            }
            return Err(Error::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let response: SegmentationResponse = serde_json::from_str(&text)?;
        if !response.success {
            return Err(Error::Service(
                response.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        debug!(
            "Received {} masks, scores {:?}",
            response.all_masks.len(),
            response.all_scores
        );
        Ok(response)
    }

    pub async fn model_status(&self) -> Result<ModelStatus> {
        let url = format!("{}/model_status", self.endpoint);
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: res.text().await?,
            });
        }

        let model_status: ModelStatus = res.json().await?;
        info!("Model status: {:?}", model_status);
        Ok(model_status)
    }

    /// Ask the service to load its model again, e.g. after `can_reload`.
    pub async fn reload_model(&self) -> Result<()> {
        let url = format!("{}/reload_model", self.endpoint);
        info!("Requesting model reload from {}", url);

        let res = self.client.post(url).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: ReloadReply = serde_json::from_str(&text)?;
        if !reply.success {
            let message = reply.error.unwrap_or_else(|| "Unknown error".to_string());
            error!("Failed to load model: {}", message);
            return Err(Error::Service(message));
        }

        info!("Model loaded successfully");
        Ok(())
    }
}
