use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ScanError;

pub struct VisionClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl VisionClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> reqwest::Result<VisionClient> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(VisionClient {
            client: builder.build()?,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> reqwest::Result<VisionClient> {
        VisionClient::new(config.endpoint.clone(), config.api_key.clone(), config.timeout)
    }

    /// Send one `images:annotate` request for the image at `image_path`.
    pub async fn annotate(&self, image_path: &Path) -> Result<Value, ScanError> {
        let image_bytes = tokio::fs::read(image_path).await.map_err(|source| {
            ScanError::ImageNotFound { path: image_path.to_path_buf(), source }
        })?;
        let api_key = self.api_key.as_deref().ok_or(ScanError::MissingApiKey)?;

        let request = annotate_request(&image_bytes);
        info!(
            "sending {} ({} bytes) to {}",
            image_path.display(),
            image_bytes.len(),
            self.endpoint
        );
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        let api_url = format!("{}{separator}key={api_key}", self.endpoint);
        let res = self.client.post(api_url)
            .json(&request)
            .send().await
            .map_err(ScanError::Request)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ScanError::Status { status, body });
        }
        let res_json: Value = res.json().await.map_err(ScanError::Decode)?;
        debug!("{}", serde_json::to_string_pretty(&res_json).unwrap_or_default());
        Ok(res_json)
    }
}

pub fn annotate_request(image_bytes: &[u8]) -> Value {
    json!({
        "requests": [
            {
                "image": {"content": BASE64.encode(image_bytes)},
                "features": [
                    {"type": "OBJECT_LOCALIZATION"},
                    {"type": "WEB_DETECTION"}
                ]
            }
        ]
    })
}
