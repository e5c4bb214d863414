use std::path::Path;

use tracing::error;

use super::client::VisionClient;
use super::detected_object::ScanOutcome;
use super::extract::extract;
use crate::error::ScanError;

/// Annotate one image and extract both channels. Faults never escape: every failure
/// path is logged and reported as [`ScanOutcome::failed`].
pub async fn scan(client: &VisionClient, image_path: &Path) -> ScanOutcome {
    match client.annotate(image_path).await {
        Ok(response) => extract(&response),
        Err(err) => {
            report(&err);
            ScanOutcome::failed()
        }
    }
}

fn report(err: &ScanError) {
    match err {
        ScanError::ImageNotFound { .. } => error!("{}", err),
        err if err.is_network() => error!("{}. Check the internet connection.", err),
        err => error!("{}", err),
    }
}
