use tracing::{error, info};

use crate::config::Config;
use crate::has_allowed_extension;
use crate::vision::client::VisionClient;
use crate::vision::render::{render, RenderOptions};
use crate::vision::scan::scan;
use crate::vision::{Extraction, ScanOutcome};

#[derive(Debug, PartialEq)]
pub enum RunReport {
    /// The image extension was refused; nothing was sent.
    Rejected,
    Completed {
        outcome: ScanOutcome,
        /// Objects drawn on the saved copy, `None` when nothing was rendered.
        rendered: Option<usize>,
    },
}

/// Scan the configured image, render its objects and list similar images.
///
/// Never fails: every fault is logged and shows up in the returned report.
pub async fn run(config: &Config) -> RunReport {
    if !has_allowed_extension(&config.image_path) {
        println!("Not a valid image extension: {}", config.image_path.display());
        return RunReport::Rejected;
    }

    let outcome = match VisionClient::from_config(config) {
        Ok(client) => scan(&client, &config.image_path).await,
        Err(err) => {
            error!("failed to build HTTP client: {}", err);
            ScanOutcome::failed()
        }
    };

    let rendered = match &outcome.objects {
        Extraction::Detected(objects) if !objects.is_empty() => {
            match render(&config.image_path, objects, &RenderOptions::from_config(config)) {
                Ok(count) => {
                    println!("Total number of objects detected: {count}");
                    Some(count)
                }
                Err(err) => {
                    error!("{:#}", err);
                    None
                }
            }
        }
        Extraction::Detected(_) => {
            println!("No objects detected by the vision API");
            None
        }
        Extraction::ExtractionFailed => {
            println!("Object detection failed; nothing to render");
            None
        }
    };

    match &outcome.similar_images {
        Extraction::Detected(urls) if !urls.is_empty() => show_links(urls),
        Extraction::Detected(_) => println!("No similar images found"),
        Extraction::ExtractionFailed => println!("No websites found"),
    }
    info!("finished {}", config.image_path.display());

    RunReport::Completed { outcome, rendered }
}

fn show_links(urls: &[String]) {
    for (i, url) in urls.iter().enumerate() {
        println!("Link {i}: {url}");
    }
}
