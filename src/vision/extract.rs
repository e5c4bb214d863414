use serde_json::Value;
use tracing::{debug, error, warn};

use super::detected_object::{DetectedObject, Extraction, ScanOutcome, Vertex};

/// Pull detected objects and similar-image URLs out of an `images:annotate` response.
///
/// Only the first entry of `responses` is read. A section that is absent yields
/// [`Extraction::ExtractionFailed`], while a present but empty section yields an empty
/// [`Extraction::Detected`].
pub fn extract(response: &Value) -> ScanOutcome {
    let first = match response["responses"].as_array().and_then(|responses| responses.first()) {
        Some(Value::Object(entry)) if !entry.is_empty() => &response["responses"][0],
        _ => {
            warn!("response carries no usable entries: {}", response);
            return ScanOutcome::failed();
        }
    };

    if let Some(api_error) = first.get("error") {
        error!(
            "vision API reported an error (code {}): {}",
            api_error["code"],
            api_error["message"].as_str().unwrap_or("no message")
        );
    }

    ScanOutcome {
        objects: extract_objects(first),
        similar_images: extract_similar_images(first),
    }
}

fn extract_objects(entry: &Value) -> Extraction<DetectedObject> {
    let annotations = match entry.get("localizedObjectAnnotations") {
        Some(annotations) => annotations,
        None => {
            warn!("JSON response without localizedObjectAnnotations: {}", entry);
            return Extraction::ExtractionFailed;
        }
    };
    let Some(annotations) = annotations.as_array() else {
        warn!("localizedObjectAnnotations is not an array: {}", annotations);
        return Extraction::ExtractionFailed;
    };

    let objects = annotations.iter().filter_map(parse_object).collect::<Vec<_>>();
    debug!("extracted {} of {} object annotations", objects.len(), annotations.len());
    Extraction::Detected(objects)
}

fn parse_object(annotation: &Value) -> Option<DetectedObject> {
    let name = annotation["name"].as_str();
    let score = annotation["score"].as_f64();
    let (Some(name), Some(score)) = (name, score) else {
        warn!("skipping object annotation without name or score: {}", annotation);
        return None;
    };
    if !(0.0..=1.0).contains(&score) {
        warn!("skipping {} with out-of-range score {}", name, score);
        return None;
    }
    let bounding_box = match annotation["boundingPoly"]["normalizedVertices"].as_array() {
        Some(vertices) => vertices.iter().map(parse_vertex).collect(),
        None => vec![],
    };
    Some(DetectedObject {
        name: name.to_string(),
        score,
        bounding_box,
    })
}

fn parse_vertex(vertex: &Value) -> Vertex {
    Vertex {
        x: vertex["x"].as_f64(),
        y: vertex["y"].as_f64(),
    }
}

fn extract_similar_images(entry: &Value) -> Extraction<String> {
    match entry["webDetection"]["visuallySimilarImages"].as_array() {
        Some(images) => Extraction::Detected(
            images.iter()
                .filter_map(|image| image["url"].as_str().map(String::from))
                .collect(),
        ),
        None => {
            warn!("similar images not found");
            Extraction::ExtractionFailed
        }
    }
}
