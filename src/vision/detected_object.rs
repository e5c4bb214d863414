use serde::{Deserialize, Serialize};

/// A normalized vertex. The API drops a coordinate whose value is 0.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Vertex {
        Vertex { x: Some(x), y: Some(y) }
    }

    /// Both coordinates, provided each lies inside the image (`0.0..=1.0`).
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (x, y) = (self.x?, self.y?);
        (is_normalized(x) && is_normalized(y)).then_some((x, y))
    }
}

fn is_normalized(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub name: String,
    pub score: f64,
    pub bounding_box: Vec<Vertex>,
}

impl DetectedObject {
    /// Opposing corners 0 and 2, present only for a complete four-point box.
    pub fn corners(&self) -> Option<((f64, f64), (f64, f64))> {
        if self.bounding_box.len() != 4 {
            return None;
        }
        Some((self.bounding_box[0].coordinates()?, self.bounding_box[2].coordinates()?))
    }
}

/// Outcome of pulling one section out of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Detected(Vec<T>),
    ExtractionFailed,
}

impl<T> Extraction<T> {
    pub fn detected(&self) -> Option<&[T]> {
        match self {
            Extraction::Detected(items) => Some(items.as_slice()),
            Extraction::ExtractionFailed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::ExtractionFailed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub objects: Extraction<DetectedObject>,
    pub similar_images: Extraction<String>,
}

impl ScanOutcome {
    pub fn failed() -> ScanOutcome {
        ScanOutcome {
            objects: Extraction::ExtractionFailed,
            similar_images: Extraction::ExtractionFailed,
        }
    }
}
