pub mod client;
pub mod detected_object;
pub mod extract;
pub mod render;
pub mod scan;

pub use detected_object::{DetectedObject, Extraction, ScanOutcome, Vertex};
