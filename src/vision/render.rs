use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use super::detected_object::DetectedObject;
use crate::config::{label_font, Config};

const BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const FONT_SIZE: f32 = 16.0;

pub struct RenderOptions {
    pub output_path: PathBuf,
    pub font_path: Option<PathBuf>,
    pub show: bool,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> RenderOptions {
        RenderOptions {
            output_path: config.output_path.clone(),
            font_path: config.font_path.clone(),
            show: config.show,
        }
    }
}

/// `round(normalized * dimension)`, truncated to an integer pixel.
pub fn to_pixel(normalized: f64, dimension: u32) -> i32 {
    (normalized * dimension as f64).round() as i32
}

/// Outline width grows with confidence: `floor(score * 4)`.
pub fn stroke_width(score: f64) -> u32 {
    (score.clamp(0.0, 1.0) * 4.0).floor() as u32
}

/// Pixel rectangle spanned by corners 0 and 2, or `None` for an unusable box.
pub fn pixel_rect(object: &DetectedObject, width: u32, height: u32) -> Option<Rect> {
    let ((x0, y0), (x1, y1)) = object.corners()?;
    let (x0, y0) = (to_pixel(x0, width), to_pixel(y0, height));
    let (x1, y1) = (to_pixel(x1, width), to_pixel(y1, height));
    Some(
        Rect::at(x0.min(x1), y0.min(y1))
            .of_size(x0.abs_diff(x1).max(1), y0.abs_diff(y1).max(1)),
    )
}

/// Draw every valid object onto `image` and return how many were drawn.
pub fn annotate(image: &mut RgbImage, objects: &[DetectedObject], font: Option<&FontArc>) -> usize {
    let (width, height) = image.dimensions();
    let mut rendered = 0;
    for object in objects {
        let Some(rect) = pixel_rect(object, width, height) else {
            debug!("skipping {} with unusable bounding box {:?}", object.name, object.bounding_box);
            continue;
        };
        rendered += 1;
        for i in 0..stroke_width(object.score) {
            if rect.width() <= 2 * i || rect.height() <= 2 * i {
                break;
            }
            let inset = Rect::at(rect.left() + i as i32, rect.top() + i as i32)
                .of_size(rect.width() - 2 * i, rect.height() - 2 * i);
            draw_hollow_rect_mut(image, inset, BORDER_COLOR);
        }
        if let Some(font) = font {
            let scale = PxScale::from(FONT_SIZE);
            draw_text_mut(image, TEXT_COLOR, rect.left(), rect.top(), scale, font, &object.name);
        }
    }
    rendered
}

/// Annotate a copy of the image at `image_path`, save it and optionally open it.
pub fn render(
    image_path: &Path,
    objects: &[DetectedObject],
    options: &RenderOptions,
) -> Result<usize> {
    let mut image = image::open(image_path)
        .with_context(|| format!("cannot read image {}", image_path.display()))?
        .to_rgb8();
    let font = match label_font(options.font_path.as_deref()) {
        Ok(font) => Some(font),
        Err(err) => {
            warn!("labels disabled: {:#}", err);
            None
        }
    };

    let rendered = annotate(&mut image, objects, font.as_ref());
    image.save(&options.output_path).with_context(|| {
        format!("unable to write to output file {}", options.output_path.display())
    })?;
    info!("saved annotated image to {}", options.output_path.display());

    if options.show {
        present(&options.output_path);
    }
    Ok(rendered)
}

fn present(path: &Path) {
    let mut command = if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.arg("/C").arg("start").arg("");
        command
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    match command.arg(path).stdout(Stdio::null()).stderr(Stdio::null()).spawn() {
        Ok(_) => debug!("opened {} in the image viewer", path.display()),
        Err(err) => warn!("could not open {}: {}", path.display(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::bundled_font;
    use crate::vision::extract::extract;
    use crate::vision::Vertex;
    use serde_json::json;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn boxed(name: &str, score: f64, (x0, y0): (f64, f64), (x1, y1): (f64, f64)) -> DetectedObject {
        DetectedObject {
            name: name.to_string(),
            score,
            bounding_box: vec![
                Vertex::new(x0, y0),
                Vertex::new(x1, y0),
                Vertex::new(x1, y1),
                Vertex::new(x0, y1),
            ],
        }
    }

    #[test]
    fn center_maps_to_rounded_half() {
        assert_eq!((to_pixel(0.5, 640), to_pixel(0.5, 480)), (320, 240));
        assert_eq!((to_pixel(0.5, 101), to_pixel(0.5, 75)), (51, 38));
        assert_eq!(to_pixel(0.333, 100), 33);
        assert_eq!(to_pixel(0.667, 100), 67);
        assert_eq!(to_pixel(0.0, 640), 0);
        assert_eq!(to_pixel(1.0, 640), 640);
    }

    #[test]
    fn stroke_follows_confidence() {
        assert_eq!(stroke_width(0.2), 0);
        assert_eq!(stroke_width(0.5), 2);
        assert_eq!(stroke_width(0.99), 3);
        assert_eq!(stroke_width(1.0), 4);
    }

    #[test]
    fn rect_uses_corners_zero_and_two() {
        let rect = pixel_rect(&boxed("Cat", 0.9, (0.25, 0.5), (0.75, 1.0)), 200, 100).unwrap();
        assert_eq!((rect.left(), rect.top(), rect.width(), rect.height()), (50, 50, 100, 50));

        let swapped = pixel_rect(&boxed("Cat", 0.9, (0.75, 1.0), (0.25, 0.5)), 200, 100).unwrap();
        assert_eq!((swapped.left(), swapped.top()), (50, 50));

        let full = pixel_rect(&boxed("Cat", 0.9, (0.0, 0.0), (1.0, 1.0)), 200, 100).unwrap();
        assert_eq!((full.width(), full.height()), (200, 100));
    }

    #[test]
    fn counts_only_valid_boxes() {
        let mut image = RgbImage::from_pixel(100, 100, WHITE);
        let mut three_points = boxed("Table", 0.8, (0.1, 0.1), (0.5, 0.5));
        three_points.bounding_box.pop();
        let mut five_points = boxed("Shelf", 0.8, (0.1, 0.1), (0.5, 0.5));
        five_points.bounding_box.push(Vertex::new(0.3, 0.3));
        let mut missing_x = boxed("Chair", 0.8, (0.1, 0.1), (0.5, 0.5));
        missing_x.bounding_box[2].x = None;
        let objects = vec![
            boxed("Cat", 0.9, (0.1, 0.1), (0.6, 0.6)),
            three_points,
            five_points,
            missing_x,
            boxed("Dog", 0.3, (0.5, 0.5), (0.9, 0.9)),
            DetectedObject { name: "Empty".into(), score: 0.7, bounding_box: vec![] },
        ];
        assert_eq!(annotate(&mut image, &objects, None), 2);
    }

    #[test]
    fn off_image_boxes_are_skipped() {
        let mut image = RgbImage::from_pixel(10, 10, WHITE);
        let objects = vec![
            boxed("Beyond", 0.9, (1.5, 1.5), (2.0, 2.0)),
            boxed("Before", 0.9, (-0.5, 0.1), (0.5, 0.5)),
        ];
        assert_eq!(annotate(&mut image, &objects, None), 0);
        assert!(image.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn extreme_vertices_from_a_response_do_not_panic() {
        let response = json!({
            "responses": [{
                "localizedObjectAnnotations": [{
                    "name": "Huge",
                    "score": 0.9,
                    "boundingPoly": {"normalizedVertices": [
                        {"x": -1e10, "y": -1e10}, {"x": 1e10, "y": -1e10},
                        {"x": 1e10, "y": 1e10}, {"x": -1e10, "y": 1e10}
                    ]}
                }]
            }]
        });
        let outcome = extract(&response);
        let mut image = RgbImage::from_pixel(10, 10, WHITE);
        assert_eq!(annotate(&mut image, outcome.objects.detected().unwrap(), None), 0);
    }

    #[test]
    fn outline_is_drawn_inward_with_score_width() {
        let mut image = RgbImage::from_pixel(100, 100, WHITE);
        annotate(&mut image, &[boxed("Cat", 0.5, (0.2, 0.2), (0.8, 0.8))], None);
        assert_eq!(*image.get_pixel(20, 50), BORDER_COLOR);
        assert_eq!(*image.get_pixel(21, 50), BORDER_COLOR);
        assert_eq!(*image.get_pixel(22, 50), WHITE);
        assert_eq!(*image.get_pixel(19, 50), WHITE);
    }

    #[test]
    fn low_confidence_counts_without_outline() {
        let mut image = RgbImage::from_pixel(50, 50, WHITE);
        let objects = [boxed("Blur", 0.1, (0.2, 0.2), (0.8, 0.8))];
        let rendered = annotate(&mut image, &objects, None);
        assert_eq!(rendered, 1);
        assert!(image.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn label_is_drawn_with_bundled_font() {
        let font = bundled_font().unwrap();
        let mut image = RgbImage::from_pixel(100, 60, WHITE);
        // a score under 0.25 draws no outline, so any ink is the label
        let objects = [boxed("Cat", 0.1, (0.1, 0.1), (0.9, 0.9))];
        let rendered = annotate(&mut image, &objects, Some(&font));
        assert_eq!(rendered, 1);
        assert!(image.pixels().any(|pixel| *pixel != WHITE));
    }

    #[test]
    fn render_writes_annotated_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.png");
        RgbImage::from_pixel(64, 48, WHITE).save(&source).unwrap();
        let options = RenderOptions {
            output_path: dir.path().join("result.png"),
            font_path: Some(dir.path().join("missing.ttf")),
            show: false,
        };
        let objects = [boxed("Cat", 1.0, (0.0, 0.0), (0.5, 0.5))];
        let rendered = render(&source, &objects, &options).unwrap();
        assert_eq!(rendered, 1);
        let written = image::open(&options.output_path).unwrap().to_rgb8();
        assert_eq!(written.dimensions(), (64, 48));
        assert_eq!(*written.get_pixel(0, 10), BORDER_COLOR);
    }
}
