// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectifier — warps the located document to a top-down view.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use quizmark_core::error::{QuizmarkError, Result};
use tracing::{debug, info, instrument};

use crate::geometry::Quadrilateral;

/// Projective mapping from a document quadrilateral to an upright rectangle.
///
/// The same rectifier is applied to the color and the grayscale photo so that
/// pixel coordinates in both outputs line up exactly.
#[derive(Debug, Clone)]
pub struct Rectifier {
    projection: Projection,
    width: u32,
    height: u32,
}

impl Rectifier {
    /// Compute the output size and projection for `quad`.
    ///
    /// The output is as wide as the longer of the top and bottom edges and as
    /// tall as the longer of the left and right edges (inclusive pixel counts),
    /// so an axis-aligned rectangle maps onto itself.
    #[instrument(skip_all)]
    pub fn new(quad: &Quadrilateral) -> Result<Self> {
        let width = quad.max_width().round() as u32 + 1;
        let height = quad.max_height().round() as u32 + 1;
        if width < 2 || height < 2 {
            return Err(QuizmarkError::DegenerateDocument);
        }

        let (right, bottom) = ((width - 1) as f32, (height - 1) as f32);
        let dest: [(f32, f32); 4] = [
            (0.0, 0.0),      // top-left
            (right, 0.0),    // top-right
            (right, bottom), // bottom-right
            (0.0, bottom),   // bottom-left
        ];

        let projection = Projection::from_control_points(quad.corners(), dest)
            .ok_or(QuizmarkError::DegenerateDocument)?;

        info!(width, height, "Rectification computed");
        Ok(Self {
            projection,
            width,
            height,
        })
    }

    /// Output dimensions `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Warp the color photo. Pixels outside the source come out white.
    pub fn warp_color(&self, color: &RgbImage) -> RgbImage {
        let mut output = RgbImage::new(self.width, self.height);
        warp_into(
            color,
            &self.projection,
            Interpolation::Bilinear,
            Rgb([255u8, 255, 255]),
            &mut output,
        );
        debug!("Color image rectified");
        output
    }

    /// Warp the grayscale photo. Pixels outside the source come out white.
    pub fn warp_gray(&self, gray: &GrayImage) -> GrayImage {
        let mut output = GrayImage::new(self.width, self.height);
        warp_into(
            gray,
            &self.projection,
            Interpolation::Bilinear,
            Luma([255u8]),
            &mut output,
        );
        debug!("Grayscale image rectified");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
    use imageproc::point::Point;
    use imageproc::rect::Rect;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 3 + y * 2) % 256) as u8]))
    }

    #[test]
    fn rectifying_an_upright_rectangle_is_identity() {
        let gray = gradient(64, 48);
        let quad = Quadrilateral::from_corners([(0.0, 0.0), (63.0, 0.0), (63.0, 47.0), (0.0, 47.0)]);

        let rectifier = Rectifier::new(&quad).expect("valid quad");
        assert_eq!(rectifier.dimensions(), (64, 48));

        // Bilinear sampling needs a right and bottom neighbour, so the last
        // row and column fall back to the fill value.
        let warped = rectifier.warp_gray(&gray);
        for y in 1..47 {
            for x in 1..63 {
                let original = gray.get_pixel(x, y).0[0];
                let value = warped.get_pixel(x, y).0[0];
                assert!(
                    value.abs_diff(original) <= 1,
                    "pixel ({x}, {y}) changed from {original} to {value}"
                );
            }
        }
    }

    #[test]
    fn inner_rectangle_is_cropped_out() {
        let mut gray = GrayImage::from_pixel(100, 80, Luma([0u8]));
        draw_filled_rect_mut(&mut gray, Rect::at(20, 10).of_size(50, 40), Luma([200u8]));
        let quad =
            Quadrilateral::from_corners([(20.0, 10.0), (69.0, 10.0), (69.0, 49.0), (20.0, 49.0)]);

        let rectifier = Rectifier::new(&quad).expect("valid quad");
        let warped = rectifier.warp_gray(&gray);
        assert_eq!(warped.dimensions(), (50, 40));
        assert!(warped.pixels().all(|p| p.0[0] >= 198));
    }

    #[test]
    fn skewed_document_becomes_upright() {
        let mut gray = GrayImage::from_pixel(300, 300, Luma([0u8]));
        let corners = [
            Point::new(60, 40),
            Point::new(250, 70),
            Point::new(230, 260),
            Point::new(40, 230),
        ];
        draw_polygon_mut(&mut gray, &corners, Luma([255u8]));

        let quad = Quadrilateral::from_corners([
            (60.0, 40.0),
            (250.0, 70.0),
            (230.0, 260.0),
            (40.0, 230.0),
        ]);
        let rectifier = Rectifier::new(&quad).expect("valid quad");
        let warped = rectifier.warp_gray(&gray);

        // Everything away from the outline is page.
        let (w, h) = warped.dimensions();
        for y in 5..h - 5 {
            for x in 5..w - 5 {
                assert!(warped.get_pixel(x, y).0[0] >= 250, "({x}, {y})");
            }
        }
    }

    #[test]
    fn color_and_gray_outputs_align() {
        let color = RgbImage::from_fn(80, 60, |x, y| Rgb([x as u8, y as u8, 0]));
        let gray = GrayImage::from_fn(80, 60, |x, _| Luma([x as u8]));
        let quad = Quadrilateral::from_corners([(10.0, 5.0), (70.0, 8.0), (72.0, 55.0), (8.0, 50.0)]);

        let rectifier = Rectifier::new(&quad).expect("valid quad");
        let warped_color = rectifier.warp_color(&color);
        let warped_gray = rectifier.warp_gray(&gray);
        assert_eq!(warped_color.dimensions(), warped_gray.dimensions());
        assert_eq!(warped_color.dimensions(), rectifier.dimensions());
    }

    #[test]
    fn collapsed_quadrilateral_is_degenerate() {
        let quad = Quadrilateral::from_corners([(5.0, 5.0); 4]);
        assert!(matches!(
            Rectifier::new(&quad),
            Err(QuizmarkError::DegenerateDocument)
        ));
    }
}
