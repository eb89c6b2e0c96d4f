// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge map builder — denoises the grayscale photo and turns it into a thick,
// gap-free binary edge map for the document boundary search.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use imageproc::morphology::{dilate, erode};
use quizmark_core::config::EdgeConfig;
use tracing::{debug, instrument};

/// Build the binary edge map of a grayscale photo.
///
/// ## Pipeline
///
/// 1. Median filter to remove paper texture and small print
/// 2. Bilateral filter to flatten shading while keeping the page border sharp
/// 3. Canny edge detection
/// 4. Dilation then a shorter erosion with a square neighbourhood, closing
///    gaps in the page border left by folds and uneven lighting
///
/// Never fails. A border that stays broken is reported by the document
/// locator, not here.
#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
pub fn build_edge_map(gray: &GrayImage, config: &EdgeConfig) -> GrayImage {
    let smoothed = median_filter(gray, config.median_radius, config.median_radius);
    let smoothed = bilateral_filter(
        &smoothed,
        config.bilateral_window,
        config.bilateral_sigma_color,
        config.bilateral_sigma_space,
    );
    debug!("Denoising complete");

    let edges = canny(&smoothed, config.canny_low, config.canny_high);
    debug!(
        low = config.canny_low,
        high = config.canny_high,
        "Canny edge detection complete"
    );

    // k passes of a square neighbourhood equal one L-infinity pass of k times
    // the radius.
    let dilate_radius = morph_radius(config, config.dilate_iterations);
    let erode_radius = morph_radius(config, config.erode_iterations);
    let closed = erode(&dilate(&edges, Norm::LInf, dilate_radius), Norm::LInf, erode_radius);
    debug!(dilate_radius, erode_radius, "Edge gaps closed");

    closed
}

fn morph_radius(config: &EdgeConfig, iterations: u32) -> u8 {
    config.morph_radius(iterations).min(u8::MAX as u32) as u8
}

/// Edge-preserving smoothing of a grayscale image.
///
/// Each output pixel is the average of its `window`-pixel neighbourhood,
/// weighted by a Gaussian of spatial distance (`sigma_space`) times a
/// Gaussian of intensity difference (`sigma_color`). Neighbours across a
/// strong edge get almost no weight, so the edge survives. Samples outside
/// the image are clamped to the border.
///
/// `imageproc::filter::bilateral_filter` builds its spatial table with rows of
/// `window_size + 1` but indexes it with rows of `window_size`, and scales
/// color distances by the image maximum rather than the full 0-255 range.
pub fn bilateral_filter(
    image: &GrayImage,
    window: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let radius = (window / 2) as i64;

    let space_coeff = -0.5 / (sigma_space * sigma_space);
    let mut spatial = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2 <= (radius * radius) as f32 {
                spatial.push((dx, dy, (r2 * space_coeff).exp()));
            }
        }
    }

    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let mut range = [0f32; 256];
    for (diff, weight) in range.iter_mut().enumerate() {
        *weight = ((diff * diff) as f32 * color_coeff).exp();
    }

    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    GrayImage::from_fn(width, height, |x, y| {
        let center = image.get_pixel(x, y).0[0];
        let mut weighted_sum = 0f32;
        let mut weight_total = 0f32;

        for &(dx, dy, spatial_weight) in &spatial {
            let sx = (x as i64 + dx).clamp(0, max_x) as u32;
            let sy = (y as i64 + dy).clamp(0, max_y) as u32;
            let value = image.get_pixel(sx, sy).0[0];
            let weight = spatial_weight * range[center.abs_diff(value) as usize];
            weighted_sum += weight * value as f32;
            weight_total += weight;
        }

        Luma([(weighted_sum / weight_total).round().clamp(0.0, 255.0) as u8])
    })
}
