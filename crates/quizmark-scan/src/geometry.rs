// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour geometry — region extraction, bounding rectangles, closed
// Douglas-Peucker approximation, and the ordered document quadrilateral.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point;

/// Axis-aligned enclosure of a contour. Width and height count pixels
/// inclusively, so a single pixel is 1×1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    /// Smallest rectangle containing every point, or `None` for no points.
    pub fn enclosing(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Outer boundary of one connected foreground region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Boundary points in tracing order, first point not repeated at the end.
    pub points: Vec<Point<i32>>,
    pub bounds: BoundingRect,
}

impl Region {
    pub fn new(points: Vec<Point<i32>>) -> Option<Self> {
        let bounds = BoundingRect::enclosing(&points)?;
        Some(Self { points, bounds })
    }

    /// Area enclosed by the boundary polygon.
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }

    /// Closed perimeter of the boundary polygon.
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }
}

/// Extract the outer borders of `binary` that are not nested inside any other
/// border. Non-zero pixels are foreground.
pub fn external_regions(binary: &GrayImage) -> Vec<Region> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(|contour| Region::new(contour.points))
        .collect()
}

// imageproc's `approximate_polygon_dp(.., true)` splits the ring at its first
// and last points and panics on an empty curve.
/// Approximate a closed contour with fewer vertices (Douglas-Peucker).
///
/// The ring is split at the first point and the point farthest from it, and
/// each half is simplified independently, so the result does not depend on
/// the ring being open at an arbitrary vertex. Every dropped point lies within
/// `epsilon` of the simplified outline.
pub fn approximate_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let mut split = 0;
    let mut split_dist = 0.0;
    for (i, &p) in points.iter().enumerate().skip(1) {
        let d = distance(first, p);
        if d > split_dist {
            split_dist = d;
            split = i;
        }
    }
    if split == 0 {
        return vec![first];
    }

    // Index `n` of the ring is the first point again.
    let n = points.len();
    let ring_at = |i: usize| points[i % n];

    let mut keep = vec![false; n + 1];
    keep[0] = true;
    keep[split] = true;
    mark_douglas_peucker(&ring_at, 0, split, epsilon, &mut keep);
    mark_douglas_peucker(&ring_at, split, n, epsilon, &mut keep);

    (0..n).filter(|&i| keep[i]).map(|i| points[i]).collect()
}

/// Mark the points of `start..=end` that survive simplification.
fn mark_douglas_peucker(
    ring_at: &impl Fn(usize) -> Point<i32>,
    start: usize,
    end: usize,
    epsilon: f64,
    keep: &mut [bool],
) {
    let mut stack = vec![(start, end)];

    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }

        let (a, b) = (ring_at(s), ring_at(e));
        let mut max_dist = 0.0;
        let mut max_index = s;
        for i in (s + 1)..e {
            let d = point_to_line_distance(ring_at(i), a, b);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((s, max_index));
            stack.push((max_index, e));
        }
    }
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn point_to_line_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let length = distance(a, b);
    if length == 0.0 {
        return distance(p, a);
    }
    let cross = (b.x - a.x) as f64 * (a.y - p.y) as f64 - (a.x - p.x) as f64 * (b.y - a.y) as f64;
    cross.abs() / length
}

/// Document boundary with corners ordered top-left, top-right, bottom-right,
/// bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    corners: [(f32, f32); 4],
}

impl Quadrilateral {
    /// Order four arbitrary corners.
    ///
    /// Top-left has the smallest `x + y`, bottom-right the largest; top-right
    /// has the smallest `y - x`, bottom-left the largest.
    pub fn from_corners(points: [(f32, f32); 4]) -> Self {
        let pick = |key: fn(&(f32, f32)) -> f32, largest: bool| {
            let mut best = points[0];
            for p in &points[1..] {
                let better = if largest {
                    key(p) > key(&best)
                } else {
                    key(p) < key(&best)
                };
                if better {
                    best = *p;
                }
            }
            best
        };
        let sum = |p: &(f32, f32)| p.0 + p.1;
        let diff = |p: &(f32, f32)| p.1 - p.0;

        Self {
            corners: [
                pick(sum, false),
                pick(diff, false),
                pick(sum, true),
                pick(diff, true),
            ],
        }
    }

    /// Build from a polygon approximation; `None` unless it has exactly four
    /// vertices.
    pub fn from_polygon(points: &[Point<i32>]) -> Option<Self> {
        match points {
            [a, b, c, d] => Some(Self::from_corners([
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                (c.x as f32, c.y as f32),
                (d.x as f32, d.y as f32),
            ])),
            _ => None,
        }
    }

    /// `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn corners(&self) -> [(f32, f32); 4] {
        self.corners
    }

    /// Longer of the top and bottom edges.
    pub fn max_width(&self) -> f32 {
        let [tl, tr, br, bl] = self.corners;
        edge_length(tl, tr).max(edge_length(bl, br))
    }

    /// Longer of the left and right edges.
    pub fn max_height(&self) -> f32 {
        let [tl, tr, br, bl] = self.corners;
        edge_length(tl, bl).max(edge_length(tr, br))
    }
}

fn edge_length(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn bounding_rect_is_inclusive() {
        let rect = BoundingRect::enclosing(&pts(&[(10, 5), (49, 5), (49, 44), (10, 44)]))
            .expect("non-empty");
        assert_eq!(rect, BoundingRect { x: 10, y: 5, width: 40, height: 40 });
        assert!((rect.aspect_ratio() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_rect_of_nothing_is_none() {
        assert!(BoundingRect::enclosing(&[]).is_none());
    }

    #[test]
    fn region_area_and_perimeter_close_the_outline() {
        let region = Region::new(pts(&[(0, 0), (10, 0), (10, 5), (0, 5)])).expect("non-empty");
        assert!((region.area() - 50.0).abs() < 1e-9);
        assert!((region.perimeter() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn approximating_nothing_is_empty() {
        assert!(approximate_polygon(&[], 1.0).is_empty());
        let one = pts(&[(4, 4)]);
        assert_eq!(approximate_polygon(&one, 1.0), one);
    }

    #[test]
    fn approximation_collapses_dense_rectangle_outline() {
        let mut outline = Vec::new();
        for x in 0..100 {
            outline.push(Point::new(x, 0));
        }
        for y in 0..60 {
            outline.push(Point::new(100, y));
        }
        for x in (1..=100).rev() {
            outline.push(Point::new(x, 60));
        }
        for y in (1..=60).rev() {
            outline.push(Point::new(0, y));
        }

        let epsilon = 0.04 * arc_length(&outline, true);
        let approx = approximate_polygon(&outline, epsilon);
        assert_eq!(approx, pts(&[(0, 0), (100, 0), (100, 60), (0, 60)]));
    }

    #[test]
    fn approximation_keeps_a_pronounced_corner() {
        // Triangle traced with a few intermediate points per edge.
        let triangle = pts(&[(0, 0), (25, 0), (50, 0), (25, 40), (0, 80), (0, 40)]);
        let approx = approximate_polygon(&triangle, 2.0);
        assert_eq!(approx, pts(&[(0, 0), (50, 0), (0, 80)]));
    }

    #[test]
    fn external_regions_skip_nested_shapes() {
        let mut img = GrayImage::new(120, 120);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(100, 100), Luma([255u8]));
        draw_filled_rect_mut(&mut img, Rect::at(30, 30).of_size(60, 60), Luma([0u8]));
        // Island inside the hole is not external.
        draw_filled_rect_mut(&mut img, Rect::at(50, 50).of_size(20, 20), Luma([255u8]));

        let regions = external_regions(&img);
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].bounds,
            BoundingRect { x: 10, y: 10, width: 100, height: 100 }
        );
    }

    #[test]
    fn corners_are_ordered_from_any_input_order() {
        let quad = Quadrilateral::from_corners([
            (90.0, 110.0),
            (10.0, 5.0),
            (5.0, 100.0),
            (95.0, 8.0),
        ]);
        assert_eq!(
            quad.corners(),
            [(10.0, 5.0), (95.0, 8.0), (90.0, 110.0), (5.0, 100.0)]
        );
    }

    #[test]
    fn quadrilateral_requires_four_vertices() {
        assert!(Quadrilateral::from_polygon(&pts(&[(0, 0), (5, 0), (5, 5)])).is_none());
        let quad = Quadrilateral::from_polygon(&pts(&[(0, 0), (30, 0), (30, 20), (0, 20)]))
            .expect("four vertices");
        assert_eq!(quad.max_width(), 30.0);
        assert_eq!(quad.max_height(), 20.0);
    }
}
