// src/geometry.rs

use serde::{Deserialize, Serialize};

use crate::config::constants::MIN_RING_POINTS;
use crate::error::RingDefect;

/// A point in the map's projected (planar) coordinate space.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Vertex) -> f64 {
        distance(*self, *other)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A ring is storable when it has enough vertices and every coordinate is
/// finite. JSON has no encoding for NaN or infinity.
pub fn check_ring(points: &[Vertex]) -> Result<(), RingDefect> {
    if points.len() < MIN_RING_POINTS {
        return Err(RingDefect::TooFewPoints(points.len()));
    }
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(RingDefect::NonFinite(index)),
        None => Ok(()),
    }
}

pub fn distance(a: Vertex, b: Vertex) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Shoelace sum over the closed ring. Positive for counter-clockwise winding.
pub fn signed_area(points: &[Vertex]) -> f64 {
    let count = points.len();
    if count < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..count {
        let j = (i + 1) % count;
        sum += points[i].x * points[j].y;
        sum -= points[j].x * points[i].y;
    }
    sum / 2.0
}

/// Planar area of the ring, independent of winding.
pub fn area(points: &[Vertex]) -> f64 {
    signed_area(points).abs()
}

/// Sum of edge lengths, closing edge included.
pub fn perimeter(points: &[Vertex]) -> f64 {
    let count = points.len();
    if count < 2 {
        return 0.0;
    }
    (0..count)
        .map(|i| distance(points[i], points[(i + 1) % count]))
        .sum()
}

/// Area-weighted centroid. Degenerate rings fall back to the vertex average.
pub fn centroid(points: &[Vertex]) -> Option<Vertex> {
    if points.is_empty() {
        return None;
    }
    let a = signed_area(points);
    if a.abs() < f64::EPSILON {
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        return Some(Vertex::new(sx / n, sy / n));
    }

    let count = points.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..count {
        let p = points[i];
        let q = points[(i + 1) % count];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    Some(Vertex::new(cx / (6.0 * a), cy / (6.0 * a)))
}

/// Even-odd point-in-ring test.
pub fn contains(points: &[Vertex], point: Vertex) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shortest distance from `point` to any edge of the closed ring.
pub fn distance_to_ring(points: &[Vertex], point: Vertex) -> Option<f64> {
    match points.len() {
        0 => None,
        1 => Some(distance(points[0], point)),
        count => (0..count)
            .map(|i| distance_to_segment(point, points[i], points[(i + 1) % count]))
            .reduce(f64::min),
    }
}

fn distance_to_segment(p: Vertex, a: Vertex, b: Vertex) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Vertex::new(a.x + t * dx, a.y + t * dy))
}

/// Ear-clipping triangulation of a simple ring, as index triples into
/// `points`. Rings the clipper cannot finish (self-intersecting input) fall
/// back to a fan for the remaining vertices.
pub fn triangulate(points: &[Vertex]) -> Vec<[usize; 3]> {
    let count = points.len();
    if count < 3 {
        return Vec::new();
    }
    let ccw = signed_area(points) >= 0.0;
    let mut remaining: Vec<usize> = if ccw {
        (0..count).collect()
    } else {
        (0..count).rev().collect()
    };
    let mut triangles = Vec::with_capacity(count - 2);

    while remaining.len() > 3 {
        let n = remaining.len();
        let ear = (0..n).find(|&i| {
            is_ear(points, &remaining, remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n])
        });
        let Some(i) = ear else {
            break;
        };
        triangles.push([remaining[(i + n - 1) % n], remaining[i], remaining[(i + 1) % n]]);
        remaining.remove(i);
    }

    for i in 1..remaining.len() - 1 {
        triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
    }
    triangles
}

fn cross(o: Vertex, a: Vertex, b: Vertex) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn is_ear(points: &[Vertex], remaining: &[usize], ia: usize, ib: usize, ic: usize) -> bool {
    let (a, b, c) = (points[ia], points[ib], points[ic]);
    if cross(a, b, c) <= 0.0 {
        return false;
    }
    remaining
        .iter()
        .filter(|&&k| k != ia && k != ib && k != ic)
        .all(|&k| {
            let p = points[k];
            !(cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0)
        })
}
