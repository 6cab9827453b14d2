// src/generator.rs

use std::ops::Range;

use rand::Rng;

use crate::geometry::Vertex;

/// Produces star-shaped (hence simple) rings for benchmarks and property tests.
pub struct RingGenerator;

impl RingGenerator {
    pub fn generate_ring(
        rng: &mut impl Rng,
        center: Vertex,
        avg_radius: f64,
        num_vertices: usize,
    ) -> Vec<Vertex> {
        let mut angles = Vec::with_capacity(num_vertices);
        for i in 0..num_vertices {
            let base_angle = (i as f64) * std::f64::consts::TAU / (num_vertices as f64);
            angles.push(base_angle);
        }

        let max_perturbation = std::f64::consts::PI / (num_vertices as f64) * 0.3;
        for angle in angles.iter_mut() {
            *angle += rng.gen_range(-max_perturbation..max_perturbation);
        }

        for i in 1..num_vertices {
            if angles[i] <= angles[i - 1] {
                angles[i] = angles[i - 1] + 0.01;
            }
        }

        let min_radius = avg_radius * 0.5;
        let max_radius = avg_radius * 1.5;

        angles
            .into_iter()
            .map(|angle| {
                let radius = rng.gen_range(min_radius..max_radius);
                Vertex::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect()
    }

    /// Ring with a random vertex count, radius and centre.
    pub fn random_ring(
        rng: &mut impl Rng,
        vertices: Range<usize>,
        radius: Range<f64>,
    ) -> Vec<Vertex> {
        let num_vertices = rng.gen_range(vertices);
        let avg_radius = rng.gen_range(radius);
        let center = Vertex::new(
            rng.gen_range(-1_000.0..1_000.0),
            rng.gen_range(-1_000.0..1_000.0),
        );
        Self::generate_ring(rng, center, avg_radius, num_vertices)
    }
}
