//! Procedural NACA 4-digit airfoils, extruded into a finite wing section.

use crate::MeshError;
use crate::mesh::Mesh;
use glam::{Vec2, Vec3};

/// NACA 4-digit profile parameters, as fractions of chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NacaProfile {
    /// Maximum camber.
    pub camber: f32,
    /// Chordwise position of maximum camber.
    pub camber_position: f32,
    /// Maximum thickness.
    pub thickness: f32,
}

impl NacaProfile {
    /// Parse a designation such as `"0012"` or `"2412"`.
    pub fn parse(id: &str) -> Result<Self, MeshError> {
        let digits: Vec<u32> = id.chars().filter_map(|c| c.to_digit(10)).collect();
        if id.len() != 4 || digits.len() != 4 {
            return Err(MeshError::InvalidIdentifier(id.to_string()));
        }
        let thickness = (digits[2] * 10 + digits[3]) as f32 / 100.0;
        if thickness == 0.0 {
            return Err(MeshError::InvalidIdentifier(id.to_string()));
        }
        Ok(Self {
            camber: digits[0] as f32 / 100.0,
            camber_position: digits[1] as f32 / 10.0,
            thickness,
        })
    }

    fn half_thickness(&self, x: f32) -> f32 {
        5.0 * self.thickness
            * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
                - 0.1036 * x.powi(4))
    }

    /// Camber line height and slope at chord fraction `x`.
    fn camber_line(&self, x: f32) -> (f32, f32) {
        let (m, p) = (self.camber, self.camber_position);
        if m == 0.0 || p == 0.0 {
            return (0.0, 0.0);
        }
        if x < p {
            (m / (p * p) * (2.0 * p * x - x * x), 2.0 * m / (p * p) * (p - x))
        } else {
            let q = (1.0 - p) * (1.0 - p);
            (
                m / q * ((1.0 - 2.0 * p) + 2.0 * p * x - x * x),
                2.0 * m / q * (p - x),
            )
        }
    }

    /// Closed counter-clockwise outline: upper surface from trailing edge to
    /// leading edge, then lower surface back. Uses cosine spacing.
    pub fn outline(&self, samples: usize) -> Vec<Vec2> {
        let n = samples.max(4);
        let xs: Vec<f32> = (0..=n)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::PI * i as f32 / n as f32).cos()))
            .collect();
        let surface = |x: f32, upper: bool| {
            let yt = self.half_thickness(x);
            let (yc, slope) = self.camber_line(x);
            let theta = slope.atan();
            let sign = if upper { 1.0 } else { -1.0 };
            Vec2::new(x - sign * yt * theta.sin(), yc + sign * yt * theta.cos())
        };
        let mut points: Vec<Vec2> = xs.iter().rev().map(|&x| surface(x, true)).collect();
        // Leading edge is shared; trailing edge closes the loop.
        points.extend(xs[1..n].iter().map(|&x| surface(x, false)));
        points
    }
}

/// Extrude `profile` along Z into a wing section of unit chord.
pub fn extruded_wing(name: &str, profile: &NacaProfile, samples: usize, span: f32) -> Mesh {
    let outline = profile.outline(samples);
    let count = outline.len() as u32;
    let (z0, z1) = (-0.5 * span, 0.5 * span);
    let mut mesh = Mesh {
        name: name.to_string(),
        ..Mesh::default()
    };

    // Side walls: back ring then front ring.
    for z in [z0, z1] {
        mesh.positions
            .extend(outline.iter().map(|p| Vec3::new(p.x, p.y, z)));
    }
    for a in 0..count {
        let b = (a + 1) % count;
        let (a0, b0, a1, b1) = (a, b, a + count, b + count);
        mesh.indices.extend_from_slice(&[a0, b0, b1, a0, b1, a1]);
    }

    // Caps get their own vertices so their normals stay flat.
    let pivot = outline.iter().copied().sum::<Vec2>() / count as f32;
    for (z, front) in [(z0, false), (z1, true)] {
        let base = mesh.positions.len() as u32;
        mesh.positions.push(Vec3::new(pivot.x, pivot.y, z));
        mesh.positions
            .extend(outline.iter().map(|p| Vec3::new(p.x, p.y, z)));
        for a in 0..count {
            let i = base + 1 + a;
            let j = base + 1 + (a + 1) % count;
            if front {
                mesh.indices.extend_from_slice(&[base, i, j]);
            } else {
                mesh.indices.extend_from_slice(&[base, j, i]);
            }
        }
    }

    mesh.compute_normals();
    mesh
}
