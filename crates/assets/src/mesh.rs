use glam::Vec3;

/// Indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.positions.first()?;
        let init = Bounds {
            min: first,
            max: first,
        };
        Some(self.positions.iter().fold(init, |b, p| Bounds {
            min: b.min.min(*p),
            max: b.max.max(*p),
        }))
    }

    /// Center the mesh on the origin and scale its largest extent to 2, so it
    /// fits the `[-1, 1]` cube. Degenerate (zero-extent) meshes are only
    /// centered.
    pub fn normalize(&mut self) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let center = bounds.center();
        let largest = bounds.extent().max_element();
        let scale = if largest > f32::EPSILON {
            2.0 / largest
        } else {
            1.0
        };
        for p in &mut self.positions {
            *p = (*p - center) * scale;
        }
    }

    /// Replace normals with area-weighted averages of adjacent face normals.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let face = (pb - pa).cross(pc - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect();
    }
}
