// mesh.rs — UV sphere generator shared by the panorama shell and hotspot markers

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Builds a UV sphere centred on the origin.
///
/// `u` runs along longitude and `v` from the north pole (0) to the south pole (1),
/// matching a top-left texture origin, so an equirectangular image maps without flipping.
pub fn build_sphere(radius: f32, width_segments: usize, height_segments: usize) -> SphereMesh {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity((height_segments + 1) * (width_segments + 1));
    let mut indices = Vec::with_capacity(height_segments * width_segments * 6);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let polar = std::f32::consts::PI * v;
        let y = radius * polar.cos();
        let sin_p = polar.sin();

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let azimuth = std::f32::consts::TAU * u;

            let x = -radius * azimuth.cos() * sin_p;
            let z = radius * azimuth.sin() * sin_p;

            vertices.push(Vertex {
                position: [x, y, z],
                uv: [u, v],
            });
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = (iy * row + ix + 1) as u32;
            let b = (iy * row + ix) as u32;
            let c = ((iy + 1) * row + ix) as u32;
            let d = ((iy + 1) * row + ix + 1) as u32;

            // poles collapse to a single ring point, skip the degenerate half
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    SphereMesh { vertices, indices }
}

impl SphereMesh {
    /// Mirrors the mesh across the YZ plane so the texture reads correctly from inside.
    pub fn mirrored_x(mut self) -> Self {
        for v in &mut self.vertices {
            v.position[0] = -v.position[0];
        }
        // flip winding so front faces point inward
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vertex_lies_on_the_sphere() {
        let mesh = build_sphere(50.0, 60, 40);
        assert_eq!(mesh.vertices.len(), 61 * 41);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            let r = (x * x + y * y + z * z).sqrt();
            assert!((r - 50.0).abs() < 1e-3, "radius {r}");
        }
    }

    #[test]
    fn indices_stay_in_bounds_and_skip_pole_degenerates() {
        let mesh = build_sphere(1.0, 16, 16);
        assert_eq!(mesh.indices.len() % 3, 0);
        // two triangles per quad minus one per quad on each polar row
        assert_eq!(mesh.indices.len() / 3, 16 * 16 * 2 - 2 * 16);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn mirroring_flips_x_and_winding() {
        let mesh = build_sphere(2.0, 8, 6);
        let mirrored = mesh.clone().mirrored_x();
        for (a, b) in mesh.vertices.iter().zip(&mirrored.vertices) {
            assert_eq!(a.position[0], -b.position[0]);
            assert_eq!(a.position[1], b.position[1]);
            assert_eq!(a.uv, b.uv);
        }
        assert_eq!(mesh.indices[0], mirrored.indices[0]);
        assert_eq!(mesh.indices[1], mirrored.indices[2]);
    }
}
