// hotspot.rs — labelled markers, pulse animation and ray picking

use crate::camera::Ray;
use glam::Vec3;
use serde::Deserialize;

pub const MARKER_RADIUS: f32 = 0.5;
pub const MARKER_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hotspot {
    pub id: u32,
    pub label: String,
    pub position: [f32; 3],
}

impl Hotspot {
    pub fn new(id: u32, label: impl Into<String>, position: [f32; 3]) -> Self {
        Self {
            id,
            label: label.into(),
            position,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

pub fn default_hotspots() -> Vec<Hotspot> {
    vec![
        Hotspot::new(1, "Hotspot 1", [10.0, 0.0, -30.0]),
        Hotspot::new(2, "Hotspot 2", [-15.0, 5.0, -20.0]),
        Hotspot::new(3, "Hotspot 3", [5.0, -5.0, 25.0]),
    ]
}

/// `scale = 1 + amplitude * sin(t * speed)`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Pulse {
    pub amplitude: f32,
    pub speed: f32,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            amplitude: 0.3,
            speed: 2.0,
        }
    }
}

impl Pulse {
    pub fn scale_at(&self, elapsed_secs: f32) -> f32 {
        1.0 + self.amplitude * (elapsed_secs * self.speed).sin()
    }
}

/// Per-instance data uploaded for each marker.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerInstance {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
}

impl MarkerInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32, 4 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MarkerInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub hotspot: &'a Hotspot,
    pub distance: f32,
}

/// The hotspot set plus its current on-screen marker scale.
#[derive(Debug, Clone)]
pub struct HotspotLayer {
    hotspots: Vec<Hotspot>,
    pulse: Option<Pulse>,
    scale: f32,
}

impl HotspotLayer {
    pub fn new(hotspots: Vec<Hotspot>, pulse: Option<Pulse>) -> Self {
        Self {
            hotspots,
            pulse,
            scale: 1.0,
        }
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn update(&mut self, elapsed_secs: f32) {
        if let Some(p) = self.pulse {
            self.scale = p.scale_at(elapsed_secs);
        }
    }

    pub fn instances(&self) -> Vec<MarkerInstance> {
        self.hotspots
            .iter()
            .map(|h| MarkerInstance {
                center: h.position,
                radius: MARKER_RADIUS * self.scale,
                color: MARKER_COLOR,
            })
            .collect()
    }

    /// Nearest marker hit by `ray`.
    pub fn pick(&self, ray: &Ray) -> Option<Hit<'_>> {
        let radius = MARKER_RADIUS * self.scale;
        self.hotspots
            .iter()
            .filter_map(|h| {
                ray.intersect_sphere(h.position(), radius)
                    .map(|distance| Hit { hotspot: h, distance })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray_towards(p: Vec3) -> Ray {
        Ray {
            origin: Vec3::ZERO,
            direction: p.normalize(),
        }
    }

    #[test]
    fn picks_the_hotspot_under_the_ray() {
        let layer = HotspotLayer::new(default_hotspots(), None);
        let hit = layer.pick(&ray_towards(Vec3::new(-15.0, 5.0, -20.0))).unwrap();
        assert_eq!(hit.hotspot.label, "Hotspot 2");
        assert!(layer.pick(&ray_towards(Vec3::Y)).is_none());
    }

    #[test]
    fn nearest_marker_wins_when_two_line_up() {
        let layer = HotspotLayer::new(
            vec![
                Hotspot::new(1, "far", [0.0, 0.0, -40.0]),
                Hotspot::new(2, "near", [0.0, 0.0, -10.0]),
            ],
            None,
        );
        let hit = layer.pick(&ray_towards(Vec3::NEG_Z)).unwrap();
        assert_eq!(hit.hotspot.id, 2);
        assert!((hit.distance - 9.5).abs() < 1e-4);
    }

    #[test]
    fn pulse_scales_markers_and_hit_area() {
        let mut layer = HotspotLayer::new(
            vec![Hotspot::new(1, "a", [0.0, 0.0, -10.0])],
            Some(Pulse::default()),
        );
        // just outside the resting radius
        let grazing = Ray {
            origin: Vec3::new(0.6, 0.0, 0.0),
            direction: Vec3::NEG_Z,
        };
        layer.update(0.0);
        assert_eq!(layer.scale(), 1.0);
        assert!(layer.pick(&grazing).is_none());

        let peak = std::f32::consts::FRAC_PI_2 / Pulse::default().speed;
        layer.update(peak);
        assert!((layer.scale() - 1.3).abs() < 1e-5);
        assert!(layer.pick(&grazing).is_some());
        assert!((layer.instances()[0].radius - 0.65).abs() < 1e-5);
    }

    #[test]
    fn static_layer_ignores_time() {
        let mut layer = HotspotLayer::new(default_hotspots(), None);
        layer.update(12.3);
        assert_eq!(layer.scale(), 1.0);
        assert_eq!(layer.instances().len(), 3);
    }
}
