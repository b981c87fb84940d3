// camera.rs — perspective camera, projection and picking rays

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the nearest intersection with a sphere, if any.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = -b - sq;
        let t1 = -b + sq;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            // origin inside the sphere
            Some(t1)
        } else {
            None
        }
    }
}

/// Window-space rectangle the scene is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Pixel position to normalized device coordinates, +Y up.
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        Some(Vec2::new(
            (x - self.left) / self.width * 2.0 - 1.0,
            -((y - self.top) / self.height) * 2.0 + 1.0,
        ))
    }

    pub fn from_ndc(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            self.left + (ndc.x + 1.0) * 0.5 * self.width,
            self.top + (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    projection: Mat4,
}

impl Camera {
    pub fn new(fov: f32, aspect: f32) -> Self {
        let mut cam = Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            fov,
            aspect,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection();
        cam
    }

    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
            self.update_projection();
        }
    }

    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov.to_radians(), self.aspect, NEAR, FAR);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view()
    }

    /// Ray from the camera through a point given in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let p = inv * ndc.extend(0.5).extend(1.0);
        let p = p.xyz() / p.w;
        Ray {
            origin: self.position,
            direction: (p - self.position).normalize_or_zero(),
        }
    }

    /// World point to NDC; `None` when the point is behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.xy() / clip.w)
    }
}
