// orientation.rs — look-direction controllers (manual lon/lat drag and damped orbit)

use glam::Vec3;

/// Degrees of longitude/latitude per dragged pixel.
pub const DRAG_DEGREES_PER_PX: f32 = 0.1;
pub const LATITUDE_LIMIT: f32 = 85.0;
/// Distance of the look-at point from the camera in drag mode.
pub const LOOK_RADIUS: f32 = 500.0;

pub const ORBIT_OFFSET: f32 = 0.1;
pub const ORBIT_DAMPING: f32 = 0.05;
const POLAR_EPS: f32 = 1e-6;

/// Spherical (longitude, latitude in degrees) to Cartesian on a sphere of radius `r`.
///
/// phi = radians(90 - lat), theta = radians(lon);
/// x = r sinφ cosθ, y = r cosφ, z = r sinφ sinθ.
pub fn spherical_to_cartesian(lon: f32, lat: f32, r: f32) -> Vec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = lon.to_radians();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.cos(),
        r * phi.sin() * theta.sin(),
    )
}

/// Input/update surface shared by both controllers.
pub trait OrientationController {
    fn pointer_down(&mut self, x: f32, y: f32);
    fn pointer_move(&mut self, x: f32, y: f32, viewport_height: f32);
    fn pointer_up(&mut self);
    /// Advances the controller by one frame.
    fn update(&mut self);
    fn camera_position(&self) -> Vec3;
    fn look_target(&self) -> Vec3;
    /// Longitude/latitude of the current look direction, in degrees.
    fn lon_lat(&self) -> (f32, f32);
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy)]
struct DragAnchor {
    x: f32,
    y: f32,
    lon: f32,
    lat: f32,
}

#[derive(Debug, Clone)]
pub struct DragController {
    pub lon: f32,
    pub lat: f32,
    pub sensitivity: f32,
    anchor: Option<DragAnchor>,
    target: Vec3,
}

impl DragController {
    pub fn new() -> Self {
        let mut c = Self {
            lon: 0.0,
            lat: 0.0,
            sensitivity: 1.0,
            anchor: None,
            target: Vec3::ZERO,
        };
        c.update();
        c
    }
}

impl OrientationController for DragController {
    fn pointer_down(&mut self, x: f32, y: f32) {
        self.anchor = Some(DragAnchor {
            x,
            y,
            lon: self.lon,
            lat: self.lat,
        });
    }

    fn pointer_move(&mut self, x: f32, y: f32, _viewport_height: f32) {
        let Some(a) = self.anchor else {
            return;
        };
        let k = DRAG_DEGREES_PER_PX * self.sensitivity;
        self.lon = a.lon + (a.x - x) * k;
        self.lat = (a.lat + (y - a.y) * k).clamp(-LATITUDE_LIMIT, LATITUDE_LIMIT);
    }

    fn pointer_up(&mut self) {
        self.anchor = None;
    }

    fn update(&mut self) {
        self.lat = self.lat.clamp(-LATITUDE_LIMIT, LATITUDE_LIMIT);
        self.target = spherical_to_cartesian(self.lon, self.lat, LOOK_RADIUS);
    }

    fn camera_position(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn look_target(&self) -> Vec3 {
        self.target
    }

    fn lon_lat(&self) -> (f32, f32) {
        (self.lon, self.lat)
    }

    fn reset(&mut self) {
        self.lon = 0.0;
        self.lat = 0.0;
        self.anchor = None;
        self.update();
    }
}

/// Camera orbiting the origin at a tiny offset; dragging spins the offset around so the
/// view sweeps across the inside of the sphere.
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub radius: f32,
    /// Angle from +Y, radians.
    pub polar: f32,
    /// Angle around +Y measured from +Z, radians.
    pub azimuth: f32,
    pub damping: Option<f32>,
    pub rotate_speed: f32,
    delta_polar: f32,
    delta_azimuth: f32,
    last: Option<(f32, f32)>,
}

impl OrbitController {
    /// Starts at `(offset, 0, 0)` looking at the origin.
    pub fn new(offset: f32, damping: Option<f32>) -> Self {
        Self {
            radius: offset,
            polar: std::f32::consts::FRAC_PI_2,
            azimuth: std::f32::consts::FRAC_PI_2,
            damping,
            rotate_speed: 1.0,
            delta_polar: 0.0,
            delta_azimuth: 0.0,
            last: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.delta_polar.abs() < 1e-6 && self.delta_azimuth.abs() < 1e-6
    }
}

impl OrientationController for OrbitController {
    fn pointer_down(&mut self, x: f32, y: f32) {
        self.last = Some((x, y));
    }

    fn pointer_move(&mut self, x: f32, y: f32, viewport_height: f32) {
        let Some((lx, ly)) = self.last else {
            return;
        };
        if viewport_height <= 0.0 {
            return;
        }
        let (dx, dy) = (x - lx, y - ly);
        let k = std::f32::consts::TAU * self.rotate_speed / viewport_height;
        self.delta_azimuth -= dx * k;
        self.delta_polar -= dy * k;
        self.last = Some((x, y));
    }

    fn pointer_up(&mut self) {
        self.last = None;
    }

    fn update(&mut self) {
        match self.damping {
            Some(f) => {
                self.azimuth += self.delta_azimuth * f;
                self.polar += self.delta_polar * f;
                self.delta_azimuth *= 1.0 - f;
                self.delta_polar *= 1.0 - f;
                if self.is_settled() {
                    self.delta_azimuth = 0.0;
                    self.delta_polar = 0.0;
                }
            }
            None => {
                self.azimuth += self.delta_azimuth;
                self.polar += self.delta_polar;
                self.delta_azimuth = 0.0;
                self.delta_polar = 0.0;
            }
        }
        self.polar = self
            .polar
            .clamp(POLAR_EPS, std::f32::consts::PI - POLAR_EPS);
        self.azimuth = self.azimuth.rem_euclid(std::f32::consts::TAU);
    }

    fn camera_position(&self) -> Vec3 {
        let s = self.polar.sin();
        Vec3::new(
            self.radius * s * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * s * self.azimuth.cos(),
        )
    }

    fn look_target(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn lon_lat(&self) -> (f32, f32) {
        let dir = -self.camera_position();
        let lat = (dir.y / dir.length()).asin().to_degrees();
        let lon = dir.z.atan2(dir.x).to_degrees();
        (lon, lat)
    }

    fn reset(&mut self) {
        *self = Self {
            damping: self.damping,
            rotate_speed: self.rotate_speed,
            ..Self::new(self.radius, self.damping)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_at_zero_longitude_points_along_x() {
        let p = spherical_to_cartesian(0.0, 0.0, 500.0);
        assert!((p - Vec3::new(500.0, 0.0, 0.0)).length() < 1e-3);
        let up = spherical_to_cartesian(0.0, 90.0, 1.0);
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn conversion_is_continuous() {
        let step = 0.01;
        for lon in (-360..=360).step_by(15) {
            for lat in (-85..=85).step_by(5) {
                let (lon, lat) = (lon as f32, lat as f32);
                let a = spherical_to_cartesian(lon, lat, 1.0);
                let b = spherical_to_cartesian(lon + step, lat + step, 1.0);
                // arc length of a 0.01° step on the unit sphere is ~1.7e-4
                assert!((a - b).length() < 5e-4, "jump at ({lon}, {lat})");
            }
        }
    }

    #[test]
    fn drag_maps_pixels_to_degrees() {
        let mut c = DragController::new();
        c.pointer_down(100.0, 100.0);
        c.pointer_move(50.0, 120.0, 720.0);
        assert!((c.lon - 5.0).abs() < 1e-4);
        assert!((c.lat - 2.0).abs() < 1e-4);
        c.pointer_up();
        c.pointer_move(0.0, 0.0, 720.0);
        assert!((c.lon - 5.0).abs() < 1e-4, "moves after release are ignored");
    }

    #[test]
    fn any_drag_sequence_keeps_latitude_in_range() {
        let mut c = DragController::new();
        // deterministic pseudo-random walk
        let mut seed: u32 = 0x9e37_79b9;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            (seed % 20_000) as f32 - 10_000.0
        };
        for _ in 0..200 {
            c.pointer_down(next(), next());
            for _ in 0..10 {
                c.pointer_move(next(), next(), 720.0);
                assert!((-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&c.lat));
                c.update();
                assert!((-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&c.lat));
            }
            c.pointer_up();
        }
    }

    #[test]
    fn orbit_starts_looking_down_negative_x() {
        let c = OrbitController::new(ORBIT_OFFSET, Some(ORBIT_DAMPING));
        let pos = c.camera_position();
        assert!((pos - Vec3::new(0.1, 0.0, 0.0)).length() < 1e-5);
        let (lon, lat) = c.lon_lat();
        assert!((lon.abs() - 180.0).abs() < 1e-3);
        assert!(lat.abs() < 1e-3);
    }

    #[test]
    fn orbit_damping_eases_towards_the_full_rotation() {
        let mut c = OrbitController::new(ORBIT_OFFSET, Some(ORBIT_DAMPING));
        let start = c.azimuth;
        c.pointer_down(0.0, 0.0);
        c.pointer_move(-36.0, 0.0, 720.0);
        c.pointer_up();

        c.update();
        let first = c.azimuth - start;
        let expected_total = std::f32::consts::TAU * 36.0 / 720.0;
        assert!((first - expected_total * ORBIT_DAMPING).abs() < 1e-5);

        for _ in 0..500 {
            c.update();
        }
        assert!(c.is_settled());
        assert!((c.azimuth - start - expected_total).abs() < 1e-3);
    }

    #[test]
    fn orbit_polar_never_flips_over_the_pole() {
        let mut c = OrbitController::new(ORBIT_OFFSET, None);
        c.pointer_down(0.0, 0.0);
        c.pointer_move(0.0, 10_000.0, 100.0);
        c.update();
        assert!(c.polar > 0.0 && c.polar < std::f32::consts::PI);
        c.reset();
        assert!((c.polar - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
