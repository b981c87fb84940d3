// zoom.rs — field-of-view zoom with clamping

use serde::Deserialize;

pub const BUTTON_ZOOM_IN: f32 = 0.9;
pub const BUTTON_ZOOM_OUT: f32 = 1.1;

/// How a wheel delta maps onto the field of view.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WheelZoom {
    /// `fov += delta_y * step`
    Additive { step: f32 },
    /// Scroll up divides by `factor`, scroll down multiplies.
    Multiplicative { factor: f32 },
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    fov: f32,
    pub min_fov: f32,
    pub max_fov: f32,
    pub wheel: WheelZoom,
    projection_dirty: bool,
}

impl ZoomController {
    pub fn new(fov: f32, min_fov: f32, max_fov: f32, wheel: WheelZoom) -> Self {
        let (min_fov, max_fov) = if min_fov <= max_fov {
            (min_fov, max_fov)
        } else {
            (max_fov, min_fov)
        };
        Self {
            fov: fov.clamp(min_fov, max_fov),
            min_fov,
            max_fov,
            wheel,
            projection_dirty: true,
        }
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        let fov = fov.clamp(self.min_fov, self.max_fov);
        if fov != self.fov {
            self.fov = fov;
            self.projection_dirty = true;
        }
    }

    /// `delta_y` follows the browser convention: negative when scrolling up (zoom in).
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y == 0.0 {
            return;
        }
        let fov = match self.wheel {
            WheelZoom::Additive { step } => self.fov + delta_y * step,
            WheelZoom::Multiplicative { factor } => {
                if delta_y < 0.0 {
                    self.fov / factor
                } else {
                    self.fov * factor
                }
            }
        };
        self.set_fov(fov);
    }

    pub fn zoom_in(&mut self) {
        self.set_fov(self.fov * BUTTON_ZOOM_IN);
    }

    pub fn zoom_out(&mut self) {
        self.set_fov(self.fov * BUTTON_ZOOM_OUT);
    }

    /// Returns whether the projection needs recomputing and clears the flag.
    pub fn take_projection_dirty(&mut self) -> bool {
        std::mem::take(&mut self.projection_dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_wheel_steps_and_clamps() {
        let mut z = ZoomController::new(75.0, 30.0, 85.0, WheelZoom::Additive { step: 0.05 });
        z.wheel(100.0);
        assert!((z.fov() - 80.0).abs() < 1e-4);
        z.wheel(1000.0);
        assert_eq!(z.fov(), 85.0);
        z.wheel(-10_000.0);
        assert_eq!(z.fov(), 30.0);
    }

    #[test]
    fn multiplicative_wheel_follows_scroll_direction() {
        let mut z = ZoomController::new(75.0, 30.0, 120.0, WheelZoom::Multiplicative { factor: 1.05 });
        z.wheel(-3.0);
        assert!((z.fov() - 75.0 / 1.05).abs() < 1e-4);
        z.wheel(3.0);
        z.wheel(3.0);
        assert!((z.fov() - 75.0 * 1.05).abs() < 1e-3);
    }

    #[test]
    fn any_sequence_stays_in_range() {
        let mut z = ZoomController::new(75.0, 30.0, 120.0, WheelZoom::Multiplicative { factor: 1.05 });
        for i in 0..400 {
            match i % 7 {
                0 | 1 | 2 => z.wheel(120.0),
                3 => z.zoom_in(),
                4 => z.zoom_out(),
                _ => z.wheel(-53.0),
            }
            assert!((30.0..=120.0).contains(&z.fov()));
        }
        for _ in 0..100 {
            z.zoom_in();
        }
        assert_eq!(z.fov(), 30.0);
    }

    #[test]
    fn buttons_scale_the_fov() {
        let mut z = ZoomController::new(75.0, 30.0, 120.0, WheelZoom::Additive { step: 0.05 });
        z.zoom_in();
        assert!((z.fov() - 67.5).abs() < 1e-4);
        z.zoom_out();
        assert!((z.fov() - 74.25).abs() < 1e-4);
    }

    #[test]
    fn projection_is_dirty_only_after_a_change() {
        let mut z = ZoomController::new(60.0, 30.0, 85.0, WheelZoom::Additive { step: 0.05 });
        assert!(z.take_projection_dirty());
        assert!(!z.take_projection_dirty());
        z.wheel(0.0);
        assert!(!z.take_projection_dirty());
        z.wheel(-20.0);
        assert!(z.take_projection_dirty());
        z.set_fov(10.0);
        z.set_fov(10.0);
        assert!(z.take_projection_dirty());
        assert!(!z.take_projection_dirty());
    }

    #[test]
    fn inverted_range_is_normalised() {
        let z = ZoomController::new(200.0, 85.0, 30.0, WheelZoom::Additive { step: 0.05 });
        assert_eq!((z.min_fov, z.max_fov), (30.0, 85.0));
        assert_eq!(z.fov(), 85.0);
    }
}
