// panorama.rs — viewer state: orientation, zoom, hotspots and tooltips behind one input surface

use crate::camera::{Camera, Viewport};
use crate::config::{ControlMode, Variant, ViewerConfig};
use crate::hotspot::{HotspotLayer, MarkerInstance};
use crate::input::InputEvent;
use crate::orientation::{DragController, OrbitController, OrientationController, ORBIT_OFFSET};
use crate::tooltip::{Overlay, TooltipLayer};
use crate::zoom::ZoomController;
use glam::{Mat4, Vec2};
use std::time::Instant;

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub view_proj: Mat4,
    pub markers: Vec<MarkerInstance>,
}

/// A sprite label already projected to window coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteLabel {
    pub label: String,
    pub screen: Vec2,
}

/// Observable view state, used to tell whether an event changed anything.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub lon: f32,
    pub lat: f32,
    pub fov: f32,
    pub aspect: f32,
    pub overlay: Option<Overlay>,
    pub sprites: usize,
}

pub struct PanoramaViewer {
    variant: Variant,
    controller: Box<dyn OrientationController>,
    zoom: ZoomController,
    camera: Camera,
    viewport: Viewport,
    hotspots: HotspotLayer,
    tooltips: TooltipLayer,
    started: Instant,
    mounted: bool,
}

impl PanoramaViewer {
    pub fn new(config: &ViewerConfig, width: f32, height: f32, now: Instant) -> Self {
        let controller: Box<dyn OrientationController> = match config.control {
            ControlMode::Orbit { damping } => Box::new(OrbitController::new(ORBIT_OFFSET, damping)),
            ControlMode::Drag => Box::new(DragController::new()),
        };
        let zoom = ZoomController::new(config.fov, config.min_fov, config.max_fov, config.wheel);
        let aspect = if width > 0.0 && height > 0.0 {
            width / height
        } else {
            1.0
        };
        let mut camera = Camera::new(zoom.fov(), aspect);
        camera.look_at(controller.camera_position(), controller.look_target());

        Self {
            variant: config.variant,
            controller,
            zoom,
            camera,
            viewport: Viewport::from_size(width, height),
            hotspots: HotspotLayer::new(config.hotspots.clone(), config.pulse),
            tooltips: TooltipLayer::new(config.tooltip),
            started: now,
            mounted: true,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Detaches input handling and drops transient UI state. Events after this are ignored.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.controller.pointer_up();
        self.tooltips.clear();
        log::debug!("panorama viewer unmounted");
    }

    /// Routes one input event. Returns the hotspot label when a click hit one.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Option<String> {
        if !self.mounted {
            return None;
        }
        match event {
            InputEvent::PointerDown { x, y } => self.controller.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => {
                self.controller.pointer_move(x, y, self.viewport.height)
            }
            InputEvent::PointerUp { .. } => self.controller.pointer_up(),
            InputEvent::Click { x, y } => return self.click(x, y, now),
            InputEvent::Wheel { delta_y } => self.zoom.wheel(delta_y),
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
        None
    }

    fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = Viewport::from_size(width, height);
        self.camera.set_aspect(width, height);
    }

    fn click(&mut self, x: f32, y: f32, now: Instant) -> Option<String> {
        let ndc = self.viewport.to_ndc(x, y)?;
        let ray = self.camera.ray_from_ndc(ndc);
        match self.hotspots.pick(&ray) {
            Some(hit) => {
                let label = hit.hotspot.label.clone();
                log::debug!("hotspot {} hit at {:?}", hit.hotspot.id, ray.at(hit.distance));
                self.tooltips
                    .show(&label, hit.hotspot.position(), x, y, now);
                Some(label)
            }
            None => {
                self.tooltips.miss();
                None
            }
        }
    }

    pub fn zoom_in(&mut self) {
        if self.mounted {
            self.zoom.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.mounted {
            self.zoom.zoom_out();
        }
    }

    pub fn reset_view(&mut self, fov: f32) {
        if !self.mounted {
            return;
        }
        self.controller.reset();
        self.zoom.set_fov(fov);
    }

    /// Per-frame update: orientation, projection, pulse and sprite expiry.
    pub fn frame(&mut self, now: Instant) -> Frame {
        self.controller.update();
        self.camera
            .look_at(self.controller.camera_position(), self.controller.look_target());
        if self.zoom.take_projection_dirty() {
            self.camera.fov = self.zoom.fov();
            self.camera.update_projection();
        }
        self.hotspots
            .update(now.saturating_duration_since(self.started).as_secs_f32());
        self.tooltips.expire(now);

        Frame {
            view_proj: self.camera.view_proj(),
            markers: self.hotspots.instances(),
        }
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.tooltips.overlay()
    }

    pub fn sprite_labels(&self) -> Vec<SpriteLabel> {
        self.tooltips
            .sprites()
            .iter()
            .filter_map(|s| {
                let ndc = self.camera.project(s.position)?;
                Some(SpriteLabel {
                    label: s.label.clone(),
                    screen: self.viewport.from_ndc(ndc),
                })
            })
            .collect()
    }

    pub fn fov(&self) -> f32 {
        self.zoom.fov()
    }

    pub fn lon_lat(&self) -> (f32, f32) {
        self.controller.lon_lat()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let (lon, lat) = self.lon_lat();
        ViewSnapshot {
            lon,
            lat,
            fov: self.fov(),
            aspect: self.camera.aspect,
            overlay: self.tooltips.overlay().cloned(),
            sprites: self.tooltips.sprites().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const W: f32 = 1280.0;
    const H: f32 = 720.0;

    fn viewer(variant: Variant) -> (PanoramaViewer, Instant) {
        let now = Instant::now();
        let mut v = PanoramaViewer::new(&ViewerConfig::preset(variant), W, H, now);
        v.frame(now);
        (v, now)
    }

    /// Window position of a hotspot as currently seen by the camera.
    fn screen_of(v: &PanoramaViewer, index: usize) -> Vec2 {
        let p = ViewerConfig::preset(v.variant()).hotspots[index].position();
        let ndc = v.camera().project(p).expect("hotspot in front of the camera");
        Viewport::from_size(W, H).from_ndc(ndc)
    }

    fn drag(v: &mut PanoramaViewer, from: (f32, f32), to: (f32, f32), now: Instant) {
        v.handle(InputEvent::PointerDown { x: from.0, y: from.1 }, now);
        v.handle(InputEvent::PointerMove { x: to.0, y: to.1 }, now);
        v.handle(InputEvent::PointerUp { x: to.0, y: to.1 }, now);
    }

    #[test]
    fn clicking_a_visible_hotspot_shows_its_label() {
        let (mut v, now) = viewer(Variant::Orbit);
        // the orbit camera starts looking down -X; turn towards hotspot 1 at (10, 0, -30)
        let target = ViewerConfig::preset(Variant::Orbit).hotspots[0].position();
        let on_screen = |v: &PanoramaViewer| {
            v.camera()
                .project(target)
                .is_some_and(|n| n.x.abs() < 0.9 && n.y.abs() < 0.9)
        };
        for _ in 0..4 {
            if on_screen(&v) {
                break;
            }
            // 60 px of a 720 px viewport is a 30° turn once damping settles
            drag(&mut v, (640.0, 360.0), (700.0, 360.0), now);
            for _ in 0..300 {
                v.frame(now);
            }
        }
        assert!(on_screen(&v));
        let s = screen_of(&v, 0);
        let label = v.handle(InputEvent::Click { x: s.x, y: s.y }, now);
        assert_eq!(label.as_deref(), Some("Hotspot 1"));
        let o = v.overlay().expect("overlay tooltip");
        assert_eq!(o.label, "Hotspot 1");
        assert_eq!((o.x, o.y), (s.x, s.y));
        assert_eq!(o.position(1.0), (s.x + 10.0, s.y + 10.0));
    }

    #[test]
    fn clicking_empty_space_clears_the_tooltip() {
        let (mut v, now) = viewer(Variant::DragPulse);
        // drag camera: lon 0 looks along +X, rotate to face hotspot 1 at lon ≈ -71.6°
        let lon = (-30.0f32).atan2(10.0).to_degrees();
        drag(&mut v, (0.0, 0.0), (-lon / 0.1, 0.0), now);
        v.frame(now);
        let s = screen_of(&v, 0);
        assert!(v.handle(InputEvent::Click { x: s.x, y: s.y }, now).is_some());
        assert!(v.overlay().is_some());

        assert_eq!(v.handle(InputEvent::Click { x: 5.0, y: 5.0 }, now), None);
        assert!(v.overlay().is_none());
    }

    #[test]
    fn sprite_variant_spawns_a_timed_label() {
        let (mut v, now) = viewer(Variant::Drag);
        let lon = (-30.0f32).atan2(10.0).to_degrees();
        drag(&mut v, (0.0, 0.0), (-lon / 0.1, 0.0), now);
        v.frame(now);
        let s = screen_of(&v, 0);
        assert!(v.handle(InputEvent::Click { x: s.x, y: s.y }, now).is_some());
        assert!(v.overlay().is_none());

        let labels = v.sprite_labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label, "Hotspot 1");

        v.frame(now + Duration::from_millis(1000));
        assert_eq!(v.sprite_labels().len(), 1);
        v.frame(now + Duration::from_millis(2500));
        assert!(v.sprite_labels().is_empty());
    }

    #[test]
    fn wheel_and_buttons_reach_the_camera_on_the_next_frame() {
        let (mut v, now) = viewer(Variant::Drag);
        v.handle(InputEvent::Wheel { delta_y: -100.0 }, now);
        assert_eq!(v.fov(), 70.0);
        assert_eq!(v.camera().fov, 75.0);
        v.frame(now);
        assert_eq!(v.camera().fov, 70.0);

        for _ in 0..50 {
            v.zoom_out();
        }
        v.frame(now);
        assert_eq!(v.camera().fov, 85.0);
    }

    #[test]
    fn resize_updates_aspect_and_ignores_zero() {
        let (mut v, now) = viewer(Variant::Orbit);
        v.handle(InputEvent::Resize { width: 800.0, height: 400.0 }, now);
        assert_eq!(v.camera().aspect, 2.0);
        v.handle(InputEvent::Resize { width: 0.0, height: 400.0 }, now);
        assert_eq!(v.camera().aspect, 2.0);
    }

    #[test]
    fn drag_latitude_is_clamped_through_the_viewer() {
        let (mut v, now) = viewer(Variant::Drag);
        drag(&mut v, (0.0, 0.0), (0.0, 5000.0), now);
        v.frame(now);
        assert_eq!(v.lon_lat().1, 85.0);
        drag(&mut v, (0.0, 0.0), (0.0, -50_000.0), now);
        v.frame(now);
        assert_eq!(v.lon_lat().1, -85.0);
    }

    #[test]
    fn events_after_unmount_change_nothing() {
        for variant in [Variant::Orbit, Variant::Drag, Variant::DragPulse] {
            let (mut v, now) = viewer(variant);
            v.unmount();
            let before = v.snapshot();
            let events = [
                InputEvent::PointerDown { x: 10.0, y: 10.0 },
                InputEvent::PointerMove { x: 400.0, y: 300.0 },
                InputEvent::PointerUp { x: 400.0, y: 300.0 },
                InputEvent::Wheel { delta_y: -500.0 },
                InputEvent::Click { x: 640.0, y: 360.0 },
                InputEvent::Resize { width: 300.0, height: 900.0 },
            ];
            for e in events {
                assert_eq!(v.handle(e, now), None);
            }
            v.zoom_in();
            v.reset_view(50.0);
            v.frame(now + Duration::from_millis(16));
            assert_eq!(v.snapshot(), before, "{variant:?}");
            assert!(!v.is_mounted());
        }
    }
}
