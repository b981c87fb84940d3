// tooltip.rs — hotspot labels: cursor overlay or timed in-scene sprites

use glam::Vec3;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Overlay offset from the cursor, in logical pixels (egui points).
pub const OVERLAY_OFFSET: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TooltipStyle {
    Overlay,
    Sprite { ttl_ms: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub label: String,
    /// Cursor position of the click, physical pixels.
    pub x: f32,
    pub y: f32,
}

impl Overlay {
    /// Top-left corner of the tooltip in points.
    pub fn position(&self, pixels_per_point: f32) -> (f32, f32) {
        (
            self.x / pixels_per_point + OVERLAY_OFFSET,
            self.y / pixels_per_point + OVERLAY_OFFSET,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub label: String,
    pub position: Vec3,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct TooltipLayer {
    style: TooltipStyle,
    overlay: Option<Overlay>,
    sprites: Vec<Sprite>,
}

impl TooltipLayer {
    pub fn new(style: TooltipStyle) -> Self {
        Self {
            style,
            overlay: None,
            sprites: Vec::new(),
        }
    }

    /// A click landed on a hotspot at `(x, y)`.
    pub fn show(&mut self, label: &str, anchor: Vec3, x: f32, y: f32, now: Instant) {
        match self.style {
            TooltipStyle::Overlay => {
                self.overlay = Some(Overlay {
                    label: label.to_owned(),
                    x,
                    y,
                });
            }
            TooltipStyle::Sprite { ttl_ms } => {
                self.sprites.push(Sprite {
                    label: label.to_owned(),
                    position: anchor,
                    expires_at: now + Duration::from_millis(ttl_ms),
                });
            }
        }
    }

    /// A click missed every hotspot. Sprites run out on their own timer.
    pub fn miss(&mut self) {
        self.overlay = None;
    }

    /// Drops sprites whose delay has elapsed.
    pub fn expire(&mut self, now: Instant) {
        self.sprites.retain(|s| s.expires_at > now);
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn clear(&mut self) {
        self.overlay = None;
        self.sprites.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_sits_beside_the_cursor_and_clears_on_miss() {
        let mut t = TooltipLayer::new(TooltipStyle::Overlay);
        let now = Instant::now();
        t.show("Hotspot 1", Vec3::ZERO, 100.0, 50.0, now);
        let o = t.overlay().unwrap();
        assert_eq!((o.label.as_str(), o.x, o.y), ("Hotspot 1", 100.0, 50.0));
        assert_eq!(o.position(1.0), (110.0, 60.0));
        assert!(t.sprites().is_empty());
        t.miss();
        assert!(t.overlay().is_none());
    }

    #[test]
    fn overlay_offset_stays_ten_points_on_hidpi() {
        let mut t = TooltipLayer::new(TooltipStyle::Overlay);
        t.show("Hotspot 2", Vec3::ZERO, 400.0, 200.0, Instant::now());
        let o = t.overlay().unwrap();
        assert_eq!(o.position(2.0), (210.0, 110.0));
        assert_eq!(o.position(1.5), (400.0 / 1.5 + 10.0, 200.0 / 1.5 + 10.0));
    }

    #[test]
    fn sprites_expire_after_their_delay() {
        let mut t = TooltipLayer::new(TooltipStyle::Sprite { ttl_ms: 2000 });
        let start = Instant::now();
        t.show("a", Vec3::X, 0.0, 0.0, start);
        t.show("b", Vec3::Y, 0.0, 0.0, start + Duration::from_millis(1500));
        t.miss();
        assert_eq!(t.sprites().len(), 2, "misses leave sprites alone");
        assert!(t.overlay().is_none());

        t.expire(start + Duration::from_millis(1999));
        assert_eq!(t.sprites().len(), 2);
        t.expire(start + Duration::from_millis(2000));
        assert_eq!(t.sprites().len(), 1);
        assert_eq!(t.sprites()[0].label, "b");
        t.expire(start + Duration::from_millis(3500));
        assert!(t.sprites().is_empty());
    }
}
