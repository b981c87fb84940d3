// input.rs — window events reduced to the pointer/wheel/resize vocabulary the viewer uses

use winit::event::MouseScrollDelta;

/// Pixels of pointer travel allowed between press and release for it to count as a click.
pub const CLICK_SLOP: f32 = 4.0;
/// Browser-style pixel delta for one wheel notch.
pub const LINE_HEIGHT_PX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    Click { x: f32, y: f32 },
    /// Negative scrolls up (zoom in).
    Wheel { delta_y: f32 },
    Resize { width: f32, height: f32 },
}

/// winit reports scroll-up as positive; flip to the browser convention.
pub fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

/// Turns raw button/cursor traffic into pointer events plus synthesized clicks.
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    cursor: Option<(f32, f32)>,
    pressed_at: Option<(f32, f32)>,
}

impl PointerTracker {
    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.cursor
    }

    pub fn moved(&mut self, x: f32, y: f32) -> InputEvent {
        self.cursor = Some((x, y));
        InputEvent::PointerMove { x, y }
    }

    pub fn pressed(&mut self) -> Option<InputEvent> {
        let (x, y) = self.cursor?;
        self.pressed_at = Some((x, y));
        Some(InputEvent::PointerDown { x, y })
    }

    /// Release events, followed by a click when the pointer barely moved.
    pub fn released(&mut self) -> Vec<InputEvent> {
        let Some((x, y)) = self.cursor else {
            self.pressed_at = None;
            return Vec::new();
        };
        let mut out = vec![InputEvent::PointerUp { x, y }];
        if let Some((px, py)) = self.pressed_at.take() {
            if (x - px).hypot(y - py) < CLICK_SLOP {
                out.push(InputEvent::Click { x, y });
            }
        }
        out
    }

    pub fn left(&mut self) {
        self.cursor = None;
    }
}
