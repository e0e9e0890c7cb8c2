//! Translates winit input events into camera commands.
//!
//! The controller never talks to the window itself: the application forwards
//! events, and once per frame calls [`CameraController::update`] with the
//! elapsed time.

use std::collections::HashSet;

use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::camera::{Camera, Movement};

/// Roughly how many pixels a touchpad reports for one wheel notch.
const PIXELS_PER_LINE: f32 = 20.0;

/// Arrow-key turn rate, in look units per second (scaled by the camera's
/// mouse sensitivity like any other look delta).
pub const KEY_LOOK_SPEED: f32 = 100.0;

#[derive(Debug, Default)]
pub struct CameraController {
    held: HashSet<Movement>,
    turning: HashSet<KeyCode>,
    look_x: f32,
    look_y: f32,
    scroll: f32,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key drives the camera. WASD, Space and left
    /// Shift move; the arrow keys turn.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        if matches!(
            key,
            KeyCode::ArrowLeft | KeyCode::ArrowRight | KeyCode::ArrowUp | KeyCode::ArrowDown
        ) {
            match state {
                ElementState::Pressed => self.turning.insert(key),
                ElementState::Released => self.turning.remove(&key),
            };
            return true;
        }

        let movement = match key {
            KeyCode::KeyW => Movement::Forward,
            KeyCode::KeyS => Movement::Backward,
            KeyCode::KeyA => Movement::Left,
            KeyCode::KeyD => Movement::Right,
            KeyCode::Space => Movement::Up,
            KeyCode::ShiftLeft => Movement::Down,
            _ => return false,
        };
        match state {
            ElementState::Pressed => self.held.insert(movement),
            ElementState::Released => self.held.remove(&movement),
        };
        true
    }

    /// Raw mouse motion (e.g. `DeviceEvent::MouseMotion`). Screen y grows
    /// downwards, so it is inverted to make "mouse up" mean "look up".
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.look_x += dx as f32;
        self.look_y -= dy as f32;
    }

    /// Absolute cursor position. The first sample only seeds the tracker so the
    /// camera does not jump when the cursor enters the window.
    pub fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if let Some(last) = self.last_cursor {
            self.handle_mouse(position.x - last.x, position.y - last.y);
        }
        self.last_cursor = Some(position);
    }

    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / PIXELS_PER_LINE,
        };
    }

    /// Returns `true` if the event was consumed.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.process_keyboard(*key, *state),
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor(*position);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_scroll(delta);
                true
            }
            WindowEvent::Focused(false) => {
                self.held.clear();
                self.turning.clear();
                false
            }
            _ => false,
        }
    }

    pub fn is_held(&self, movement: Movement) -> bool {
        self.held.contains(&movement)
    }

    pub fn is_turning(&self, key: KeyCode) -> bool {
        self.turning.contains(&key)
    }

    /// Apply all input gathered since the previous frame.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        for movement in &self.held {
            camera.process_movement(*movement, dt);
        }

        let turn = KEY_LOOK_SPEED * dt;
        for key in &self.turning {
            match key {
                KeyCode::ArrowLeft => self.look_x -= turn,
                KeyCode::ArrowRight => self.look_x += turn,
                KeyCode::ArrowUp => self.look_y += turn,
                KeyCode::ArrowDown => self.look_y -= turn,
                _ => {}
            }
        }

        if self.look_x != 0.0 || self.look_y != 0.0 {
            camera.process_look(self.look_x, self.look_y, true);
            self.look_x = 0.0;
            self.look_y = 0.0;
        }

        if self.scroll != 0.0 {
            camera.process_zoom(self.scroll);
            self.scroll = 0.0;
        }
    }
}
