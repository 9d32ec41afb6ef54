//! Keyboard camera control.
//!
//! [`CameraController`] tracks which keys are held and, once per frame,
//! turns them into camera moves through [`CameraController::apply`].

use std::collections::HashMap;

use gltoolbox_core::Axis;
use gltoolbox_render::Camera;
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Step sizes used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Degrees rotated per frame while a rotation key is held.
    pub rotation_step: f64,
    /// Distance the center moves per frame while a move key is held.
    pub center_step: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            rotation_step: 2.5,
            center_step: 10.0,
        }
    }
}

/// A camera move triggered by a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAction {
    /// Rotate the eye around an axis. `sign` is `1.0` or `-1.0`.
    RotateEye { axis: Axis, sign: f64 },
    ZoomIn,
    ZoomOut,
    /// Move the look-at center along an axis. `sign` is `1.0` or `-1.0`.
    MoveCenter { axis: Axis, sign: f64 },
}

impl CameraAction {
    /// Applies one step of this action.
    pub fn apply(self, camera: &mut dyn Camera, config: &ControllerConfig) {
        match self {
            Self::RotateEye { axis, sign } => camera.rotate_eye(axis, sign * config.rotation_step),
            Self::ZoomIn => camera.zoom_in(),
            Self::ZoomOut => camera.zoom_out(),
            Self::MoveCenter { axis, sign } => camera.move_center(axis, sign * config.center_step),
        }
    }
}

fn default_bindings() -> HashMap<KeyCode, CameraAction> {
    let rotate = |axis, sign| CameraAction::RotateEye { axis, sign };
    let shift = |axis, sign| CameraAction::MoveCenter { axis, sign };
    HashMap::from([
        (KeyCode::KeyW, rotate(Axis::X, 1.0)),
        (KeyCode::KeyS, rotate(Axis::X, -1.0)),
        (KeyCode::KeyA, rotate(Axis::Y, -1.0)),
        (KeyCode::KeyD, rotate(Axis::Y, 1.0)),
        (KeyCode::KeyQ, rotate(Axis::Z, -1.0)),
        (KeyCode::KeyE, rotate(Axis::Z, 1.0)),
        (KeyCode::KeyN, CameraAction::ZoomIn),
        (KeyCode::KeyM, CameraAction::ZoomOut),
        (KeyCode::ArrowLeft, shift(Axis::X, -1.0)),
        (KeyCode::ArrowRight, shift(Axis::X, 1.0)),
        (KeyCode::ArrowDown, shift(Axis::Y, -1.0)),
        (KeyCode::ArrowUp, shift(Axis::Y, 1.0)),
        (KeyCode::PageDown, shift(Axis::Z, -1.0)),
        (KeyCode::PageUp, shift(Axis::Z, 1.0)),
    ])
}

/// Maps held keys to camera actions.
#[derive(Debug, Clone)]
pub struct CameraController {
    config: ControllerConfig,
    bindings: HashMap<KeyCode, CameraAction>,
    /// Held keys in press order.
    keys_down: Vec<KeyCode>,
}

impl CameraController {
    /// Creates a controller with the default key bindings.
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            bindings: default_bindings(),
            keys_down: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ControllerConfig) {
        self.config = config;
    }

    /// Binds `code` to `action`, returning the previous binding.
    pub fn bind(&mut self, code: KeyCode, action: CameraAction) -> Option<CameraAction> {
        self.bindings.insert(code, action)
    }

    /// Removes the binding of `code`.
    pub fn unbind(&mut self, code: KeyCode) -> Option<CameraAction> {
        self.bindings.remove(&code)
    }

    #[must_use]
    pub fn binding(&self, code: KeyCode) -> Option<CameraAction> {
        self.bindings.get(&code).copied()
    }

    /// Records a key press or release. Returns whether the key is bound.
    pub fn handle_key(&mut self, code: KeyCode, state: ElementState) -> bool {
        match state {
            ElementState::Pressed => {
                if !self.keys_down.contains(&code) {
                    self.keys_down.push(code);
                }
            }
            ElementState::Released => self.keys_down.retain(|&held| held != code),
        }
        self.bindings.contains_key(&code)
    }

    /// Feeds a window event. Non-keyboard events are ignored.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => self.handle_key(code, event.state),
                PhysicalKey::Unidentified(_) => false,
            },
            WindowEvent::Focused(false) => {
                self.release_all();
                false
            }
            _ => false,
        }
    }

    /// Forgets every held key.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
    }

    #[must_use]
    pub fn held_keys(&self) -> &[KeyCode] {
        &self.keys_down
    }

    /// Applies one step for each held, bound key in press order.
    ///
    /// Returns the number of actions applied.
    pub fn apply(&self, camera: &mut dyn Camera) -> usize {
        let mut applied = 0;
        for code in &self.keys_down {
            if let Some(action) = self.bindings.get(code) {
                action.apply(camera, &self.config);
                applied += 1;
            }
        }
        if applied > 0 {
            log::trace!("camera '{}' moved to {}", camera.name(), camera.eye());
        }
        applied
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
