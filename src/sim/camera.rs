//! Camera follow controller
//!
//! The camera is derived state: it chases the ship, never drives gameplay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_SMOOTHING, VIEW_HEIGHT, VIEW_WIDTH};

/// Viewport origin (top-left corner) in world coordinates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
}

impl Camera {
    /// Viewport origin that centers the given world point
    fn target_for(focus: Vec2) -> Vec2 {
        focus - Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0)
    }

    /// Exponentially approach the focus point. Non-finite targets skip the
    /// update for this frame instead of propagating NaN into the transform.
    pub fn follow(&mut self, focus: Vec2) {
        let target = Self::target_for(focus);
        if !target.is_finite() {
            log::warn!("camera target not finite, skipping update");
            return;
        }
        self.pos += (target - self.pos) * CAMERA_SMOOTHING;
    }

    /// Jump straight to the focus point (level reset)
    pub fn snap_to(&mut self, focus: Vec2) {
        let target = Self::target_for(focus);
        if target.is_finite() {
            self.pos = target;
        }
    }
}
