//! Actor (player) state
//!
//! All per-player mutable state lives here: position, size, speed, the
//! current movement intent, and the status flags the effect scheduler
//! toggles. The input collaborator writes intent; the movement resolver and
//! effect scheduler mutate the rest.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::rect::Rect;

/// Which of the two racers an actor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// Index into the `[Actor; 2]` array.
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

/// Per-tick movement intent (key-down state mapped by the input layer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Intent {
    /// Swap up/down and left/right, as the ReverseControls effect demands.
    pub fn reversed(self) -> Self {
        Self {
            up: self.down,
            down: self.up,
            left: self.right,
            right: self.left,
        }
    }
}

/// A racer: axis-aligned rectangle with speed, intent, and status flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: PlayerId,
    /// Top-left corner, pixels
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Pixels per tick
    pub speed: f32,
    /// Speed in effect when Freeze hit, restored on thaw
    pub saved_speed: Option<f32>,
    pub frozen: bool,
    pub reversed_controls: bool,
    pub movements: Intent,
}

impl Actor {
    pub fn new(id: PlayerId, settings: &Settings) -> Self {
        Self {
            id,
            pos: settings.start_position(id),
            width: settings.player_width,
            height: settings.player_height,
            speed: settings.player_speed,
            saved_speed: None,
            frozen: false,
            reversed_controls: false,
            movements: Intent::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.width, self.height)
    }

    /// Footprint the actor would occupy at `pos`.
    pub fn rect_at(&self, pos: Vec2) -> Rect {
        Rect::from_pos_size(pos, self.width, self.height)
    }

    /// The intent the resolver should act on this tick.
    pub fn effective_intent(&self) -> Intent {
        if self.reversed_controls {
            self.movements.reversed()
        } else {
            self.movements
        }
    }

    /// Resize about the current center point.
    pub fn set_size_preserving_center(&mut self, width: f32, height: f32) {
        let center = self.rect().center();
        self.width = width;
        self.height = height;
        self.pos = center - Vec2::new(width / 2.0, height / 2.0);
    }

    /// Back to configured position, size, speed and clean flags.
    pub fn reset(&mut self, settings: &Settings) {
        *self = Actor::new(self.id, settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_intent_swaps_both_axes() {
        let intent = Intent {
            up: true,
            down: false,
            left: true,
            right: false,
        };
        let rev = intent.reversed();
        assert!(rev.down && rev.right);
        assert!(!rev.up && !rev.left);
    }

    #[test]
    fn resize_preserves_center() {
        let settings = Settings::default();
        let mut actor = Actor::new(PlayerId::One, &settings);
        let before = actor.rect().center();
        actor.set_size_preserving_center(actor.width * 2.0, actor.height * 2.0);
        let after = actor.rect().center();
        assert!((before - after).length() < 1e-3);
    }
}
