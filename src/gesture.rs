//! Hand landmarks to animation controls.
//!
//! Coordinates are normalized image coordinates: `x` grows to the right and
//! `y` grows downward, so a raised fingertip has a *smaller* `y` than its PIP
//! joint.

use crate::morph::{AnimationState, SCALE_MAX, SCALE_MIN};
use crate::shapes::ShapeKind;
use glam::Vec3;
use std::fmt;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// (tip, pip) pairs for index, middle, ring and pinky.
const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

const THUMB_OPEN_RATIO: f32 = 0.5;
const PINCH_GAIN: f32 = 10.0;
const ROTATION_GAIN: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance in the image plane; depth is ignored.
    pub fn dist_2d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One detected hand: the fixed 21-point skeleton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks(pub [Landmark; LANDMARK_COUNT]);

impl HandLandmarks {
    pub fn point(&self, idx: usize) -> &Landmark {
        &self.0[idx]
    }

    pub fn point_mut(&mut self, idx: usize) -> &mut Landmark {
        &mut self.0[idx]
    }

    pub fn raised_fingers(&self) -> u8 {
        FINGERS
            .iter()
            .filter(|&&(tip, pip)| self.0[tip].y < self.0[pip].y)
            .count() as u8
    }

    pub fn hand_span(&self) -> f32 {
        self.0[WRIST].dist_2d(&self.0[MIDDLE_MCP])
    }

    pub fn thumb_open(&self) -> bool {
        self.0[THUMB_TIP].dist_2d(&self.0[INDEX_MCP]) > self.hand_span() * THUMB_OPEN_RATIO
    }

    pub fn finger_count(&self) -> u8 {
        self.raised_fingers() + u8::from(self.thumb_open())
    }

    pub fn pinch_distance(&self) -> f32 {
        self.0[THUMB_TIP].dist_2d(&self.0[INDEX_TIP])
    }
}

/// Everything one detected hand asks of the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStateDelta {
    pub fingers: u8,
    /// `None` when the finger count selects nothing (a closed fist).
    pub shape: Option<ShapeKind>,
    pub scale_factor: f32,
    pub hue: f32,
    pub base_color: Vec3,
    pub rotation_x: f32,
    pub rotation_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate {
    NoHand,
    Hand(AnimationStateDelta),
}

pub fn shape_for_fingers(fingers: u8) -> Option<ShapeKind> {
    match fingers {
        0 => None,
        1 => Some(ShapeKind::Heart),
        2 => Some(ShapeKind::Flower),
        3 => Some(ShapeKind::Saturn),
        4 => Some(ShapeKind::MilkyWay),
        _ => Some(ShapeKind::Fireworks),
    }
}

pub fn pinch_to_scale(distance: f32) -> f32 {
    (distance * PINCH_GAIN).clamp(SCALE_MIN, SCALE_MAX)
}

pub fn map(hand: Option<&HandLandmarks>) -> GestureUpdate {
    let Some(hand) = hand else {
        return GestureUpdate::NoHand;
    };

    let fingers = hand.finger_count();
    let anchor = hand.point(MIDDLE_MCP);
    let hue = anchor.x.rem_euclid(1.0);

    GestureUpdate::Hand(AnimationStateDelta {
        fingers,
        shape: shape_for_fingers(fingers),
        scale_factor: pinch_to_scale(hand.pinch_distance()),
        hue,
        base_color: hsl_to_rgb(hue, 1.0, 0.5),
        rotation_x: (anchor.y - 0.5) * ROTATION_GAIN,
        rotation_y: (anchor.x - 0.5) * ROTATION_GAIN,
    })
}

/// What the UI should say after an update was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStatus {
    NoHand,
    Hand { fingers: u8, shape: ShapeKind },
}

impl fmt::Display for GestureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHand => f.write_str("Status: No hand detected"),
            Self::Hand { fingers, shape } => {
                write!(f, "Status: {fingers} Fingers Detected -> {}", shape.label())
            }
        }
    }
}

/// Applies an update. A missing hand leaves every field as it was.
pub fn apply(update: &GestureUpdate, state: &mut AnimationState) -> GestureStatus {
    match update {
        GestureUpdate::NoHand => GestureStatus::NoHand,
        GestureUpdate::Hand(delta) => {
            if let Some(shape) = delta.shape {
                state.active_shape = shape;
            }
            state.scale_factor = delta.scale_factor;
            state.base_color = delta.base_color;
            state.rotation.x = delta.rotation_x;
            state.rotation.y = delta.rotation_y;
            GestureStatus::Hand {
                fingers: delta.fingers,
                shape: state.active_shape,
            }
        }
    }
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}
