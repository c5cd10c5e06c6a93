/// Appearance parameters of the displayed polyhedron
use serde::{Deserialize, Serialize};

use crate::geometry::FaceCount;

/// Mesh scale per unit of user-facing size
pub const POLY_SCALE: f32 = 0.3;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as `[0, 1]` floats
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// CSS `rgb(...)` notation
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn channel(self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.r, color.g, color.b]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Signed rotation rates; scaled by 0.001 into radians per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularVelocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AngularVelocity {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl Default for AngularVelocity {
    fn default() -> Self {
        Self::new(20.0, 20.0, 20.0)
    }
}

/// Current appearance of the polyhedron
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    pub face_count: FaceCount,
    pub size: f32,
    pub color: Rgb,
    pub velocity: AngularVelocity,
}

impl ShapeConfig {
    /// Uniform scale applied to the unit-sized geometry
    pub fn mesh_scale(&self) -> f32 {
        self.size * POLY_SCALE
    }

    /// Returns whether the geometry needs rebuilding
    pub fn set_face_count(&mut self, face_count: FaceCount) -> bool {
        let changed = self.face_count != face_count;
        self.face_count = face_count;
        changed
    }

    /// Non-positive and non-finite sizes are ignored
    pub fn set_size(&mut self, size: f32) -> bool {
        if !size.is_finite() || size <= 0.0 {
            tracing::trace!(size, "ignoring invalid size");
            return false;
        }
        self.size = size;
        true
    }

    pub fn set_color_channel(&mut self, channel: Channel, value: u8) {
        match channel {
            Channel::Red => self.color.r = value,
            Channel::Green => self.color.g = value,
            Channel::Blue => self.color.b = value,
        }
    }

    /// Non-finite rates are ignored
    pub fn set_velocity(&mut self, axis: Axis, value: f32) -> bool {
        if !value.is_finite() {
            tracing::trace!(?axis, value, "ignoring invalid velocity");
            return false;
        }
        match axis {
            Axis::X => self.velocity.x = value,
            Axis::Y => self.velocity.y = value,
            Axis::Z => self.velocity.z = value,
        }
        true
    }

    /// Copy with every numeric field passed through its setter; fields the
    /// setters reject keep their defaults
    pub fn sanitized(self) -> Self {
        let mut shape = Self {
            face_count: self.face_count,
            color: self.color,
            ..Self::default()
        };
        shape.set_size(self.size);
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            shape.set_velocity(axis, self.velocity.get(axis));
        }
        shape
    }
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            face_count: FaceCount::Cube,
            size: 30.0,
            color: Rgb::new(127, 127, 255),
            velocity: AngularVelocity::default(),
        }
    }
}
