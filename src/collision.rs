//! Raw surface query results.
//!
//! These structures carry what a single ray query against the ground surface
//! set reports, plus the collider extents used to place the rays.

use bevy::prelude::*;

/// Information about a single ray hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// Normal of the surface at the hit point.
    pub normal: Vec2,
    /// World position of the hit point.
    pub point: Vec2,
    /// Entity that was hit (if known).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec2, point: Vec2, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }

    /// Unit tangent of the hit surface, oriented toward positive x.
    ///
    /// A degenerate (zero) normal yields a flat tangent.
    pub fn slope(&self) -> Vec2 {
        let tangent = self.normal.perp();
        let oriented = if tangent.x < 0.0 { -tangent } else { tangent };
        let slope = oriented.normalize_or_zero();
        if slope == Vec2::ZERO {
            Vec2::X
        } else {
            slope
        }
    }
}

/// Axis-aligned extents of the character's collider.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ColliderBounds {
    /// Half width and half height of the collider.
    pub half_extents: Vec2,
}

impl Default for ColliderBounds {
    fn default() -> Self {
        Self {
            half_extents: Vec2::new(0.5, 1.0),
        }
    }
}

impl ColliderBounds {
    /// Bounds from full width and height.
    pub fn from_size(size: Vec2) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }

    /// Bounds from half extents.
    pub fn from_half_extents(half_extents: Vec2) -> Self {
        Self { half_extents }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.half_extents.x
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        self.half_extents.y
    }
}
