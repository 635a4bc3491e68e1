//! Surface probing.
//!
//! Rays are cast from the collider's edges against the ground surface set.
//! A hit is turned into a slope vector (unit tangent, x >= 0) which drives
//! both ground following and the wall test. Missing hits are plain `None`:
//! the resolver reads them as "unsupported this tick".

use bevy::prelude::*;

use crate::collision::{ColliderBounds, CollisionData};
use crate::config::MovementParameters;
use crate::state::WallSide;

/// Ray query against the ground surface set.
///
/// Implemented for any `FnMut(origin, direction, max_length)` closure so
/// backends and tests can supply their own geometry.
pub trait SurfaceCaster {
    fn cast(&mut self, origin: Vec2, direction: Vec2, max_length: f32) -> Option<CollisionData>;
}

impl<F> SurfaceCaster for F
where
    F: FnMut(Vec2, Vec2, f32) -> Option<CollisionData>,
{
    fn cast(&mut self, origin: Vec2, direction: Vec2, max_length: f32) -> Option<CollisionData> {
        self(origin, direction, max_length)
    }
}

/// Direction of a vertical probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Down,
    Up,
}

impl VerticalDirection {
    fn vector(self) -> Vec2 {
        match self {
            VerticalDirection::Down => Vec2::NEG_Y,
            VerticalDirection::Up => Vec2::Y,
        }
    }
}

/// Where the character's collider is this tick.
#[derive(Debug, Clone, Copy)]
pub struct ProbeFrame {
    pub position: Vec2,
    pub bounds: ColliderBounds,
    /// Inset applied to the edges the rays start from.
    pub inset: f32,
}

impl ProbeFrame {
    pub fn new(position: Vec2, bounds: ColliderBounds, inset: f32) -> Self {
        Self {
            position,
            bounds,
            inset,
        }
    }

    /// Origins on the left and right edges, at centre height.
    pub fn vertical_origins(&self) -> [Vec2; 2] {
        let dx = (self.bounds.half_width() - self.inset).max(0.0);
        [
            self.position - Vec2::new(dx, 0.0),
            self.position + Vec2::new(dx, 0.0),
        ]
    }

    /// Origins on the top and bottom edges, at centre width.
    pub fn horizontal_origins(&self) -> [Vec2; 2] {
        let dy = (self.bounds.half_height() - self.inset).max(0.0);
        [
            self.position + Vec2::new(0.0, dy),
            self.position - Vec2::new(0.0, dy),
        ]
    }
}

/// Cast from the left and right edges straight down or up.
pub fn probe_vertical(
    caster: &mut impl SurfaceCaster,
    frame: &ProbeFrame,
    length: f32,
    direction: VerticalDirection,
) -> [Option<CollisionData>; 2] {
    let dir = direction.vector();
    frame
        .vertical_origins()
        .map(|origin| caster.cast(origin, dir, length))
}

/// Cast from the top and bottom edges toward `side`.
pub fn probe_horizontal(
    caster: &mut impl SurfaceCaster,
    frame: &ProbeFrame,
    length: f32,
    side: WallSide,
) -> [Option<CollisionData>; 2] {
    let dir = Vec2::new(side.sign(), 0.0);
    frame
        .horizontal_origins()
        .map(|origin| caster.cast(origin, dir, length))
}

/// Unit tangent of the surface at `hit`, with x forced non-negative.
#[inline]
pub fn slope_vector_from_hit(hit: &CollisionData) -> Vec2 {
    hit.slope()
}

/// Whether a slope is steeper than 45 degrees.
#[inline]
pub fn is_wall_slope(slope: Vec2) -> bool {
    slope.y.abs() > slope.x
}

/// Whether either ray of a probe hit.
#[inline]
pub fn any_hit(hits: &[Option<CollisionData>; 2]) -> bool {
    hits.iter().any(Option::is_some)
}

/// The ground under the character, as seen by the slope-length down probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    /// Unit tangent to follow, x >= 0.
    pub slope: Vec2,
    /// Height the character's centre should be snapped to, when both rays hit.
    pub snap_y: Option<f32>,
}

impl GroundContact {
    /// Whether the surface is level.
    pub fn is_flat(&self) -> bool {
        self.slope.y.abs() <= FLAT_EPSILON
    }
}

const FLAT_EPSILON: f32 = 1e-3;

/// Derive the ground contact from the two down rays.
///
/// With both hits the higher one wins: it supplies the slope and the snap
/// height (`hit.y + half_height`). With one hit it supplies the slope and
/// there is no snap.
pub fn ground_contact(hits: [Option<CollisionData>; 2], half_height: f32) -> Option<GroundContact> {
    match hits {
        [Some(a), Some(b)] => {
            let higher = if b.point.y > a.point.y { b } else { a };
            Some(GroundContact {
                slope: slope_vector_from_hit(&higher),
                snap_y: Some(higher.point.y + half_height),
            })
        }
        [Some(hit), None] | [None, Some(hit)] => Some(GroundContact {
            slope: slope_vector_from_hit(&hit),
            snap_y: None,
        }),
        [None, None] => None,
    }
}

/// Tangent of the first ray hit that counts as a wall.
pub fn wall_tangent(hits: [Option<CollisionData>; 2]) -> Option<Vec2> {
    hits.into_iter()
        .flatten()
        .map(|hit| slope_vector_from_hit(&hit))
        .find(|slope| is_wall_slope(*slope))
}

/// Everything the resolver needs to know about nearby surfaces this tick.
///
/// Written by the backend's sensor systems, read by the resolver.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct SurfaceProbes {
    /// Either short down ray hit.
    pub grounded: bool,
    /// Result of the slope-length down probe.
    #[reflect(ignore)]
    pub ground: Option<GroundContact>,
    /// Wall tangent on the left, when touching a wall there.
    pub left_wall: Option<Vec2>,
    /// Wall tangent on the right, when touching a wall there.
    pub right_wall: Option<Vec2>,
}

impl SurfaceProbes {
    /// Run every probe for one tick.
    pub fn sample(
        caster: &mut impl SurfaceCaster,
        frame: &ProbeFrame,
        params: &MovementParameters,
    ) -> Self {
        let grounded = any_hit(&probe_vertical(
            caster,
            frame,
            params.raycast_down,
            VerticalDirection::Down,
        ));
        let ground = ground_contact(
            probe_vertical(
                caster,
                frame,
                params.raycast_down_slope,
                VerticalDirection::Down,
            ),
            frame.bounds.half_height(),
        );
        let left_wall = wall_tangent(probe_horizontal(
            caster,
            frame,
            params.raycast_horizontal,
            WallSide::Left,
        ));
        let right_wall = wall_tangent(probe_horizontal(
            caster,
            frame,
            params.raycast_horizontal,
            WallSide::Right,
        ));

        Self {
            grounded,
            ground,
            left_wall,
            right_wall,
        }
    }

    /// Wall tangent on `side`, if touching.
    pub fn wall(&self, side: WallSide) -> Option<Vec2> {
        match side {
            WallSide::Left => self.left_wall,
            WallSide::Right => self.right_wall,
        }
    }

    pub fn touches_wall(&self, side: WallSide) -> bool {
        self.wall(side).is_some()
    }
}
