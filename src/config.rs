//! Movement tuning.
//!
//! [`MovementParameters`] is the immutable per-archetype tuning injected into
//! the resolver. All speeds are in world units per second and all
//! accelerations in world units per second squared.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How gravity comes back after a dash float ends.
#[derive(Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityRampPolicy {
    /// Full suspension for the whole float, then full gravity.
    #[default]
    Instant,
    /// Full suspension for three quarters of the float, then half gravity
    /// for the last quarter, then full gravity.
    TwoStage,
}

impl GravityRampPolicy {
    /// Gravity multiplier held during the ramp stage.
    pub const RAMP_MULTIPLIER: f32 = 0.5;

    /// Fraction of the float spent in the ramp stage.
    pub const RAMP_FRACTION: f32 = 0.25;
}

/// Errors found while loading or validating [`MovementParameters`].
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("`{field}` must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{min_field}` ({min}) must not exceed `{max_field}` ({max})")]
    InvertedRange {
        min_field: &'static str,
        min: f32,
        max_field: &'static str,
        max: f32,
    },

    #[error("`traction` must lie in (0, 1] (got {0})")]
    Traction(f32),

    #[error("`down_dash_velocity` must point downward (got {0})")]
    DownDashVelocity(f32),

    #[error("`{0}` must be a non-zero direction")]
    ZeroDirection(&'static str),

    #[error("failed to parse movement parameters: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Per-character movement tuning.
///
/// One instance per character archetype. The resolver only reads it.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct MovementParameters {
    // === Ground ===
    /// Acceleration along the ground while input is held.
    pub ground_accel: f32,
    /// Speed the character snaps up to when starting to move.
    pub min_ground_speed: f32,
    /// Soft cap on ground speed.
    pub max_ground_speed: f32,
    /// Deceleration applied while above `max_ground_speed`.
    pub ground_speed_penalty: f32,
    /// Fraction of velocity retained per second while braking on the ground.
    pub traction: f32,
    /// Below this speed on both axes a braking character stops outright.
    pub stop_speed: f32,

    // === Sliding ===
    pub slide_accel: f32,
    pub min_slide_speed: f32,
    pub max_slide_speed: f32,

    // === Air ===
    pub air_accel: f32,
    pub max_air_speed: f32,

    // === Jumps ===
    pub jump_velocity: f32,
    pub short_jump_velocity: f32,
    pub air_jump_velocity: f32,
    /// Minimum horizontal speed an air jump gives in the held direction.
    pub min_air_jump_x_speed: f32,
    /// Air jumps restored on landing.
    pub max_air_jumps: u8,

    // === Dash ===
    /// Vertical velocity of a downward air dash. Negative.
    pub down_dash_velocity: f32,
    /// How long a dash suspends gravity, in seconds.
    pub dash_float_duration: f32,
    pub gravity_ramp: GravityRampPolicy,
    /// Also float after a ground dash on a non-flat slope.
    pub suspend_on_sloped_ground_dash: bool,

    // === Walls ===
    pub wall_slide_accel: f32,
    pub wall_upwards_slide_accel: f32,
    pub wall_slide_max_speed: f32,
    /// Launch direction when jumping off a wall on the character's left.
    pub wall_jump_left: Vec2,
    /// Launch direction when jumping off a wall on the character's right.
    pub wall_jump_right: Vec2,
    pub wall_jump_speed: f32,
    pub wall_run_speed: f32,
    pub wall_run_duration: f32,
    /// How long re-attaching to a wall is blocked after leaving it actively.
    pub wall_vault_duration: f32,

    // === Probes ===
    /// Inset applied to the collider edges the probe rays start from.
    pub collider_offset: f32,
    /// Length of the grounded check rays.
    pub raycast_down: f32,
    /// Length of the slope-following rays.
    pub raycast_down_slope: f32,
    /// Length of the wall check rays.
    pub raycast_horizontal: f32,
}

impl Default for MovementParameters {
    fn default() -> Self {
        Self {
            ground_accel: 7.5,
            min_ground_speed: 5.0,
            max_ground_speed: 15.0,
            ground_speed_penalty: 2.5,
            traction: 0.04,
            stop_speed: 1.5,

            slide_accel: 20.0,
            min_slide_speed: 2.5,
            max_slide_speed: 25.0,

            air_accel: 20.0,
            max_air_speed: 7.5,

            jump_velocity: 17.5,
            short_jump_velocity: 10.0,
            air_jump_velocity: 17.5,
            min_air_jump_x_speed: 7.5,
            max_air_jumps: 1,

            down_dash_velocity: -15.0,
            dash_float_duration: 0.25,
            gravity_ramp: GravityRampPolicy::Instant,
            suspend_on_sloped_ground_dash: false,

            wall_slide_accel: 15.0,
            wall_upwards_slide_accel: 50.0,
            wall_slide_max_speed: 7.5,
            wall_jump_left: Vec2::new(1.0, 1.0),
            wall_jump_right: Vec2::new(-1.0, 1.0),
            wall_jump_speed: 17.5,
            wall_run_speed: 17.5,
            wall_run_duration: 0.3,
            wall_vault_duration: 0.2,

            collider_offset: 0.02,
            raycast_down: 1.1,
            raycast_down_slope: 2.1,
            raycast_horizontal: 0.6,
        }
    }
}

impl MovementParameters {
    /// Tuning with long floats and soft air control.
    pub fn floaty() -> Self {
        Self {
            air_accel: 12.0,
            max_air_speed: 9.0,
            dash_float_duration: 0.4,
            gravity_ramp: GravityRampPolicy::TwoStage,
            wall_slide_max_speed: 5.0,
            ..default()
        }
    }

    /// Tuning with quick starts and hard stops.
    pub fn snappy() -> Self {
        Self {
            ground_accel: 15.0,
            min_ground_speed: 7.5,
            traction: 0.005,
            stop_speed: 2.5,
            air_accel: 30.0,
            dash_float_duration: 0.15,
            ..default()
        }
    }

    /// Parse parameters from RON and validate them.
    ///
    /// Missing fields take their default values.
    pub fn from_ron_str(source: &str) -> Result<Self, ParameterError> {
        let params: Self = ron::from_str(source)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Check for authoring errors.
    ///
    /// The resolver never calls this; hosts validate when loading tuning.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let non_negative = [
            ("min_ground_speed", self.min_ground_speed),
            ("max_ground_speed", self.max_ground_speed),
            ("ground_speed_penalty", self.ground_speed_penalty),
            ("stop_speed", self.stop_speed),
            ("min_slide_speed", self.min_slide_speed),
            ("max_slide_speed", self.max_slide_speed),
            ("max_air_speed", self.max_air_speed),
            ("jump_velocity", self.jump_velocity),
            ("short_jump_velocity", self.short_jump_velocity),
            ("air_jump_velocity", self.air_jump_velocity),
            ("min_air_jump_x_speed", self.min_air_jump_x_speed),
            ("dash_float_duration", self.dash_float_duration),
            ("wall_slide_max_speed", self.wall_slide_max_speed),
            ("wall_jump_speed", self.wall_jump_speed),
            ("wall_run_speed", self.wall_run_speed),
            ("wall_run_duration", self.wall_run_duration),
            ("wall_vault_duration", self.wall_vault_duration),
            ("collider_offset", self.collider_offset),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ParameterError::Negative { field, value });
            }
        }

        let positive = [
            ("ground_accel", self.ground_accel),
            ("slide_accel", self.slide_accel),
            ("air_accel", self.air_accel),
            ("wall_slide_accel", self.wall_slide_accel),
            ("wall_upwards_slide_accel", self.wall_upwards_slide_accel),
            ("raycast_down", self.raycast_down),
            ("raycast_down_slope", self.raycast_down_slope),
            ("raycast_horizontal", self.raycast_horizontal),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ParameterError::NotPositive { field, value });
            }
        }

        let ranges = [
            (
                ("min_ground_speed", self.min_ground_speed),
                ("max_ground_speed", self.max_ground_speed),
            ),
            (
                ("min_slide_speed", self.min_slide_speed),
                ("max_slide_speed", self.max_slide_speed),
            ),
        ];
        for ((min_field, min), (max_field, max)) in ranges {
            if min > max {
                return Err(ParameterError::InvertedRange {
                    min_field,
                    min,
                    max_field,
                    max,
                });
            }
        }

        if !(self.traction > 0.0 && self.traction <= 1.0) {
            return Err(ParameterError::Traction(self.traction));
        }
        if self.down_dash_velocity >= 0.0 {
            return Err(ParameterError::DownDashVelocity(self.down_dash_velocity));
        }
        if self.wall_jump_left.length_squared() == 0.0 {
            return Err(ParameterError::ZeroDirection("wall_jump_left"));
        }
        if self.wall_jump_right.length_squared() == 0.0 {
            return Err(ParameterError::ZeroDirection("wall_jump_right"));
        }

        Ok(())
    }

    /// Builder: set ground acceleration and speed limits.
    pub fn with_ground_movement(mut self, accel: f32, min_speed: f32, max_speed: f32) -> Self {
        self.ground_accel = accel;
        self.min_ground_speed = min_speed;
        self.max_ground_speed = max_speed;
        self
    }

    /// Builder: set air acceleration and speed cap.
    pub fn with_air_movement(mut self, accel: f32, max_speed: f32) -> Self {
        self.air_accel = accel;
        self.max_air_speed = max_speed;
        self
    }

    /// Builder: set the number of air jumps.
    pub fn with_max_air_jumps(mut self, jumps: u8) -> Self {
        self.max_air_jumps = jumps;
        self
    }

    /// Builder: set the gravity ramp policy used after dash floats.
    pub fn with_gravity_ramp(mut self, policy: GravityRampPolicy) -> Self {
        self.gravity_ramp = policy;
        self
    }

    /// Builder: set the dash float duration.
    pub fn with_dash_float_duration(mut self, seconds: f32) -> Self {
        self.dash_float_duration = seconds;
        self
    }

    /// Builder: float after ground dashes on slopes too.
    pub fn with_sloped_ground_dash_suspension(mut self, enabled: bool) -> Self {
        self.suspend_on_sloped_ground_dash = enabled;
        self
    }

    /// Builder: set wall vault and wall run timings.
    pub fn with_wall_timings(mut self, vault: f32, run: f32) -> Self {
        self.wall_vault_duration = vault;
        self.wall_run_duration = run;
        self
    }

    /// Builder: set probe ray lengths.
    pub fn with_raycasts(mut self, down: f32, down_slope: f32, horizontal: f32) -> Self {
        self.raycast_down = down;
        self.raycast_down_slope = down_slope;
        self.raycast_horizontal = horizontal;
        self
    }

    /// Normalized launch vector for a wall jump off the given side.
    pub fn wall_jump_direction(&self, wall_on_right: bool) -> Vec2 {
        let raw = if wall_on_right {
            self.wall_jump_right
        } else {
            self.wall_jump_left
        };
        raw.normalize_or_zero()
    }
}
