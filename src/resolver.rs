//! The movement resolver.
//!
//! One call to [`resolve_tick`] advances a single character by one fixed
//! tick: timers, bookkeeping, queued actions, then the continuous movement
//! model picked by priority:
//!
//! 1. attached to the right wall
//! 2. attached to the left wall
//! 3. grounded now or grounded last tick
//! 4. airborne
//!
//! The velocity models themselves are pure functions of their inputs.

use bevy::prelude::*;

use crate::actions::{self, ActionContext};
use crate::config::MovementParameters;
use crate::intent::MovementIntent;
use crate::probe::{is_wall_slope, SurfaceProbes};
use crate::state::{ActorState, MovementMode, WallSide};

/// Vertical speed allowed above horizontal speed before a tick counts as a
/// launch or landing.
pub const TRANSIENT_EPSILON: f32 = 0.1;

/// Slack used when comparing travel direction against intent.
const DIRECTION_EPSILON: f32 = 0.001;

/// Physics body values read at the start of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodySnapshot {
    pub velocity: Vec2,
    pub position: Vec2,
}

impl BodySnapshot {
    pub fn new(velocity: Vec2, position: Vec2) -> Self {
        Self { velocity, position }
    }
}

/// What the resolver wants written back to the physics body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyCommands {
    pub velocity: Vec2,
    pub gravity_multiplier: f32,
    /// New position when the character was snapped onto the ground.
    pub snap_position: Option<Vec2>,
}

/// Length of `velocity`, signed by its x component (x = 0 counts as positive).
#[inline]
pub fn signed_magnitude(velocity: Vec2) -> f32 {
    let magnitude = velocity.length();
    if velocity.x < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Whether the body is launching off or landing onto the surface this tick.
///
/// Vertical speed must dominate horizontal speed and the velocity must be
/// steeper than the surface, so sliding down a steep slope is not a launch.
pub fn is_surface_transient(velocity: Vec2, slope: Vec2) -> bool {
    let vx = velocity.x.abs();
    let vy = velocity.y.abs();
    if vy <= vx + TRANSIENT_EPSILON {
        return false;
    }
    vy * slope.x.abs() > slope.y.abs() * vx + TRANSIENT_EPSILON
}

/// Ground velocity for one tick.
///
/// Returns `velocity` unchanged when there is no slope or the tick is a
/// launch/landing transient.
pub fn grounded_velocity(
    params: &MovementParameters,
    intent: &MovementIntent,
    velocity: Vec2,
    slope: Option<Vec2>,
    dt: f32,
) -> Vec2 {
    let Some(slope) = slope else {
        return velocity;
    };
    if is_surface_transient(velocity, slope) {
        return velocity;
    }

    let sliding = intent.is_looking_down() && is_wall_slope(slope);
    let (accel, min_speed, max_speed, direction) = if sliding {
        // slope.x >= 0, so a rising tangent means downhill is -x
        let downhill = if slope.y > 0.0 { -1.0 } else { 1.0 };
        (
            params.slide_accel,
            params.min_slide_speed,
            params.max_slide_speed,
            downhill,
        )
    } else {
        (
            params.ground_accel,
            params.min_ground_speed,
            params.max_ground_speed,
            intent.horizontal_direction(),
        )
    };

    let magnitude = signed_magnitude(velocity);
    let mut updated = magnitude + direction * accel * dt;

    let moving_into_intent = direction != 0.0 && magnitude * direction > -DIRECTION_EPSILON;
    if moving_into_intent {
        let speed = updated.abs();
        if speed < min_speed {
            updated = min_speed * direction;
        } else if speed > max_speed {
            // Bleed overshoot instead of clamping
            updated = (magnitude.abs() - params.ground_speed_penalty * dt).max(max_speed) * direction;
        }
    } else {
        if velocity.x.abs() <= params.stop_speed && velocity.y.abs() <= params.stop_speed {
            return Vec2::ZERO;
        }
        updated *= params.traction.powf(dt);
    }

    slope * updated
}

/// Air velocity for one tick. Vertical velocity is left to gravity.
pub fn airborne_velocity(
    params: &MovementParameters,
    intent: &MovementIntent,
    velocity: Vec2,
    dt: f32,
) -> Vec2 {
    let cap = params.max_air_speed;
    let mut x = velocity.x + intent.horizontal_direction() * params.air_accel * dt;
    if x > cap {
        x = velocity.x.max(cap);
    } else if x < -cap {
        x = velocity.x.min(-cap);
    }
    Vec2::new(x, velocity.y)
}

/// Wall velocity for one tick while attached to `side`.
///
/// Input away from the wall detaches immediately and returns `velocity`
/// untouched. `tangent` is the wall's surface tangent from the probe.
pub fn wall_velocity(
    params: &MovementParameters,
    state: &mut ActorState,
    intent: &MovementIntent,
    side: WallSide,
    tangent: Option<Vec2>,
    velocity: Vec2,
    dt: f32,
) -> Vec2 {
    if side.is_away(intent.horizontal) {
        debug!("Detached from {:?} wall", side);
        state.detach_from_wall();
        return velocity;
    }

    if intent.is_looking_up() && !state.wall_running && state.attempt_wall_run() {
        debug!("Wall run started on {:?} wall", side);
        state.start_wall_run(params);
    }

    if state.wall_running {
        let tangent = tangent.unwrap_or(Vec2::Y);
        let up = if tangent.y < 0.0 { -tangent } else { tangent };
        return up * params.wall_run_speed;
    }

    let mut vy = velocity.y;
    if vy > 0.0 {
        vy -= params.wall_upwards_slide_accel * dt;
    } else {
        vy -= params.wall_slide_accel * dt;
    }
    Vec2::new(velocity.x, vy.max(-params.wall_slide_max_speed))
}

/// Per-tick flag maintenance that runs regardless of the chosen model.
pub fn bookkeeping(
    params: &MovementParameters,
    state: &mut ActorState,
    intent: &MovementIntent,
    probes: &SurfaceProbes,
    velocity: Vec2,
) {
    if probes.grounded {
        if !state.last_frame_grounded {
            debug!("Landed, air jumps reset to {}", params.max_air_jumps);
        }
        state.gravity_multiplier = 0.0;
        state.update_direction(velocity.x);
        state.reset_jumps(params.max_air_jumps);
        state.reset_wall_run();
        state.detach_from_wall();
        state.edge_jump = false;
    } else {
        if state.last_frame_grounded {
            trace!("Left the ground");
        }
        state.gravity_multiplier = state.airborne_gravity_multiplier();
    }

    for side in [WallSide::Left, WallSide::Right] {
        let attached = match side {
            WallSide::Left => state.on_left_wall,
            WallSide::Right => state.on_right_wall,
        };
        if !probes.touches_wall(side) {
            if attached {
                debug!("Lost contact with {:?} wall", side);
                state.set_wall_flag(side, false);
                if !state.is_wall_attached() {
                    state.stop_wall_run();
                }
            }
        } else if !attached && !state.wall_vaulted && side.is_toward(intent.horizontal) {
            debug!("Attached to {:?} wall", side);
            state.set_wall_flag(side, true);
        }
    }
}

/// Advance one character by one tick.
///
/// Drains the intent's queued actions. The returned commands must be
/// written to the physics body.
pub fn resolve_tick(
    params: &MovementParameters,
    state: &mut ActorState,
    intent: &mut MovementIntent,
    probes: &SurfaceProbes,
    body: BodySnapshot,
    dt: f32,
) -> BodyCommands {
    state.advance_timers(dt, params);
    bookkeeping(params, state, intent, probes, body.velocity);

    let mut velocity = body.velocity;
    let mut launched = false;
    let pending = intent.take_actions();
    {
        let ctx = ActionContext {
            params,
            intent: &*intent,
            probes,
        };
        for action in pending.iter() {
            launched |= actions::dispatch(action, &ctx, state, &mut velocity, launched);
        }
    }

    let mut snap_position = None;
    let mode = match state.attached_wall() {
        Some(side) => {
            velocity = wall_velocity(
                params,
                state,
                intent,
                side,
                probes.wall(side),
                velocity,
                dt,
            );
            if state.is_wall_attached() {
                state.gravity_multiplier = 0.0;
                MovementMode::WallAttached(side)
            } else if probes.grounded {
                MovementMode::Grounded
            } else {
                MovementMode::Airborne
            }
        }
        None if !launched && (probes.grounded || state.last_frame_grounded) => {
            let slope = probes.ground.map(|contact| contact.slope);
            let updated = grounded_velocity(params, intent, velocity, slope, dt);
            let recomputed = slope.is_some_and(|slope| !is_surface_transient(velocity, slope));
            if recomputed {
                snap_position = probes
                    .ground
                    .and_then(|contact| contact.snap_y)
                    .map(|y| Vec2::new(body.position.x, y));
            }
            velocity = updated;
            if probes.grounded {
                MovementMode::Grounded
            } else {
                MovementMode::Airborne
            }
        }
        None => {
            velocity = airborne_velocity(params, intent, velocity, dt);
            if probes.grounded {
                MovementMode::Grounded
            } else {
                MovementMode::Airborne
            }
        }
    };

    if mode != state.mode {
        trace!("Movement mode {:?} -> {:?}", state.mode, mode);
        state.mode = mode;
    }
    // A launch spends the coyote window
    state.last_frame_grounded = probes.grounded && !launched;

    BodyCommands {
        velocity,
        gravity_multiplier: state.gravity_multiplier,
        snap_position,
    }
}
