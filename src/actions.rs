//! Discrete action handlers.
//!
//! Each handler checks its guard against the current state and is a silent
//! no-op when the guard fails. Handlers mutate the working velocity of the
//! tick in place; the continuous pass runs afterwards.

use bevy::prelude::*;

use crate::config::MovementParameters;
use crate::intent::{Action, MovementIntent};
use crate::probe::SurfaceProbes;
use crate::resolver::{is_surface_transient, signed_magnitude};
use crate::state::{ActorState, WallSide};

/// Read-only inputs shared by every handler during one tick.
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    pub params: &'a MovementParameters,
    pub intent: &'a MovementIntent,
    pub probes: &'a SurfaceProbes,
}

impl ActionContext<'_> {
    #[inline]
    fn grounded(&self) -> bool {
        self.probes.grounded
    }
}

/// Run the handler for `action`.
///
/// Returns `true` when the character was launched off the ground, which
/// skips the grounded model for the rest of the tick.
pub fn dispatch(
    action: Action,
    ctx: &ActionContext,
    state: &mut ActorState,
    velocity: &mut Vec2,
    launched: bool,
) -> bool {
    match action {
        Action::Jump => jump(ctx, state, velocity),
        Action::ShortJump => short_jump(ctx, state, velocity),
        Action::InstantJump => instant_jump(ctx, state, velocity),
        Action::Dash => {
            dash(ctx, state, velocity, launched);
            false
        }
    }
}

/// Guarded ground jump.
///
/// Allowed when grounded or inside the edge-jump window. Never lowers an
/// existing faster ascent. Always consumes the edge-jump window.
pub fn ground_jump(
    state: &mut ActorState,
    grounded: bool,
    jump_velocity: f32,
    velocity: &mut Vec2,
) -> bool {
    let allowed = grounded || state.edge_jump;
    state.edge_jump = false;
    if allowed {
        velocity.y = jump_velocity.max(velocity.y);
    }
    allowed
}

/// Arm the edge-jump window if the ground was left on the previous tick.
fn arm_edge_jump(ctx: &ActionContext, state: &mut ActorState) {
    if !ctx.grounded() && state.last_frame_grounded {
        trace!("Edge jump armed");
        state.edge_jump = true;
    }
}

/// Full-height ground jump.
pub fn jump(ctx: &ActionContext, state: &mut ActorState, velocity: &mut Vec2) -> bool {
    arm_edge_jump(ctx, state);
    let jumped = ground_jump(state, ctx.grounded(), ctx.params.jump_velocity, velocity);
    if jumped {
        debug!("Ground jump: vy={:.2}", velocity.y);
    }
    jumped
}

/// Reduced-height ground jump.
pub fn short_jump(ctx: &ActionContext, state: &mut ActorState, velocity: &mut Vec2) -> bool {
    arm_edge_jump(ctx, state);
    let jumped = ground_jump(state, ctx.grounded(), ctx.params.short_jump_velocity, velocity);
    if jumped {
        debug!("Short jump: vy={:.2}", velocity.y);
    }
    jumped
}

/// Wall jump on a wall, ground jump on or just off the ground, air jump
/// otherwise.
///
/// A wall jump taken while standing counts as a launch.
pub fn instant_jump(ctx: &ActionContext, state: &mut ActorState, velocity: &mut Vec2) -> bool {
    if let Some(side) = state.attached_wall() {
        wall_jump(ctx.params, state, side, velocity);
        return ctx.grounded() || state.last_frame_grounded;
    }

    if ctx.grounded() || state.last_frame_grounded {
        return jump(ctx, state, velocity);
    }

    air_jump(ctx, state, velocity);
    false
}

fn wall_jump(params: &MovementParameters, state: &mut ActorState, side: WallSide, velocity: &mut Vec2) {
    *velocity = params.wall_jump_direction(side == WallSide::Right) * params.wall_jump_speed;
    state.start_wall_vault(params);
    state.facing_right = side.away() > 0.0;
    state.reset_wall_run();
    state.detach_from_wall();
    debug!("Wall jump off {:?} wall: velocity={:?}", side, *velocity);
}

/// Air jump with a minimum horizontal kick toward the held direction.
///
/// Does nothing when the budget is spent.
pub fn air_jump(ctx: &ActionContext, state: &mut ActorState, velocity: &mut Vec2) -> bool {
    if !state.attempt_jump() {
        trace!("Air jump ignored, none left");
        return false;
    }

    let kick = ctx.params.min_air_jump_x_speed;
    let direction = ctx.intent.horizontal_direction();
    if direction > 0.0 {
        velocity.x = velocity.x.max(kick);
    } else if direction < 0.0 {
        velocity.x = velocity.x.min(-kick);
    }
    velocity.y = ctx.params.air_jump_velocity;
    state.update_direction(velocity.x);
    state.reset_wall_run();

    debug!("Air jump: air_jumps remaining {}", state.air_jumps);
    true
}

/// Dash toward the held direction, or the facing direction without input.
///
/// `launched` is set when a ground jump already fired this tick; the dash
/// then only adds horizontal speed and keeps the ascent.
pub fn dash(ctx: &ActionContext, state: &mut ActorState, velocity: &mut Vec2, launched: bool) {
    let params = ctx.params;
    let direction = if ctx.intent.is_moving() {
        ctx.intent.horizontal_direction()
    } else {
        state.facing_sign()
    };

    if let Some(side) = state.attached_wall() {
        *velocity = Vec2::new(side.away() * params.max_ground_speed, 0.0);
        state.start_wall_vault(params);
        state.suspend_gravity(params);
        state.detach_from_wall();
        state.facing_right = side.away() > 0.0;
        debug!("Wall dash off {:?} wall", side);
        return;
    }

    let ground = ctx.probes.ground.filter(|_| ctx.grounded() || state.last_frame_grounded);
    if launched && ground.is_some() {
        if velocity.x * direction < params.max_ground_speed {
            velocity.x = direction * params.max_ground_speed;
        }
        state.update_direction(velocity.x);
        debug!("Jump dash: velocity={:?}", *velocity);
        return;
    }
    if let Some(contact) = ground {
        let mut magnitude = if is_surface_transient(*velocity, contact.slope) {
            0.0
        } else {
            signed_magnitude(*velocity)
        };
        if magnitude * direction < params.max_ground_speed {
            magnitude = direction * params.max_ground_speed;
        }
        *velocity = contact.slope * magnitude;
        state.update_direction(velocity.x);

        if contact.is_flat() || params.suspend_on_sloped_ground_dash {
            state.suspend_gravity(params);
        }
        debug!("Ground dash: velocity={:?}", *velocity);
        return;
    }

    if ctx.intent.is_looking_down() && velocity.y <= 0.0 {
        velocity.y = params.down_dash_velocity;
        state.cancel_gravity_suspension();
        debug!("Down dash");
    } else if state.attempt_jump() {
        *velocity = Vec2::new(direction * params.max_ground_speed, 0.0);
        state.update_direction(velocity.x);
        state.suspend_gravity(params);
        debug!("Air dash: air_jumps remaining {}", state.air_jumps);
    } else {
        trace!("Air dash ignored, none left");
    }
}
