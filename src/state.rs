//! Actor state.
//!
//! [`ActorState`] is the mutable per-character record the resolver and the
//! action handlers work on. The marker components at the bottom mirror the
//! resolved [`MovementMode`] onto the entity for queries.

use bevy::prelude::*;

use crate::config::{GravityRampPolicy, MovementParameters};
use crate::intent::MovementIntent;
use crate::probe::SurfaceProbes;
use crate::timers::{ActorTimers, TimerKind};

/// Side of the character a wall is on.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    /// -1 for left, 1 for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
        }
    }

    /// Horizontal direction pointing away from this wall.
    #[inline]
    pub fn away(self) -> f32 {
        -self.sign()
    }

    /// Whether a horizontal input points into this wall.
    #[inline]
    pub fn is_toward(self, horizontal: f32) -> bool {
        horizontal * self.sign() > 0.0
    }

    /// Whether a horizontal input points away from this wall.
    #[inline]
    pub fn is_away(self, horizontal: f32) -> bool {
        horizontal * self.sign() < 0.0
    }
}

/// Which movement model resolved the last tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    Grounded,
    #[default]
    Airborne,
    WallAttached(WallSide),
}

/// Mutable per-character movement state.
///
/// Inserting it pulls in the intent, tuning and probe components the
/// resolver reads.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(MovementIntent, MovementParameters, SurfaceProbes)]
pub struct ActorState {
    pub facing_right: bool,
    /// Air jumps left before the next landing.
    pub air_jumps: u8,
    /// Whether the grounded probe hit on the previous tick.
    pub last_frame_grounded: bool,
    /// Coyote-time permission for a ground jump.
    pub edge_jump: bool,
    pub on_left_wall: bool,
    pub on_right_wall: bool,
    /// Wall re-attachment is locked while set.
    pub wall_vaulted: bool,
    pub wall_running: bool,
    /// One wall run per wall contact.
    pub has_wall_run: bool,
    pub gravity_suspended: bool,
    /// Gravity multiplier to hand to the physics body.
    pub gravity_multiplier: f32,
    /// Model used by the last resolved tick.
    pub mode: MovementMode,
    #[reflect(ignore)]
    pub timers: ActorTimers,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            facing_right: true,
            air_jumps: 1,
            last_frame_grounded: true,
            edge_jump: false,
            on_left_wall: false,
            on_right_wall: false,
            wall_vaulted: false,
            wall_running: false,
            has_wall_run: true,
            gravity_suspended: false,
            gravity_multiplier: 1.0,
            mode: MovementMode::default(),
            timers: ActorTimers::default(),
        }
    }
}

impl ActorState {
    /// Fresh state with the air-jump budget from `params`.
    pub fn new(params: &MovementParameters) -> Self {
        Self {
            air_jumps: params.max_air_jumps,
            ..default()
        }
    }

    /// Restore the air-jump budget. Called on landing.
    pub fn reset_jumps(&mut self, max_air_jumps: u8) {
        self.air_jumps = max_air_jumps;
    }

    /// Consume an air jump if one is left.
    pub fn attempt_jump(&mut self) -> bool {
        if self.air_jumps > 0 {
            self.air_jumps -= 1;
            true
        } else {
            false
        }
    }

    /// Make a wall run available again. Called on landing and on wall jumps.
    pub fn reset_wall_run(&mut self) {
        self.has_wall_run = true;
    }

    /// Consume the wall run if it is available.
    pub fn attempt_wall_run(&mut self) -> bool {
        std::mem::replace(&mut self.has_wall_run, false)
    }

    /// Face the direction of a horizontal velocity, ignoring near-zero speeds.
    pub fn update_direction(&mut self, x_velocity: f32) {
        if x_velocity > 0.001 {
            self.facing_right = true;
        }
        if x_velocity < -0.001 {
            self.facing_right = false;
        }
    }

    /// -1 when facing left, 1 when facing right.
    #[inline]
    pub fn facing_sign(&self) -> f32 {
        if self.facing_right {
            1.0
        } else {
            -1.0
        }
    }

    /// The wall the character is attached to. Right wins if both are set.
    pub fn attached_wall(&self) -> Option<WallSide> {
        if self.on_right_wall {
            Some(WallSide::Right)
        } else if self.on_left_wall {
            Some(WallSide::Left)
        } else {
            None
        }
    }

    pub fn is_wall_attached(&self) -> bool {
        self.on_left_wall || self.on_right_wall
    }

    pub fn set_wall_flag(&mut self, side: WallSide, attached: bool) {
        match side {
            WallSide::Left => self.on_left_wall = attached,
            WallSide::Right => self.on_right_wall = attached,
        }
    }

    /// Clear both wall flags and stop any wall run.
    pub fn detach_from_wall(&mut self) {
        self.on_left_wall = false;
        self.on_right_wall = false;
        self.stop_wall_run();
    }

    /// Start the wall-run timer and flag.
    pub fn start_wall_run(&mut self, params: &MovementParameters) {
        self.wall_running = true;
        self.timers.start(TimerKind::WallRun, params.wall_run_duration);
    }

    pub fn stop_wall_run(&mut self) {
        self.wall_running = false;
        self.timers.cancel(TimerKind::WallRun);
    }

    /// Lock wall re-attachment for the vault duration.
    pub fn start_wall_vault(&mut self, params: &MovementParameters) {
        self.wall_vaulted = true;
        self.timers.start(TimerKind::WallVault, params.wall_vault_duration);
    }

    /// Zero gravity for a dash float.
    ///
    /// Under [`GravityRampPolicy::TwoStage`] the full suspension covers three
    /// quarters of the float and the ramp stage the rest.
    pub fn suspend_gravity(&mut self, params: &MovementParameters) {
        let full = match params.gravity_ramp {
            GravityRampPolicy::Instant => params.dash_float_duration,
            GravityRampPolicy::TwoStage => {
                params.dash_float_duration * (1.0 - GravityRampPolicy::RAMP_FRACTION)
            }
        };
        self.gravity_suspended = true;
        self.gravity_multiplier = 0.0;
        self.timers.cancel(TimerKind::GravityRamp);
        self.timers.start(TimerKind::GravitySuspension, full);
    }

    /// Gravity multiplier to use while off the ground.
    ///
    /// Half gravity during the ramp stage, none during the full float.
    pub fn airborne_gravity_multiplier(&self) -> f32 {
        if self.timers.is_active(TimerKind::GravityRamp) {
            GravityRampPolicy::RAMP_MULTIPLIER
        } else if self.gravity_suspended {
            0.0
        } else {
            1.0
        }
    }

    /// End any dash float immediately and restore full gravity.
    pub fn cancel_gravity_suspension(&mut self) {
        self.gravity_suspended = false;
        self.gravity_multiplier = 1.0;
        self.timers.cancel(TimerKind::GravitySuspension);
        self.timers.cancel(TimerKind::GravityRamp);
    }

    /// Advance the owned timers and apply their expiry effects.
    pub fn advance_timers(&mut self, dt: f32, params: &MovementParameters) {
        for kind in self.timers.tick(dt) {
            self.on_timer_expired(kind, params);
        }
    }

    fn on_timer_expired(&mut self, kind: TimerKind, params: &MovementParameters) {
        debug!("Timer expired: {:?}", kind);
        match kind {
            TimerKind::WallVault => self.wall_vaulted = false,
            TimerKind::WallRun => self.wall_running = false,
            TimerKind::GravitySuspension => match params.gravity_ramp {
                GravityRampPolicy::Instant => self.gravity_suspended = false,
                GravityRampPolicy::TwoStage => {
                    self.gravity_multiplier = GravityRampPolicy::RAMP_MULTIPLIER;
                    self.timers.start(
                        TimerKind::GravityRamp,
                        params.dash_float_duration * GravityRampPolicy::RAMP_FRACTION,
                    );
                }
            },
            // The next bookkeeping pass restores the multiplier.
            TimerKind::GravityRamp => self.gravity_suspended = false,
        }
    }
}

/// Marker component indicating the character resolved as grounded.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character resolved as airborne.
///
/// Mutually exclusive with [`Grounded`] and [`OnWall`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character is attached to a wall.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct OnWall {
    pub side: WallSide,
}

impl OnWall {
    pub fn new(side: WallSide) -> Self {
        Self { side }
    }

    pub fn is_left(&self) -> bool {
        self.side == WallSide::Left
    }

    pub fn is_right(&self) -> bool {
        self.side == WallSide::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_uses_parameter_jump_budget() {
        let params = MovementParameters::default().with_max_air_jumps(3);
        let state = ActorState::new(&params);
        assert_eq!(state.air_jumps, 3);
        assert!(state.facing_right);
        assert!(state.has_wall_run);
        assert_eq!(state.gravity_multiplier, 1.0);
    }

    #[test]
    fn attempt_jump_never_underflows() {
        let mut state = ActorState::default();
        state.reset_jumps(1);

        assert!(state.attempt_jump());
        assert_eq!(state.air_jumps, 0);
        assert!(!state.attempt_jump());
        assert_eq!(state.air_jumps, 0);
    }

    #[test]
    fn wall_run_is_consumed_once() {
        let mut state = ActorState::default();
        assert!(state.attempt_wall_run());
        assert!(!state.attempt_wall_run());

        state.reset_wall_run();
        assert!(state.attempt_wall_run());
    }

    #[test]
    fn update_direction_ignores_tiny_speeds() {
        let mut state = ActorState::default();
        state.update_direction(-3.0);
        assert!(!state.facing_right);

        state.update_direction(0.0005);
        assert!(!state.facing_right);

        state.update_direction(2.0);
        assert!(state.facing_right);
        assert_eq!(state.facing_sign(), 1.0);
    }

    #[test]
    fn attached_wall_prefers_right() {
        let mut state = ActorState::default();
        assert_eq!(state.attached_wall(), None);

        state.set_wall_flag(WallSide::Left, true);
        assert_eq!(state.attached_wall(), Some(WallSide::Left));

        state.set_wall_flag(WallSide::Right, true);
        assert_eq!(state.attached_wall(), Some(WallSide::Right));

        state.detach_from_wall();
        assert!(!state.is_wall_attached());
    }

    #[test]
    fn wall_side_directions() {
        assert!(WallSide::Right.is_toward(1.0));
        assert!(WallSide::Right.is_away(-1.0));
        assert!(!WallSide::Right.is_toward(0.0));
        assert!(!WallSide::Right.is_away(0.0));
        assert!(WallSide::Left.is_toward(-1.0));
        assert_eq!(WallSide::Left.away(), 1.0);
    }

    #[test]
    fn wall_vault_clears_on_expiry() {
        let params = MovementParameters::default().with_wall_timings(0.1, 0.3);
        let mut state = ActorState::new(&params);
        state.start_wall_vault(&params);
        assert!(state.wall_vaulted);

        state.advance_timers(0.05, &params);
        assert!(state.wall_vaulted);

        state.advance_timers(0.06, &params);
        assert!(!state.wall_vaulted);
    }

    #[test]
    fn wall_run_stops_on_expiry_or_detach() {
        let params = MovementParameters::default().with_wall_timings(0.1, 0.2);
        let mut state = ActorState::new(&params);

        state.start_wall_run(&params);
        assert!(state.wall_running);
        state.advance_timers(0.25, &params);
        assert!(!state.wall_running);

        state.start_wall_run(&params);
        state.set_wall_flag(WallSide::Left, true);
        state.detach_from_wall();
        assert!(!state.wall_running);
        assert!(!state.timers.is_active(TimerKind::WallRun));
    }

    #[test]
    fn instant_gravity_policy_clears_after_full_duration() {
        let params = MovementParameters::default()
            .with_dash_float_duration(0.2)
            .with_gravity_ramp(GravityRampPolicy::Instant);
        let mut state = ActorState::new(&params);

        state.suspend_gravity(&params);
        assert!(state.gravity_suspended);
        assert_eq!(state.gravity_multiplier, 0.0);

        state.advance_timers(0.19, &params);
        assert!(state.gravity_suspended);
        assert_eq!(state.gravity_multiplier, 0.0);

        state.advance_timers(0.02, &params);
        assert!(!state.gravity_suspended);
    }

    #[test]
    fn two_stage_gravity_policy_holds_half_gravity() {
        let params = MovementParameters::default()
            .with_dash_float_duration(0.4)
            .with_gravity_ramp(GravityRampPolicy::TwoStage);
        let mut state = ActorState::new(&params);

        state.suspend_gravity(&params);

        // Full suspension for 0.3s
        state.advance_timers(0.29, &params);
        assert_eq!(state.gravity_multiplier, 0.0);
        assert!(state.gravity_suspended);

        // Ramp stage for 0.1s
        state.advance_timers(0.02, &params);
        assert_eq!(state.gravity_multiplier, 0.5);
        assert!(state.gravity_suspended);

        state.advance_timers(0.11, &params);
        assert!(!state.gravity_suspended);
    }

    #[test]
    fn ramp_multiplier_survives_landing() {
        let params = MovementParameters::default()
            .with_dash_float_duration(0.4)
            .with_gravity_ramp(GravityRampPolicy::TwoStage);
        let mut state = ActorState::new(&params);
        state.suspend_gravity(&params);
        assert_eq!(state.airborne_gravity_multiplier(), 0.0);

        state.advance_timers(0.31, &params);
        // Touching down zeroes the live multiplier
        state.gravity_multiplier = 0.0;
        assert_eq!(
            state.airborne_gravity_multiplier(),
            GravityRampPolicy::RAMP_MULTIPLIER
        );

        state.advance_timers(0.11, &params);
        assert_eq!(state.airborne_gravity_multiplier(), 1.0);
    }

    #[test]
    fn restarting_suspension_cancels_ramp() {
        let params = MovementParameters::default()
            .with_dash_float_duration(0.4)
            .with_gravity_ramp(GravityRampPolicy::TwoStage);
        let mut state = ActorState::new(&params);

        state.suspend_gravity(&params);
        state.advance_timers(0.31, &params);
        assert!(state.timers.is_active(TimerKind::GravityRamp));

        state.suspend_gravity(&params);
        assert!(!state.timers.is_active(TimerKind::GravityRamp));
        assert_eq!(state.gravity_multiplier, 0.0);
    }

    #[test]
    fn cancel_gravity_suspension_restores_gravity() {
        let params = MovementParameters::default();
        let mut state = ActorState::new(&params);
        state.suspend_gravity(&params);

        state.cancel_gravity_suspension();
        assert!(!state.gravity_suspended);
        assert_eq!(state.gravity_multiplier, 1.0);
        assert!(state.timers.tick(1.0).is_empty());
    }

    #[test]
    fn on_wall_marker_sides() {
        let wall = OnWall::new(WallSide::Left);
        assert!(wall.is_left());
        assert!(!wall.is_right());
    }
}
