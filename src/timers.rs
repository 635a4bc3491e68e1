//! Scheduled, cancellable state timers.
//!
//! Each [`TimerKind`] has at most one pending timer. Starting a kind that is
//! already running restarts it; nothing ever queues behind it. Timers are
//! advanced by the resolver's tick delta and report which kinds expired so
//! the owner can apply the matching state change.

use std::time::Duration;

use bevy::prelude::*;

/// Delayed effects the resolver can schedule.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Blocks wall re-attachment after a wall jump or wall dash.
    WallVault,
    /// Limits how long a wall run lasts.
    WallRun,
    /// Full gravity suspension after a dash.
    GravitySuspension,
    /// Half-gravity hold that follows a suspension under the two-stage policy.
    GravityRamp,
}

impl TimerKind {
    /// Every kind, in the order expirations are reported.
    pub const ALL: [TimerKind; 4] = [
        TimerKind::WallVault,
        TimerKind::WallRun,
        TimerKind::GravitySuspension,
        TimerKind::GravityRamp,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            TimerKind::WallVault => 0,
            TimerKind::WallRun => 1,
            TimerKind::GravitySuspension => 2,
            TimerKind::GravityRamp => 3,
        }
    }
}

/// The pending timers of one actor.
#[derive(Debug, Clone, Default)]
pub struct ActorTimers {
    slots: [Option<Timer>; 4],
}

impl ActorTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `kind` for `seconds`, replacing any pending timer of that kind.
    pub fn start(&mut self, kind: TimerKind, seconds: f32) {
        self.slots[kind.index()] = Some(Timer::from_seconds(seconds.max(0.0), TimerMode::Once));
    }

    /// Drop the pending timer of `kind`, if any. Its expiry never fires.
    pub fn cancel(&mut self, kind: TimerKind) {
        self.slots[kind.index()] = None;
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Advance every pending timer by `delta` seconds.
    ///
    /// Returns the kinds that expired during this advance, in
    /// [`TimerKind::ALL`] order. Expired timers are removed.
    pub fn tick(&mut self, delta: f32) -> Vec<TimerKind> {
        let delta = Duration::from_secs_f32(delta.max(0.0));
        let mut fired = Vec::new();

        for kind in TimerKind::ALL {
            let slot = &mut self.slots[kind.index()];
            let finished = match slot.as_mut() {
                Some(timer) => timer.tick(delta).finished(),
                None => false,
            };
            if finished {
                *slot = None;
                fired.push(kind);
            }
        }

        fired
    }
}
