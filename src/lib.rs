//! # `platformer_movement`
//!
//! A 2D platformer movement resolver with physics backend abstraction.
//!
//! Once per fixed tick the resolver decides what velocity and state a
//! character should have, from its input intent and a handful of surface
//! probes:
//! - Slope-aware ground movement with a speed floor, soft speed cap and
//!   traction decay
//! - Air control with a horizontal cap and multi-stage air jumps
//! - Wall slide, wall run and wall jumps with a re-attach lockout
//! - Dashes with a temporary gravity float
//! - A one-tick coyote window after leaving the ground
//!
//! ## Architecture
//!
//! Each tick runs in [`MovementSet`] order inside `FixedUpdate`:
//! 1. **Sensors**: the backend casts rays and fills [`probe::SurfaceProbes`]
//! 2. **Resolve**: timers, bookkeeping, queued actions, then the continuous
//!    model picked by priority (wall, ground, air)
//! 3. **Markers**: [`state::Grounded`], [`state::Airborne`] and
//!    [`state::OnWall`] follow the resolved mode
//!
//! The algorithms live in [`resolver`] and [`actions`] as plain functions and
//! can be used without an ECS world.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_movement::prelude::*;
//!
//! let params = MovementParameters::snappy().with_max_air_jumps(2);
//! let state = ActorState::new(&params);
//! let mut intent = MovementIntent::new();
//! intent.set_horizontal(1.0);
//! intent.press(Action::Jump);
//!
//! // Spawn these together with a backend body, e.g. `Rapier2dCharacterBundle`.
//! # let _ = (params, state, intent);
//! ```

use bevy::prelude::*;

pub mod actions;
pub mod backend;
pub mod collision;
pub mod config;
pub mod intent;
pub mod probe;
pub mod resolver;
pub mod state;
pub mod systems;
pub mod timers;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterPhysicsBackend, NoOpBackendPlugin};
    pub use crate::collision::{ColliderBounds, CollisionData};
    pub use crate::config::{GravityRampPolicy, MovementParameters, ParameterError};
    pub use crate::intent::{Action, MovementIntent};
    pub use crate::probe::{GroundContact, SurfaceCaster, SurfaceProbes};
    pub use crate::resolver::{BodyCommands, BodySnapshot};
    pub use crate::state::{ActorState, Airborne, Grounded, MovementMode, OnWall, WallSide};
    pub use crate::timers::TimerKind;
    pub use crate::{MovementResolverPlugin, MovementSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dCharacterBundle};
}

/// System sets for the resolver, run in order inside `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovementSet {
    /// Backend sensors write [`probe::SurfaceProbes`].
    Sensors,
    /// The resolver runs and writes the physics body.
    Resolve,
    /// Marker components are synced.
    Markers,
}

/// Main plugin for the movement resolver.
///
/// Generic over a physics backend `B` which owns the body and the ray
/// queries.
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_movement::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(MovementResolverPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct MovementResolverPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for MovementResolverPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for MovementResolverPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<config::MovementParameters>();
        app.register_type::<config::GravityRampPolicy>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<intent::Action>();
        app.register_type::<state::ActorState>();
        app.register_type::<state::MovementMode>();
        app.register_type::<state::WallSide>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::OnWall>();
        app.register_type::<probe::SurfaceProbes>();
        app.register_type::<collision::ColliderBounds>();
        app.register_type::<timers::TimerKind>();

        app.configure_sets(
            FixedUpdate,
            (MovementSet::Sensors, MovementSet::Resolve, MovementSet::Markers).chain(),
        );

        // Backend sensors go into MovementSet::Sensors
        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            systems::resolve_movement::<B>.in_set(MovementSet::Resolve),
        );
        app.add_systems(
            FixedUpdate,
            systems::sync_state_markers.in_set(MovementSet::Markers),
        );
    }
}
