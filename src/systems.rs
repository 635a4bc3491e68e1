//! Core resolver systems.
//!
//! These systems are thin adapters between the ECS and the pure resolver in
//! [`crate::resolver`]. They are generic over the physics backend.

use bevy::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::config::MovementParameters;
use crate::intent::MovementIntent;
use crate::probe::SurfaceProbes;
use crate::resolver::{resolve_tick, BodySnapshot};
use crate::state::{ActorState, Airborne, Grounded, MovementMode, OnWall};

/// Resolve one tick of movement for every character.
///
/// Reads the probes written by the backend's sensor systems, runs the
/// resolver and writes velocity, gravity multiplier and any ground snap back
/// through the backend.
pub fn resolve_movement<B: CharacterPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    // Collect entities first, the backend needs the world afterwards
    let entities: Vec<(Entity, MovementParameters, SurfaceProbes)> = world
        .query_filtered::<(Entity, &MovementParameters, Option<&SurfaceProbes>), (
            With<ActorState>,
            With<MovementIntent>,
        )>()
        .iter(world)
        .map(|(e, params, probes)| (e, *params, probes.copied().unwrap_or_default()))
        .collect();

    for (entity, params, probes) in entities {
        let body = BodySnapshot::new(B::get_velocity(world, entity), B::get_position(world, entity));

        let commands = {
            let mut entity_mut = world.entity_mut(entity);
            let Some(mut intent) = entity_mut.get_mut::<MovementIntent>().map(|i| *i) else {
                continue;
            };
            let Some(mut state) = entity_mut.get_mut::<ActorState>() else {
                continue;
            };
            let commands = resolve_tick(&params, &mut state, &mut intent, &probes, body, dt);
            if let Some(mut stored) = entity_mut.get_mut::<MovementIntent>() {
                *stored = intent;
            }
            commands
        };

        B::set_velocity(world, entity, commands.velocity);
        B::set_gravity_multiplier(world, entity, commands.gravity_multiplier);
        if let Some(position) = commands.snap_position {
            B::set_position(world, entity, position);
        }
    }
}

/// Sync state marker components with the last resolved [`MovementMode`].
pub fn sync_state_markers(
    mut commands: Commands,
    q_actors: Query<(
        Entity,
        &ActorState,
        Has<Grounded>,
        Has<Airborne>,
        Option<&OnWall>,
    )>,
) {
    for (entity, state, has_grounded, has_airborne, on_wall) in &q_actors {
        let mut entity_commands = commands.entity(entity);

        let grounded = state.mode == MovementMode::Grounded;
        let airborne = state.mode == MovementMode::Airborne;

        if grounded && !has_grounded {
            entity_commands.insert(Grounded);
        } else if !grounded && has_grounded {
            entity_commands.remove::<Grounded>();
        }

        if airborne && !has_airborne {
            entity_commands.insert(Airborne);
        } else if !airborne && has_airborne {
            entity_commands.remove::<Airborne>();
        }

        match (state.mode, on_wall) {
            (MovementMode::WallAttached(side), Some(wall)) if wall.side == side => {}
            (MovementMode::WallAttached(side), _) => {
                entity_commands.insert(OnWall::new(side));
            }
            (_, Some(_)) => {
                entity_commands.remove::<OnWall>();
            }
            (_, None) => {}
        }
    }
}
