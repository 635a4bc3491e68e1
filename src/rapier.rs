//! Bevy Rapier2D integration: body access, ray-cast surface probes and a
//! spawn bundle for movement actors.
//!
//! Compiled with the `rapier2d` feature (on by default).

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::backend::CharacterPhysicsBackend;
use crate::collision::{ColliderBounds, CollisionData};
use crate::config::MovementParameters;
use crate::probe::{ProbeFrame, SurfaceProbes};
use crate::state::ActorState;
use crate::MovementSet;

/// Rapier2D physics backend for the movement resolver.
///
/// Body operations go through Rapier's `Velocity`, `GravityScale` and the
/// entity `Transform`. Surface probing is handled by a dedicated system that
/// receives the Rapier context as a system parameter.
pub struct Rapier2dBackend;

impl CharacterPhysicsBackend for Rapier2dBackend {
    type VelocityComponent = Velocity;

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn set_gravity_multiplier(world: &mut World, entity: Entity, multiplier: f32) {
        if let Some(mut scale) = world.get_mut::<GravityScale>(entity) {
            // Skip no-op writes so change detection stays quiet
            if scale.0 != multiplier {
                scale.0 = multiplier;
            }
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec2 {
        // Local transform first: the snap writes it and must read back the same value
        match world.get::<Transform>(entity) {
            Some(transform) => transform.translation.xy(),
            None => world
                .get::<GlobalTransform>(entity)
                .map_or(Vec2::ZERO, |global| global.translation().xy()),
        }
    }

    fn set_position(world: &mut World, entity: Entity, position: Vec2) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation.x = position.x;
            transform.translation.y = position.y;
        }
    }

    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Plugin that sets up Rapier2D-specific systems for the resolver.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            rapier_surface_probes.in_set(MovementSet::Sensors),
        );
    }
}

/// Half extents of a collider's axis-aligned bounds.
///
/// Supports cuboids, capsules and balls. Other shapes return `None` and the
/// caller falls back to an explicit [`ColliderBounds`].
pub fn collider_bounds(collider: &Collider) -> Option<ColliderBounds> {
    if let Some(cuboid) = collider.as_cuboid() {
        Some(ColliderBounds::from_half_extents(cuboid.half_extents()))
    } else if let Some(capsule) = collider.as_capsule() {
        // Segment endpoints plus the radius on every side
        let segment = capsule.segment();
        let half_segment = (segment.a() - segment.b()).abs() / 2.0;
        Some(ColliderBounds::from_half_extents(
            half_segment + Vec2::splat(capsule.radius()),
        ))
    } else {
        collider
            .as_ball()
            .map(|ball| ColliderBounds::from_half_extents(Vec2::splat(ball.radius())))
    }
}

/// Cast a single ray and report the surface normal at the hit.
fn rapier_raycast(
    context: &RapierContext,
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
    filter: QueryFilter,
) -> Option<CollisionData> {
    context
        .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
        .map(|(hit_entity, hit)| {
            CollisionData::new(hit.time_of_impact, hit.normal, hit.point, Some(hit_entity))
        })
}

/// Fill [`SurfaceProbes`] for every actor from Rapier ray casts.
///
/// Rays skip the actor's own body and sensors, and honour its
/// `CollisionGroups` so the ground surface set can be restricted.
fn rapier_surface_probes(
    rapier_context: ReadRapierContext,
    mut q_actors: Query<
        (
            Entity,
            &GlobalTransform,
            &MovementParameters,
            &mut SurfaceProbes,
            Option<&Collider>,
            Option<&ColliderBounds>,
            Option<&CollisionGroups>,
        ),
        With<ActorState>,
    >,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, params, mut probes, collider, bounds, collision_groups) in
        &mut q_actors
    {
        let bounds = collider
            .and_then(collider_bounds)
            .or_else(|| bounds.copied())
            .unwrap_or_default();
        let frame = ProbeFrame::new(transform.translation().xy(), bounds, params.collider_offset);

        let mut filter = QueryFilter::default()
            .exclude_rigid_body(entity)
            .exclude_sensors();
        if let Some(groups) = collision_groups {
            filter = filter.groups(*groups);
        }

        let mut caster = |origin: Vec2, direction: Vec2, max_length: f32| {
            rapier_raycast(&context, origin, direction, max_length, filter)
        };
        let sampled = SurfaceProbes::sample(&mut caster, &frame, params);

        if sampled.grounded != probes.grounded {
            trace!("{:?} grounded probe: {}", entity, sampled.grounded);
        }
        *probes = sampled;
    }
}

/// Rapier components a movement actor needs on its body.
///
/// The resolver owns velocity every tick, so the body carries no damping
/// and no friction, and its gravity is driven through `GravityScale`.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_movement::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         ActorState::default(),
///         MovementParameters::snappy(),
///         Rapier2dCharacterBundle::new(),
///         Collider::cuboid(0.5, 1.0),
///     ));
/// }
/// ```
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    /// Should stay [`RigidBody::Dynamic`] so Rapier integrates gravity and contacts.
    pub rigid_body: RigidBody,
    /// Written by the resolver each tick.
    pub velocity: Velocity,
    /// Written by the resolver each tick (0 on ground, walls and dash floats).
    pub gravity_scale: GravityScale,
    /// Rotation locked by default.
    pub locked_axes: LockedAxes,
    pub damping: Damping,
    /// Zero friction so walls do not hold the body.
    pub friction: Friction,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    /// Dynamic, rotation-locked, frictionless body.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            gravity_scale: GravityScale(1.0),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 0.0,
            },
            friction: Friction {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
        }
    }

    /// Replace the rigid body type.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the damping coefficients.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }

    /// Replace the locked axes (rotation only by default).
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn rapier_backend_get_position() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((Transform::from_xyz(100.0, 200.0, 0.0), RigidBody::Fixed))
            .id();

        app.update();

        let pos = Rapier2dBackend::get_position(app.world(), entity);
        assert!((pos.x - 100.0).abs() < 0.01);
        assert!((pos.y - 200.0).abs() < 0.01);

        Rapier2dBackend::set_position(app.world_mut(), entity, Vec2::new(3.0, 4.0));
        let pos = Rapier2dBackend::get_position(app.world(), entity);
        assert_eq!(pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn rapier_backend_velocity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                Velocity::linear(Vec2::new(50.0, 30.0)),
            ))
            .id();

        app.update();

        let vel = Rapier2dBackend::get_velocity(app.world(), entity);
        assert!((vel.x - 50.0).abs() < 0.01);
        assert!((vel.y - 30.0).abs() < 0.01);

        Rapier2dBackend::set_velocity(app.world_mut(), entity, Vec2::new(100.0, 0.0));

        let vel = Rapier2dBackend::get_velocity(app.world(), entity);
        assert!((vel.x - 100.0).abs() < 0.01);
        assert!(vel.y.abs() < 0.01);
    }

    #[test]
    fn rapier_backend_gravity_multiplier() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((Transform::default(), Rapier2dCharacterBundle::new()))
            .id();

        Rapier2dBackend::set_gravity_multiplier(app.world_mut(), entity, 0.5);
        assert_eq!(app.world().get::<GravityScale>(entity).unwrap().0, 0.5);

        // Missing component is a no-op
        let bare = app.world_mut().spawn(Transform::default()).id();
        Rapier2dBackend::set_gravity_multiplier(app.world_mut(), bare, 0.0);
        assert!(app.world().get::<GravityScale>(bare).is_none());
    }

    #[test]
    fn collider_bounds_from_shapes() {
        let cuboid = collider_bounds(&Collider::cuboid(0.5, 1.0)).unwrap();
        assert!((cuboid.half_extents - Vec2::new(0.5, 1.0)).length() < 1e-5);

        let capsule = collider_bounds(&Collider::capsule_y(0.5, 0.25)).unwrap();
        assert!((capsule.half_extents - Vec2::new(0.25, 0.75)).length() < 1e-5);

        let ball = collider_bounds(&Collider::ball(0.4)).unwrap();
        assert!((ball.half_extents - Vec2::splat(0.4)).length() < 1e-5);

        assert!(collider_bounds(&Collider::segment(Vec2::ZERO, Vec2::X)).is_none());
    }

    #[test]
    fn rapier_character_bundle_creates_valid_entity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Rapier2dCharacterBundle::new(),
                Collider::cuboid(0.5, 1.0),
            ))
            .id();

        app.update();

        assert!(app.world().get::<RigidBody>(entity).is_some());
        assert!(app.world().get::<Velocity>(entity).is_some());
        assert!(app.world().get::<GravityScale>(entity).is_some());
        assert_eq!(
            *app.world().get::<LockedAxes>(entity).unwrap(),
            LockedAxes::ROTATION_LOCKED
        );
    }
}
