//! Physics backend abstraction.
//!
//! The resolver never touches a physics engine directly. A backend exposes
//! the body operations it needs (velocity, gravity multiplier, position) and
//! contributes the sensor systems that fill [`SurfaceProbes`] each tick.
//!
//! [`SurfaceProbes`]: crate::probe::SurfaceProbes

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// All methods are static and operate on the ECS [`World`], so the generic
/// resolver system can run as an exclusive system.
///
/// Missing components are not errors: getters fall back to neutral values
/// and setters do nothing.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_movement::prelude::*;
///
/// #[derive(Component, Default)]
/// struct Body {
///     velocity: Vec2,
///     gravity: f32,
/// }
///
/// struct BodyBackend;
///
/// impl CharacterPhysicsBackend for BodyBackend {
///     type VelocityComponent = Body;
///
///     fn plugin() -> impl Plugin {
///         NoOpBackendPlugin
///     }
///
///     fn get_velocity(world: &World, entity: Entity) -> Vec2 {
///         world.get::<Body>(entity).map(|b| b.velocity).unwrap_or(Vec2::ZERO)
///     }
///
///     fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
///         if let Some(mut body) = world.get_mut::<Body>(entity) {
///             body.velocity = velocity;
///         }
///     }
///
///     fn set_gravity_multiplier(world: &mut World, entity: Entity, multiplier: f32) {
///         if let Some(mut body) = world.get_mut::<Body>(entity) {
///             body.gravity = multiplier;
///         }
///     }
///
///     fn get_position(world: &World, entity: Entity) -> Vec2 {
///         world
///             .get::<Transform>(entity)
///             .map(|t| t.translation.xy())
///             .unwrap_or(Vec2::ZERO)
///     }
///
///     fn set_position(world: &mut World, entity: Entity, position: Vec2) {
///         if let Some(mut transform) = world.get_mut::<Transform>(entity) {
///             transform.translation.x = position.x;
///             transform.translation.y = position.y;
///         }
///     }
///
///     fn get_fixed_timestep(_world: &World) -> f32 {
///         1.0 / 60.0
///     }
/// }
/// ```
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// The velocity component type used by this backend.
    type VelocityComponent: Component;

    /// Returns the plugin that sets up this backend, including its sensors.
    fn plugin() -> impl Plugin;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Scale the gravity applied to an entity. 0 disables gravity, 1 is normal.
    fn set_gravity_multiplier(world: &mut World, entity: Entity, multiplier: f32);

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec2;

    /// Move an entity. Only used to snap onto the ground.
    fn set_position(world: &mut World, entity: Entity, position: Vec2);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32;
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
