//! Movement intent components.
//!
//! Intents carry what the player or AI wants this tick: two continuous axes
//! and a queue of discrete press edges. The input source writes them, the
//! resolver reads the axes and drains the queue once per tick.

use bevy::prelude::*;

/// Threshold under which an axis counts as released.
const AXIS_DEADZONE: f32 = 0.001;

/// A discrete, press-triggered movement action.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Full-height ground jump.
    Jump,
    /// Reduced-height ground jump.
    ShortJump,
    /// Wall jump when on a wall, air jump when airborne.
    InstantJump,
    /// Horizontal dash, or a down dash while looking down in the air.
    Dash,
}

impl Action {
    /// The fixed order in which queued actions are dispatched each tick.
    pub const DISPATCH_ORDER: [Action; 4] = [
        Action::Jump,
        Action::ShortJump,
        Action::InstantJump,
        Action::Dash,
    ];

    #[inline]
    fn bit(self) -> u8 {
        match self {
            Action::Jump => 1 << 0,
            Action::ShortJump => 1 << 1,
            Action::InstantJump => 1 << 2,
            Action::Dash => 1 << 3,
        }
    }
}

/// Set of actions pressed since the last resolver tick.
///
/// Pressing the same action twice before a tick queues it once.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingActions(u8);

impl PendingActions {
    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Pending actions in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::DISPATCH_ORDER
            .into_iter()
            .filter(move |action| self.contains(*action))
    }
}

/// Per-tick movement intent.
///
/// # Example
///
/// ```rust
/// use platformer_movement::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_horizontal(-1.0);
/// intent.press(Action::Jump);
/// assert_eq!(intent.horizontal_direction(), -1.0);
/// assert!(intent.has_pending());
///
/// let pending = intent.take_actions();
/// assert!(pending.contains(Action::Jump));
/// assert!(!intent.has_pending());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Horizontal axis (-1.0 = left, 1.0 = right).
    pub horizontal: f32,
    /// Vertical "look" axis (-1.0 = down, 1.0 = up).
    pub vertical: f32,
    /// Press edges queued since the last tick.
    pub pending: PendingActions,
}

impl MovementIntent {
    /// Create a new empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal axis, clamped to [-1, 1].
    pub fn set_horizontal(&mut self, value: f32) {
        self.horizontal = value.clamp(-1.0, 1.0);
    }

    /// Set the vertical look axis, clamped to [-1, 1].
    pub fn set_vertical(&mut self, value: f32) {
        self.vertical = value.clamp(-1.0, 1.0);
    }

    /// Release both axes. Queued actions are kept.
    pub fn clear_axes(&mut self) {
        self.horizontal = 0.0;
        self.vertical = 0.0;
    }

    /// Queue a press edge for the next tick.
    pub fn press(&mut self, action: Action) {
        self.pending.insert(action);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take every queued action, leaving the queue empty.
    pub fn take_actions(&mut self) -> PendingActions {
        std::mem::take(&mut self.pending)
    }

    /// Horizontal axis quantized to -1, 0 or 1.
    pub fn horizontal_direction(&self) -> f32 {
        quantize(self.horizontal)
    }

    pub fn is_moving(&self) -> bool {
        self.horizontal.abs() > AXIS_DEADZONE
    }

    pub fn is_looking_down(&self) -> bool {
        self.vertical < -AXIS_DEADZONE
    }

    pub fn is_looking_up(&self) -> bool {
        self.vertical > AXIS_DEADZONE
    }
}

fn quantize(value: f32) -> f32 {
    if value > AXIS_DEADZONE {
        1.0
    } else if value < -AXIS_DEADZONE {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_new_is_idle() {
        let intent = MovementIntent::new();
        assert_eq!(intent.horizontal, 0.0);
        assert_eq!(intent.vertical, 0.0);
        assert!(!intent.has_pending());
        assert!(!intent.is_moving());
    }

    #[test]
    fn axes_are_clamped() {
        let mut intent = MovementIntent::new();
        intent.set_horizontal(5.0);
        assert_eq!(intent.horizontal, 1.0);

        intent.set_vertical(-5.0);
        assert_eq!(intent.vertical, -1.0);
    }

    #[test]
    fn directions_are_quantized() {
        let mut intent = MovementIntent::new();
        intent.set_horizontal(0.3);
        assert_eq!(intent.horizontal_direction(), 1.0);

        intent.set_horizontal(-0.3);
        assert_eq!(intent.horizontal_direction(), -1.0);

        intent.set_horizontal(0.0001);
        assert_eq!(intent.horizontal_direction(), 0.0);
        assert!(!intent.is_moving());
    }

    #[test]
    fn look_helpers() {
        let mut intent = MovementIntent::new();
        intent.set_vertical(-1.0);
        assert!(intent.is_looking_down());
        assert!(!intent.is_looking_up());

        intent.set_vertical(1.0);
        assert!(intent.is_looking_up());
    }

    #[test]
    fn clear_axes_keeps_queue() {
        let mut intent = MovementIntent::new();
        intent.set_horizontal(1.0);
        intent.press(Action::Dash);

        intent.clear_axes();
        assert!(!intent.is_moving());
        assert!(intent.has_pending());
    }

    #[test]
    fn take_actions_drains_queue() {
        let mut intent = MovementIntent::new();
        intent.press(Action::Dash);
        intent.press(Action::Jump);

        let pending = intent.take_actions();
        assert!(pending.contains(Action::Dash));
        assert!(pending.contains(Action::Jump));
        assert!(!pending.contains(Action::ShortJump));
        assert!(!intent.has_pending());
        assert!(intent.take_actions().is_empty());
    }

    #[test]
    fn pending_actions_iterate_in_dispatch_order() {
        let mut pending = PendingActions::default();
        pending.insert(Action::Dash);
        pending.insert(Action::InstantJump);
        pending.insert(Action::Jump);

        let order: Vec<Action> = pending.iter().collect();
        assert_eq!(order, vec![Action::Jump, Action::InstantJump, Action::Dash]);
    }

    #[test]
    fn repeated_press_queues_once() {
        let mut pending = PendingActions::default();
        pending.insert(Action::Jump);
        pending.insert(Action::Jump);
        assert_eq!(pending.iter().count(), 1);

        pending.clear();
        assert!(pending.is_empty());
    }
}
