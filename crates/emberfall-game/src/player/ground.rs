//! Ground/air classification

use emberfall_core::{EntityId, LayerMask, Vec3};
use emberfall_physics::PhysicsBackend;

/// Decide whether the body at `position` is airborne.
///
/// A grounded contact flag from the last move wins outright. Otherwise any collider
/// other than `body` within `radius` counts as support, which hides the frame where
/// contact flags lag behind a landing or a ledge.
pub fn classify_in_air<W: PhysicsBackend + ?Sized>(
    world: &W,
    body: EntityId,
    position: Vec3,
    grounded_hint: bool,
    radius: f32,
    mask: LayerMask,
) -> bool {
    if grounded_hint {
        return false;
    }

    !world
        .overlap_sphere(position, radius, mask)
        .into_iter()
        .any(|entity| entity != body)
}
