//! Character class attribute for entities in a hecs world.
//!
//! `ClassAttribute` holds one `Class` per entity and publishes it through a
//! read-only observable property. `ECSWorld` attaches it to entities and is the
//! only writer once the class is assigned.

pub mod class_attribute;
pub mod ecs;
pub mod event_bus;
pub mod property;

pub use class::Class;
pub use class_attribute::ClassAttribute;
pub use ecs::{ECSWorld, GameConfig, Resources, entity_key};
pub use error::{GameError, handle_error};
pub use property::{ListenerId, PropertyWrapper, ReadOnlyProperty};
