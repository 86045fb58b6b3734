#![allow(dead_code)]

//! Shared helpers for the integration tests.

use std::sync::{Arc, Mutex};

use class_attribute::{Class, ECSWorld, ReadOnlyProperty};
use hecs::Entity;

/// Changes seen by a listener, as (old, new) pairs.
pub type Recorded = Arc<Mutex<Vec<(Class, Class)>>>;

/// Registers a listener that records every change it receives.
pub fn record_changes(property: &ReadOnlyProperty<Class>) -> Recorded {
    let seen: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    property.add_listener(move |old: &Class, new: &Class| {
        sink.lock().unwrap().push((*old, *new));
    });
    seen
}

pub fn recorded(seen: &Recorded) -> Vec<(Class, Class)> {
    seen.lock().unwrap().clone()
}

/// World with one character per class in `classes`, in order.
pub fn world_with(classes: &[Class]) -> (ECSWorld, Vec<Entity>) {
    let mut ecs = ECSWorld::new();
    let entities = classes
        .iter()
        .map(|class| ecs.spawn_character(*class))
        .collect();
    (ecs, entities)
}
