//! ECS (Entity Component System) world that owns class attributes.
//!
//! Other systems read and observe an entity's class through this façade. It is
//! also the only code allowed to change a class after it has been assigned.
//! The hecs world stays private so a `ClassAttribute` can never be swapped
//! out from under the handles already given away:
//!
//! ```compile_fail
//! use class_attribute::{Class, ClassAttribute, ECSWorld};
//!
//! let mut ecs = ECSWorld::new();
//! let entity = ecs.spawn_character(Class::Warrior);
//! ecs.world.insert_one(entity, ClassAttribute::new(Class::Mage));
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use hecs::{ComponentError, Entity, World};
use log::{debug, info};

use class::Class;
use error::GameError;

use crate::class_attribute::ClassAttribute;
use crate::event_bus::{EventBus, GameEvent, LoggingHandler};
use crate::property::ReadOnlyProperty;

/// Key used for `entity` in events and errors. Keeps the generation, so a
/// recycled slot never aliases a despawned entity.
pub fn entity_key(entity: Entity) -> u64 {
    entity.to_bits().get()
}

/// Main ECS world container
pub struct ECSWorld {
    world: World,
    pub resources: Resources,
}

/// Global resources that are shared across systems
pub struct Resources {
    /// World configuration
    pub config: GameConfig,

    /// Class events for systems that watch every entity
    pub event_bus: EventBus,

    /// Latest human readable messages fed by `LoggingHandler`
    pub message_log: Arc<Mutex<VecDeque<String>>>,
}

impl Resources {
    fn new(config: GameConfig) -> Self {
        let message_log = Arc::new(Mutex::new(VecDeque::new()));
        let mut event_bus = EventBus::with_history_size(config.event_history_size);
        if config.log_class_events {
            event_bus.subscribe(Box::new(LoggingHandler::new(
                message_log.clone(),
                config.message_log_size,
            )));
        }

        Self {
            config,
            event_bus,
            message_log,
        }
    }

    /// Forgets history and messages; handlers and shared log handles stay live.
    fn reset(&mut self) {
        self.event_bus.clear_history();
        if let Ok(mut messages) = self.message_log.lock() {
            messages.clear();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Number of events kept in the bus history
    pub event_history_size: usize,
    /// Attach a `LoggingHandler` writing into `Resources::message_log`
    pub log_class_events: bool,
    /// Number of messages kept in `Resources::message_log`
    pub message_log_size: usize,
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            event_history_size: 100,
            log_class_events: true,
            message_log_size: 50,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ECSWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ECSWorld {
    pub fn new() -> Self {
        Self::with_config(GameConfig::new())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self {
            world: World::new(),
            resources: Resources::new(config),
        }
    }

    /// Despawns everything and forgets history, keeping configuration and
    /// subscribed handlers.
    pub fn clear(&mut self) {
        self.world.clear();
        self.resources.reset();
    }

    /// Number of live entities
    pub fn len(&self) -> u32 {
        self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Spawns an entity without a class; `assign_class` can attach one later.
    pub fn spawn_entity(&mut self) -> Entity {
        self.world.spawn(())
    }

    /// Spawns a new character entity holding `class`.
    pub fn spawn_character(&mut self, class: Class) -> Entity {
        let entity = self.world.spawn((ClassAttribute::new(class),));
        debug!("spawned entity {:?} as {}", entity, class.name());
        self.resources.event_bus.publish(GameEvent::ClassAssigned {
            entity: entity_key(entity),
            class,
        });
        entity
    }

    /// Attaches a class to an existing entity. A class can be assigned once.
    pub fn assign_class(&mut self, entity: Entity, class: Class) -> Result<(), GameError> {
        if !self.world.contains(entity) {
            return Err(GameError::NoSuchEntity(entity_key(entity)));
        }
        if self.world.get::<&ClassAttribute>(entity).is_ok() {
            return Err(GameError::ClassAlreadyAssigned(entity_key(entity)));
        }

        self.world
            .insert_one(entity, ClassAttribute::new(class))
            .map_err(|_| GameError::NoSuchEntity(entity_key(entity)))?;

        debug!("assigned {} to entity {:?}", class.name(), entity);
        self.resources.event_bus.publish(GameEvent::ClassAssigned {
            entity: entity_key(entity),
            class,
        });
        Ok(())
    }

    fn attribute(&self, entity: Entity) -> Result<hecs::Ref<'_, ClassAttribute>, GameError> {
        self.world
            .get::<&ClassAttribute>(entity)
            .map_err(|err| match err {
                ComponentError::NoSuchEntity => GameError::NoSuchEntity(entity_key(entity)),
                ComponentError::MissingComponent(_) => GameError::MissingClass(entity_key(entity)),
            })
    }

    /// Current class of `entity`.
    pub fn class_of(&self, entity: Entity) -> Result<Class, GameError> {
        Ok(self.attribute(entity)?.value())
    }

    /// Read-only handle on the class of `entity`.
    pub fn observe_class(&self, entity: Entity) -> Result<ReadOnlyProperty<Class>, GameError> {
        Ok(self.attribute(entity)?.observe())
    }

    /// Changes the class of `entity` and notifies its observers.
    ///
    /// Returns `Ok(false)` when the entity already had `class`; nothing is
    /// notified or published in that case.
    pub fn change_class(&mut self, entity: Entity, class: Class) -> Result<bool, GameError> {
        let (old_class, changed) = {
            let attribute = self.attribute(entity)?;
            let old_class = attribute.value();
            (old_class, attribute.set_value(class))
        };

        if changed {
            info!(
                "entity {:?} changed class {} -> {}",
                entity,
                old_class.name(),
                class.name()
            );
            self.resources.event_bus.publish(GameEvent::ClassChanged {
                entity: entity_key(entity),
                old_class,
                new_class: class,
            });
        }
        Ok(changed)
    }

    /// Like `change_class`, for class names coming from data or user input.
    pub fn change_class_by_name(&mut self, entity: Entity, name: &str) -> Result<bool, GameError> {
        let class: Class = name.parse()?;
        self.change_class(entity, class)
    }

    /// All entities currently holding `class`, ordered by entity id.
    pub fn characters_with_class(&self, class: Class) -> Vec<Entity> {
        let mut entities: Vec<_> = self
            .world
            .query::<&ClassAttribute>()
            .iter()
            .filter(|(_, attribute)| attribute.value() == class)
            .map(|(entity, _)| entity)
            .collect();
        entities.sort_by_key(|entity| entity.id());
        entities
    }

    /// Recorded events for `entity`, oldest first. Limited by
    /// `GameConfig::event_history_size`.
    pub fn class_history(&self, entity: Entity) -> Vec<GameEvent> {
        let key = entity_key(entity);
        self.resources
            .event_bus
            .history()
            .filter(|event| event.entity() == key)
            .cloned()
            .collect()
    }

    /// Removes `entity` with its class attribute. Handles obtained earlier
    /// stay readable but receive no further changes.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), GameError> {
        self.world
            .despawn(entity)
            .map_err(|_| GameError::NoSuchEntity(entity_key(entity)))?;

        debug!("despawned entity {:?}", entity);
        self.resources.event_bus.publish(GameEvent::EntityDespawned {
            entity: entity_key(entity),
        });
        Ok(())
    }
}
