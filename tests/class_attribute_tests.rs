mod helpers;

use class_attribute::{Class, ClassAttribute, ECSWorld};
use helpers::{record_changes, recorded};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn any_class() -> impl Strategy<Value = Class> {
    prop::sample::select(Class::all().collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn value_returns_construction_class(class in any_class()) {
        let attribute = ClassAttribute::new(class);
        prop_assert_eq!(attribute.value(), class);
        prop_assert_eq!(attribute.value(), attribute.value());
        prop_assert_eq!(attribute.observe().get(), class);
    }

    #[test]
    fn same_class_components_are_value_equal(class in any_class()) {
        let a = ClassAttribute::new(class);
        let b = ClassAttribute::new(class);
        prop_assert_eq!(&a, &b);
        prop_assert!(!a.same_instance(&b));
    }

    #[test]
    fn observers_see_every_change_in_order(
        initial in any_class(),
        changes in prop::collection::vec(any_class(), 0..12),
    ) {
        let mut ecs = ECSWorld::new();
        let entity = ecs.spawn_character(initial);
        let seen = record_changes(&ecs.observe_class(entity).unwrap());

        let mut expected = Vec::new();
        let mut current = initial;
        for class in &changes {
            let changed = ecs.change_class(entity, *class).unwrap();
            prop_assert_eq!(changed, *class != current);
            if changed {
                expected.push((current, *class));
                current = *class;
            }
        }

        prop_assert_eq!(recorded(&seen), expected);
        prop_assert_eq!(ecs.class_of(entity).unwrap(), current);
    }
}

#[test]
fn warrior_and_mage_scenario() {
    let mut ecs = ECSWorld::new();
    let warrior = ecs.spawn_character(Class::Warrior);
    let mage = ecs.spawn_character(Class::Mage);

    assert_eq!(ecs.class_of(warrior).unwrap(), Class::Warrior);
    assert_eq!(ecs.class_of(mage).unwrap(), Class::Mage);

    let warrior_seen = record_changes(&ecs.observe_class(warrior).unwrap());
    let mage_seen = record_changes(&ecs.observe_class(mage).unwrap());

    ecs.change_class(mage, Class::Rogue).unwrap();

    // 一个组件上的监听器不会收到另一个组件的事件
    assert!(recorded(&warrior_seen).is_empty());
    assert_eq!(recorded(&mage_seen), vec![(Class::Mage, Class::Rogue)]);
}

#[test]
fn subscriber_receives_internal_update_exactly_once() {
    let mut ecs = ECSWorld::new();
    let entity = ecs.spawn_character(Class::Warrior);
    let seen = record_changes(&ecs.observe_class(entity).unwrap());

    assert!(ecs.change_class(entity, Class::Huntress).unwrap());
    assert!(!ecs.change_class(entity, Class::Huntress).unwrap());

    assert_eq!(recorded(&seen), vec![(Class::Warrior, Class::Huntress)]);
}

#[test]
fn handles_from_separate_calls_share_the_slot() {
    let attribute = ClassAttribute::new(Class::Rogue);
    let first = attribute.observe();
    let second = attribute.observe();

    assert!(first.ptr_eq(&second));
    let id = first.add_listener(|_: &Class, _: &Class| {});
    assert_eq!(second.listener_count(), 1);
    assert!(second.remove_listener(id));
    assert_eq!(first.listener_count(), 0);
}

#[test]
fn listeners_added_late_only_see_later_changes() {
    let mut ecs = ECSWorld::new();
    let entity = ecs.spawn_character(Class::Warrior);
    let early = record_changes(&ecs.observe_class(entity).unwrap());

    ecs.change_class(entity, Class::Mage).unwrap();
    let late = record_changes(&ecs.observe_class(entity).unwrap());
    ecs.change_class(entity, Class::Rogue).unwrap();

    assert_eq!(
        recorded(&early),
        vec![(Class::Warrior, Class::Mage), (Class::Mage, Class::Rogue)]
    );
    assert_eq!(recorded(&late), vec![(Class::Mage, Class::Rogue)]);
}

#[test]
fn panicking_observer_does_not_block_later_changes() {
    let mut ecs = ECSWorld::new();
    let entity = ecs.spawn_character(Class::Warrior);
    let handle = ecs.observe_class(entity).unwrap();

    let mut failed = false;
    handle.add_listener(move |_: &Class, _: &Class| {
        if !failed {
            failed = true;
            panic!("observer failure");
        }
    });
    let seen = record_changes(&handle);

    assert!(ecs.change_class(entity, Class::Mage).unwrap());
    assert!(ecs.change_class(entity, Class::Rogue).unwrap());

    assert_eq!(ecs.class_of(entity).unwrap(), Class::Rogue);
    assert_eq!(
        recorded(&seen),
        vec![(Class::Warrior, Class::Mage), (Class::Mage, Class::Rogue)]
    );
}
