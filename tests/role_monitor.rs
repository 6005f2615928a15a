use rolepad::monitor::{Monitor, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entity(u32);

fn order(monitor: &Monitor<Role, Entity>) -> Vec<Role> {
    monitor.active_slots().map(|(role, _, _)| role).collect()
}

#[test]
fn repeated_activation_is_ignored() {
    let mut monitor = Monitor::new();
    assert!(monitor.activate(Role::Foo, Entity(1)));
    monitor.tick(1.0);
    assert!(!monitor.activate(Role::Foo, Entity(1)));

    assert_eq!(monitor.active_len(), 1);
    assert!(monitor.age(Role::Foo).unwrap_or_default() >= 1.0);
}

#[test]
fn activation_of_busy_role_keeps_first_binding() {
    let mut monitor = Monitor::new();
    monitor.activate(Role::Foo, Entity(1));
    monitor.activate(Role::Bar, Entity(2));
    assert!(!monitor.activate(Role::Foo, Entity(3)));

    assert_eq!(monitor.entity(Role::Foo), Some(&Entity(1)));
    assert_eq!(order(&monitor), vec![Role::Foo, Role::Bar]);
}

#[test]
fn stale_entity_cannot_deactivate() {
    let mut monitor = Monitor::new();
    monitor.activate(Role::Gnu, Entity(1));

    assert!(!monitor.deactivate(Role::Gnu, &Entity(2)));
    assert!(monitor.is_active(Role::Gnu));
    assert_eq!(monitor.entity(Role::Gnu), Some(&Entity(1)));
}

#[test]
fn iteration_follows_activation_order() {
    let mut monitor = Monitor::new();
    monitor.activate(Role::Bar, Entity(1));
    monitor.activate(Role::Foo, Entity(2));
    monitor.activate(Role::Gnu, Entity(3));

    assert_eq!(order(&monitor), vec![Role::Bar, Role::Foo, Role::Gnu]);
}

#[test]
fn ages_accumulate_from_activation() {
    let mut monitor = Monitor::new();
    monitor.activate(Role::Foo, Entity(1));
    monitor.activate(Role::Bar, Entity(2));
    monitor.tick(0.5);
    monitor.activate(Role::Gnu, Entity(3));
    monitor.tick(0.5);

    let slots: Vec<(Role, Entity, f32)> = monitor
        .active_slots()
        .map(|(role, entity, age)| (role, *entity, age))
        .collect();
    assert_eq!(
        slots.iter().map(|(role, _, _)| *role).collect::<Vec<_>>(),
        vec![Role::Foo, Role::Bar, Role::Gnu]
    );

    let expected = [(Entity(1), 1.0), (Entity(2), 1.0), (Entity(3), 0.5)];
    for ((_, entity, age), (want_entity, want_age)) in slots.iter().zip(expected) {
        assert_eq!(*entity, want_entity);
        assert!((age - want_age).abs() < 1e-6, "age {age} != {want_age}");
    }
}

#[test]
fn slots_are_recycled_without_growing() {
    let mut monitor = Monitor::new();
    for round in 0..100 {
        for role in Role::ALL {
            assert!(monitor.activate(role, Entity(round)));
        }
        monitor.tick(0.1);
        for role in Role::ALL {
            assert!(monitor.deactivate(role, &Entity(round)));
        }
    }
    assert_eq!(monitor.capacity(), Role::ALL.len());
    assert_eq!(monitor.active_len(), 0);
}
