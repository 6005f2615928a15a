//! Role slot registry
//!
//! A [`Monitor`] owns one preallocated slot per role. Binding an entity to a
//! role activates the slot and appends it to an activation-ordered list;
//! unbinding unlinks it again. Both are O(1) and never allocate: the list is
//! threaded through the slot array itself using indices.
//!
//! ```text
//! slots:  [ Foo ][ Bar ][ Gnu ]
//!            ^      |      ^
//!  head ─────┘      └──────┘ tail      (Bar inactive, Foo → Gnu)
//! ```
//!
//! The registry never looks at an entity beyond comparing it on
//! [`deactivate`](Monitor::deactivate). Whoever destroys an entity must
//! deactivate it first.

pub mod role;

use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

pub use role::{Role, SlotRole};

#[derive(Debug, Clone)]
struct Slot<E> {
    entity: Option<E>,
    age: f32,
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

impl<E> Slot<E> {
    fn empty() -> Self {
        Self {
            entity: None,
            age: 0.0,
            prev: None,
            next: None,
            linked: false,
        }
    }
}

#[derive(Clone)]
pub struct Monitor<R: SlotRole, E> {
    slots: Vec<Slot<E>>,
    head: Option<usize>,
    tail: Option<usize>,
    active: usize,
    _role: PhantomData<R>,
}

impl<R: SlotRole, E> Default for Monitor<R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SlotRole, E: fmt::Debug> fmt::Debug for Monitor<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.active_slots())
            .finish()
    }
}

impl<R: SlotRole, E> Monitor<R, E> {
    /// Allocates one inactive slot per role, in declaration order
    pub fn new() -> Self {
        let slots = (0..R::COUNT).map(|_| Slot::empty()).collect();
        Self {
            slots,
            head: None,
            tail: None,
            active: 0,
            _role: PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_len(&self) -> usize {
        self.active
    }

    pub fn is_active(&self, role: R) -> bool {
        self.slots[role.index()].linked
    }

    /// Time since the role was activated, if it is active
    pub fn age(&self, role: R) -> Option<f32> {
        let slot = &self.slots[role.index()];
        slot.linked.then_some(slot.age)
    }

    pub fn entity(&self, role: R) -> Option<&E> {
        self.slots[role.index()].entity.as_ref()
    }

    /// Longest-active role
    pub fn oldest(&self) -> Option<R> {
        self.head.and_then(R::from_index)
    }

    /// Binds `entity` to `role` unless the role is already active.
    ///
    /// Returns `false` and leaves binding, age and order untouched when the
    /// role was active.
    pub fn activate(&mut self, role: R, entity: E) -> bool {
        let index = role.index();
        if self.slots[index].linked {
            debug!("Role {:?} already active, ignoring activation", role);
            return false;
        }

        let slot = &mut self.slots[index];
        slot.entity = Some(entity);
        slot.age = 0.0;
        self.link_back(index);
        debug!("Activated role {:?} ({} active)", role, self.active);
        true
    }

    /// Advances the age of every active slot
    pub fn tick(&mut self, dt: f32) {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let slot = &mut self.slots[index];
            slot.age += dt;
            cursor = slot.next;
        }
    }

    /// Active slots in activation order
    pub fn active_slots(&self) -> ActiveSlots<'_, R, E> {
        ActiveSlots {
            slots: &self.slots,
            cursor: self.head,
            _role: PhantomData,
        }
    }

    fn link_back(&mut self, index: usize) {
        let previous_tail = self.tail;
        {
            let slot = &mut self.slots[index];
            slot.prev = previous_tail;
            slot.next = None;
            slot.linked = true;
        }
        match previous_tail {
            Some(tail) => self.slots[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.active += 1;
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let slot = &mut self.slots[index];
            let links = (slot.prev, slot.next);
            slot.prev = None;
            slot.next = None;
            slot.linked = false;
            links
        };
        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }
        self.active -= 1;
    }
}

impl<R: SlotRole, E: PartialEq> Monitor<R, E> {
    /// Unbinds `role` if it is currently bound to `entity`.
    ///
    /// A caller holding a stale entity cannot unbind a slot that has since
    /// been given to someone else; such calls return `false`.
    pub fn deactivate(&mut self, role: R, entity: &E) -> bool {
        let index = role.index();
        let slot = &self.slots[index];
        if !slot.linked || slot.entity.as_ref() != Some(entity) {
            debug!("Role {:?} not bound to this entity, ignoring deactivation", role);
            return false;
        }

        self.unlink(index);
        self.slots[index].entity = None;
        debug!("Deactivated role {:?} ({} active)", role, self.active);
        true
    }
}

/// Iterator over `(role, entity, age)` in activation order
pub struct ActiveSlots<'a, R, E> {
    slots: &'a [Slot<E>],
    cursor: Option<usize>,
    _role: PhantomData<R>,
}

impl<R, E> Clone for ActiveSlots<'_, R, E> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            cursor: self.cursor,
            _role: PhantomData,
        }
    }
}

impl<'a, R: SlotRole, E> Iterator for ActiveSlots<'a, R, E> {
    type Item = (R, &'a E, f32);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        let slot = &self.slots[index];
        self.cursor = slot.next;
        let role = R::from_index(index)?;
        let entity = slot.entity.as_ref()?;
        Some((role, entity, slot.age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(monitor: &Monitor<Role, u32>) -> Vec<Role> {
        monitor.active_slots().map(|(role, _, _)| role).collect()
    }

    #[test]
    fn new_monitor_has_one_inactive_slot_per_role() {
        let monitor: Monitor<Role, u32> = Monitor::new();
        assert_eq!(monitor.capacity(), 3);
        assert_eq!(monitor.active_len(), 0);
        assert!(monitor.active_slots().next().is_none());
        assert_eq!(monitor.oldest(), None);
    }

    #[test]
    fn unlink_from_middle_keeps_order() {
        let mut monitor = Monitor::new();
        monitor.activate(Role::Foo, 1);
        monitor.activate(Role::Bar, 2);
        monitor.activate(Role::Gnu, 3);

        assert!(monitor.deactivate(Role::Bar, &2));
        assert_eq!(roles(&monitor), vec![Role::Foo, Role::Gnu]);
        assert_eq!(monitor.entity(Role::Bar), None);

        assert!(monitor.deactivate(Role::Foo, &1));
        assert_eq!(roles(&monitor), vec![Role::Gnu]);
        assert_eq!(monitor.oldest(), Some(Role::Gnu));

        assert!(monitor.deactivate(Role::Gnu, &3));
        assert!(roles(&monitor).is_empty());
        assert_eq!(monitor.active_len(), 0);
    }

    #[test]
    fn reactivation_after_deactivate_moves_to_back_with_fresh_age() {
        let mut monitor = Monitor::new();
        monitor.activate(Role::Foo, 1);
        monitor.activate(Role::Bar, 2);
        monitor.tick(2.0);

        monitor.deactivate(Role::Foo, &1);
        assert!(monitor.activate(Role::Foo, 7));
        assert_eq!(roles(&monitor), vec![Role::Bar, Role::Foo]);
        assert_eq!(monitor.age(Role::Foo), Some(0.0));
        assert_eq!(monitor.entity(Role::Foo), Some(&7));
        assert_eq!(monitor.age(Role::Bar), Some(2.0));
    }

    #[test]
    fn deactivating_inactive_role_is_ignored() {
        let mut monitor: Monitor<Role, u32> = Monitor::new();
        assert!(!monitor.deactivate(Role::Gnu, &1));
        assert_eq!(monitor.age(Role::Gnu), None);
    }

    #[test]
    fn tick_only_ages_active_slots() {
        let mut monitor = Monitor::new();
        monitor.activate(Role::Gnu, 9);
        monitor.tick(0.25);
        assert_eq!(monitor.age(Role::Gnu), Some(0.25));
        assert_eq!(monitor.age(Role::Foo), None);
    }

    #[test]
    fn iteration_is_restartable() {
        let mut monitor = Monitor::new();
        monitor.activate(Role::Bar, 2);
        monitor.activate(Role::Foo, 1);

        let slots = monitor.active_slots();
        let first: Vec<_> = slots.clone().map(|(role, _, _)| role).collect();
        let second: Vec<_> = slots.map(|(role, _, _)| role).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![Role::Bar, Role::Foo]);
    }
}
