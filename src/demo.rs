//! Drives a role monitor from pad buttons
//!
//! ActionA, ActionB and ActionC spawn a new entity for Foo, Bar and Gnu.
//! ActionD removes whichever binding has been active longest.

use std::fmt;
use tracing::{debug, info};

use crate::controller::button::Button;
use crate::controller::provider::InputSampleProvider;
use crate::controller::tracker::ButtonStateTracker;
use crate::monitor::{Monitor, Role};

/// Identity handle of a spawned demo entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

const SPAWN_BUTTONS: [(Button, Role); 3] = [
    (Button::ActionA, Role::Foo),
    (Button::ActionB, Role::Bar),
    (Button::ActionC, Role::Gnu),
];

const REMOVE_BUTTON: Button = Button::ActionD;

#[derive(Debug, Default)]
pub struct RoleDemo {
    monitor: Monitor<Role, EntityId>,
    next_entity: u64,
}

impl RoleDemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn monitor(&self) -> &Monitor<Role, EntityId> {
        &self.monitor
    }

    /// Handles this frame's button edges, then ages the active roles by `dt` seconds
    pub fn step<P: InputSampleProvider + ?Sized>(
        &mut self,
        tracker: &ButtonStateTracker,
        provider: &P,
        dt: f32,
    ) {
        for (button, role) in SPAWN_BUTTONS {
            if tracker.is_down(provider, button) {
                self.spawn(role);
            }
        }

        if tracker.is_down(provider, REMOVE_BUTTON) {
            self.remove_oldest();
        }

        self.monitor.tick(dt);
    }

    fn spawn(&mut self, role: Role) {
        let entity = EntityId(self.next_entity);
        self.next_entity += 1;

        if self.monitor.activate(role, entity) {
            info!("Bound {} to role {}", entity, role);
        } else {
            debug!("Role {} busy, {} left unbound", role, entity);
        }
    }

    fn remove_oldest(&mut self) {
        let Some(role) = self.monitor.oldest() else {
            debug!("Nothing to remove");
            return;
        };
        let Some(entity) = self.monitor.entity(role).copied() else {
            return;
        };
        if self.monitor.deactivate(role, &entity) {
            info!("Released {} from role {}", entity, role);
        }
    }
}
