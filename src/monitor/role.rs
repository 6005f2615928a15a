use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of roles a [`Monitor`](super::Monitor) preallocates slots for
pub trait SlotRole: Copy + fmt::Debug {
    /// Number of declared roles
    const COUNT: usize;

    /// Position in declaration order, `0..COUNT`
    fn index(self) -> usize;

    fn from_index(index: usize) -> Option<Self>;
}

// Monitored roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Foo = 0,
    Bar,
    Gnu,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Foo, Role::Bar, Role::Gnu];
}

impl SlotRole for Role {
    const COUNT: usize = Role::ALL.len();

    fn index(self) -> usize {
        self as usize
    }

    fn from_index(index: usize) -> Option<Self> {
        Role::ALL.get(index).copied()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_in_declaration_order() {
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
            assert_eq!(Role::from_index(i), Some(*role));
        }
        assert_eq!(Role::from_index(Role::COUNT), None);
    }
}
