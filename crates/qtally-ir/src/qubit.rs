//! Qubit and classical bit identifiers and their register slots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a qubit in a circuit; bit `index()` of a basis-state label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Bit position of this qubit in a state-vector index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a classical bit; bit `j` is character `len - 1 - j` of an
/// outcome string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Position of a bit inside a named register such as `prec[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterSlot {
    /// Register name.
    pub register: String,
    /// Offset within the register.
    pub offset: u32,
}

/// A circuit bit: its id and, when declared through a register, its slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bit<Id> {
    /// The bit's id.
    pub id: Id,
    /// Register membership.
    pub slot: Option<RegisterSlot>,
}

/// A qubit with optional register membership.
pub type Qubit = Bit<QubitId>;

/// A classical bit with optional register membership.
pub type Clbit = Bit<ClbitId>;

impl<Id> Bit<Id> {
    /// A bit outside any register.
    pub fn new(id: Id) -> Self {
        Self { id, slot: None }
    }

    /// A bit at `offset` in `register`.
    pub fn in_register(id: Id, register: impl Into<String>, offset: u32) -> Self {
        Self {
            id,
            slot: Some(RegisterSlot {
                register: register.into(),
                offset,
            }),
        }
    }

    /// Name of the register holding this bit.
    pub fn register(&self) -> Option<&str> {
        self.slot.as_ref().map(|s| s.register.as_str())
    }
}

impl<Id: fmt::Display> fmt::Display for Bit<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "{}[{}]", slot.register, slot.offset),
            None => write!(f, "{}", self.id),
        }
    }
}
