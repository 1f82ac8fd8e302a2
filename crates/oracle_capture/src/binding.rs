//! Trigger bindings: code address to trigger kind.
//!
//! An address carries at most one kind. A kind sits at one address, except
//! the multi-site kinds, which the engine reaches from several places.

use crate::error::{CaptureError, CaptureResult};
use indexmap::IndexMap;
use oracle_decode::{Layout, TriggerKind};

/// Registration table consulted on every firing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    /// Bound kinds by address, in binding order
    by_address: IndexMap<u16, TriggerKind>,
}

impl BindingTable {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every trigger at every address a layout pins
    #[must_use]
    pub fn from_layout(layout: &Layout) -> Self {
        let by_address = TriggerKind::ALL
            .into_iter()
            .flat_map(|kind| kind.addresses(layout).iter().map(move |&address| (address, kind)))
            .collect();
        Self { by_address }
    }

    /// Bind a trigger to a code address
    ///
    /// # Errors
    ///
    /// Returns error if the address is taken, or if a single-site trigger
    /// is already bound elsewhere
    pub fn bind(&mut self, kind: TriggerKind, address: u16) -> CaptureResult<()> {
        if let Some(&existing) = self.by_address.get(&address) {
            return Err(CaptureError::AddressTaken {
                address,
                existing,
                new: kind,
            });
        }
        if let Some(bound) = self.address_of(kind).filter(|_| !kind.is_multi_site()) {
            return Err(CaptureError::AlreadyBound {
                kind,
                address: bound,
            });
        }
        self.by_address.insert(address, kind);
        Ok(())
    }

    /// Trigger bound at an address
    #[must_use]
    pub fn lookup(&self, address: u16) -> Option<TriggerKind> {
        self.by_address.get(&address).copied()
    }

    /// First address a trigger is bound at
    #[must_use]
    pub fn address_of(&self, kind: TriggerKind) -> Option<u16> {
        self.by_address
            .iter()
            .find_map(|(&address, &bound)| (bound == kind).then_some(address))
    }

    /// Bindings in the order they were made
    pub fn iter(&self) -> impl Iterator<Item = (u16, TriggerKind)> + '_ {
        self.by_address.iter().map(|(&a, &k)| (a, k))
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    /// Whether nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
