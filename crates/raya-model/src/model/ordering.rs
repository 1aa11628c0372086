//! Display order of properties
//!
//! Shorter names first, then lexical name order; properties sharing a name
//! (only possible across models) are ordered by their value type name.

use std::cmp::Ordering;

use super::Property;

impl Ord for Property {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .len()
            .cmp(&other.name.len())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.ty.to_string().cmp(&other.ty.to_string()))
            .then_with(|| self.ty.cmp(&other.ty))
    }
}

impl PartialOrd for Property {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

impl Eq for Property {}
