//! Read-only view of the k-mer store.
//!
//! The store that records which panel members share each k-mer is built by
//! the k-mer counting stage. Statistics only need to walk every stored item
//! once and ask two questions of it: does it belong to contaminant `i`, and
//! was it seen in the reads of a given mate.
//!
//! [`MembershipTable`] is a plain in-memory implementation, loaded from a
//! membership TSV by [`crate::parsing::tsv`] or built directly in tests.

pub mod membership;

pub use membership::{MembershipEntry, MembershipTable};

use crate::core::types::Mate;

/// A single stored k-mer
pub trait KmerItem {
    /// Whether the k-mer occurs in the reference of `contaminant`
    fn has_membership(&self, contaminant: usize) -> bool;

    /// Whether the k-mer was observed in the reads of `mate`
    fn observed_in(&self, _mate: Mate) -> bool {
        false
    }
}

/// Traversal over every stored k-mer exactly once
pub trait KmerStore {
    type Item: KmerItem;

    /// Call `visit` once per stored item, in store order
    fn visit<F>(&self, visit: F)
    where
        F: FnMut(&Self::Item);
}
