//! Trait definition for the duplicate predicate.

use crate::core::asset::Asset;

/// Decides whether two assets are duplicates of one another.
///
/// Implementations must be pure and symmetric:
/// `is_duplicate(a, b) == is_duplicate(b, a)` for every pair.
pub trait MatchStrategy: Send + Sync {
    /// Whether `a` and `b` are considered the same capture
    fn is_duplicate(&self, a: &Asset, b: &Asset) -> bool;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}
