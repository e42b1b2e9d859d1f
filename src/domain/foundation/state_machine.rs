//! State machine trait for status enums.
//!
//! Gives lifecycle enums (entitlement tiers, transaction states) a uniform way
//! to declare and validate transitions.

use super::ValidationError;

/// Trait for enums that represent state machines.
///
/// Implementors list the legal edges; `transition_to` comes for free.
///
/// # Example
///
/// ```ignore
/// let next = EntitlementTier::Trial.transition_to(EntitlementTier::Premium)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }
}
