//! Error types surfaced by collaborator capabilities.

use thiserror::Error;

use crate::{AreaName, EntityId, PeerId};

/// Failures reported by the external wildlife collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The collaborator does not know the requested entity.
    #[error("entity {0:?} is not registered")]
    MissingEntity(EntityId),
    /// The collaborator does not know the requested area.
    #[error("area '{0}' is not loaded")]
    MissingArea(AreaName),
    /// The collaborator does not know the requested actor.
    #[error("no actor is bound to {0}")]
    MissingActor(PeerId),
    /// The collaborator refused to create an entity from the key.
    #[error("creature key '{0}' is unknown")]
    UnknownKey(String),
    /// The collaborator's own routine failed.
    #[error("collaborator operation '{operation}' failed: {reason}")]
    Operation {
        /// Name of the failed operation.
        operation: &'static str,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl HostError {
    /// Shorthand for an operation failure.
    #[must_use]
    pub fn operation(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            reason: reason.into(),
        }
    }
}

/// Failures while wiring the cross-module spawn resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A resolver has already been installed into the slot.
    #[error("a spawn resolver is already installed")]
    AlreadyInstalled,
}
