//! Authorization rules for item-level writes.

use crate::domain::User;
use crate::error::DomainError;

/// Only the owning user may update or delete a user record.
pub fn can_modify(actor: &User, target: &User) -> bool {
    actor.id.is_some() && actor.id == target.id
}

/// [`can_modify`] as a `Result`, for use with `?` before reaching a persister.
pub fn ensure_can_modify(actor: &User, target: &User) -> Result<(), DomainError> {
    if can_modify(actor, target) {
        Ok(())
    } else {
        tracing::warn!(actor = ?actor.id, target = ?target.id, "Rejected write by non-owner");
        Err(DomainError::Forbidden)
    }
}
