//! Owner-side maintenance of the user → child back-references.
//!
//! The parent collection is the source of truth: children are only attached
//! or detached through these helpers, which keep `owner_id` in step.

/// A child entity that carries a back-reference to its owning user.
pub trait OwnedChild {
    fn id(&self) -> Option<i64>;

    fn owner_id(&self) -> Option<i64>;

    fn set_owner_id(&mut self, owner_id: Option<i64>);

    /// Identity comparison. Persisted children compare by id; unsaved ones
    /// fall back to their content.
    ///
    /// Two unsaved drafts with identical content are therefore the same
    /// child: attaching the second is a no-op. Save a draft to give it an id
    /// before attaching an identical one.
    fn same_entity(&self, other: &Self) -> bool;
}

/// Attach `child` to `children`, stamping it with `owner_id`.
///
/// Returns `false` without touching the collection when the child is
/// already present.
pub(crate) fn attach<T: OwnedChild>(children: &mut Vec<T>, owner_id: Option<i64>, mut child: T) -> bool {
    if children.iter().any(|c| c.same_entity(&child)) {
        return false;
    }
    child.set_owner_id(owner_id);
    children.push(child);
    true
}

/// Detach the entry matching `child` and hand it back with its owner cleared.
pub(crate) fn detach<T: OwnedChild>(children: &mut Vec<T>, child: &T) -> Option<T> {
    let pos = children.iter().position(|c| c.same_entity(child))?;
    let mut removed = children.remove(pos);
    removed.set_owner_id(None);
    Some(removed)
}

/// Re-stamp every child with `owner_id` (after the store assigned an id).
pub(crate) fn rebind<T: OwnedChild>(children: &mut [T], owner_id: Option<i64>) {
    for child in children {
        child.set_owner_id(owner_id);
    }
}
