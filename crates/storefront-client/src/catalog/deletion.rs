//! Two-step delete confirmation

use serde::Serialize;
use storefront_core::ProductId;

/// A delete that has been asked for but not yet confirmed
///
/// Dropping it cancels the delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDeletion {
    id: ProductId,
}

impl PendingDeletion {
    /// Prompt title
    pub const TITLE: &'static str = "Are you sure?";
    /// Prompt body
    pub const TEXT: &'static str = "This action cannot be undone!";
    /// Confirm button label
    pub const CONFIRM_LABEL: &'static str = "Yes, delete it!";

    pub(crate) const fn new(id: ProductId) -> Self {
        Self { id }
    }

    /// Product the delete targets
    pub const fn id(&self) -> ProductId {
        self.id
    }

    /// The user accepted the prompt
    #[must_use]
    pub const fn confirm(self) -> ConfirmedDeletion {
        ConfirmedDeletion { id: self.id }
    }
}

/// A delete the user has confirmed; the only input
/// [`CatalogController::delete`](crate::CatalogController::delete) accepts
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmedDeletion {
    pub(crate) id: ProductId,
}

impl ConfirmedDeletion {
    /// Product the delete targets
    pub const fn id(&self) -> ProductId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_carries_id() {
        let pending = PendingDeletion::new(12);
        assert_eq!(pending.id(), 12);
        assert_eq!(pending.confirm().id(), 12);
    }

    #[test]
    fn test_prompt_text() {
        assert_eq!(PendingDeletion::TITLE, "Are you sure?");
        assert_eq!(PendingDeletion::TEXT, "This action cannot be undone!");
    }
}
