//! Actor - the authenticated identity an operation runs on behalf of.

use uuid::Uuid;

use crate::domain::UserRole;

/// Identity performing an operation, carried from the auth layer into
/// services and audit records.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this actor may operate on resources owned by `owner_id`.
    pub fn owns_or_admin(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.id == owner_id
    }
}
