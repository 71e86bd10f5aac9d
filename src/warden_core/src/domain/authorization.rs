use thiserror::Error;

use super::Role;

/// A protected operation, described with just enough context to decide on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ChangeRole { new_role: Role },
    DeleteAccount { is_owner: bool },
    ManageStock,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Role '{actor}' is not allowed to perform this action")]
pub struct Forbidden {
    pub actor: Role,
}

/// The single authorization matrix for role-gated operations.
///
/// `target` is the current role of the user being acted on, when there is one.
pub fn can_perform(actor: Role, action: Action, target: Option<Role>) -> Result<(), Forbidden> {
    let allowed = match (actor, action) {
        (Role::Admin, _) => true,
        (Role::Manager, Action::ChangeRole { new_role }) => {
            let target_is_privileged = matches!(target, Some(Role::Admin | Role::Manager));
            let grants_privilege = matches!(new_role, Role::Admin | Role::Manager);
            !target_is_privileged && !grants_privilege
        }
        (_, Action::ChangeRole { .. }) => false,
        (_, Action::DeleteAccount { is_owner }) => is_owner,
        (role, Action::ManageStock) => role.is_stock_employee(),
    };

    if allowed {
        Ok(())
    } else {
        Err(Forbidden { actor })
    }
}
