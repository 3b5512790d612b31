//! Authorization rules.
//!
//! Every permission decision in the service layer goes through [`may`], so
//! the complete rule set lives in one place and is testable without storage
//! or transport. `super_user` satisfies any capability check here, but it is
//! never expanded into the individual flags in storage.

use crate::models::user::{Permissions, User};

/// A privileged operation an actor may attempt.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Look up a user record. Self-lookup needs no capability.
    ViewUser { target_id: i64 },
    /// Create a user, optionally granting `super_user` to the new account.
    AddUser { grants_super_user: bool },
    /// Edit profile fields. Self-edit needs no capability.
    EditUser { target_id: i64 },
    /// Replace a target's permission record. With `target: None` only the
    /// actor-side rules are evaluated — services use that form before the
    /// target row is loaded, then re-check with the loaded target.
    ChangePermissions {
        target: Option<&'a User>,
        new: &'a Permissions,
    },
    /// Set `banned = true` on a target.
    BanUser,
}

fn grants(perms: &Permissions, flag: bool) -> bool {
    perms.super_user || flag
}

/// Decide whether `actor` may perform `action`.
pub fn may(actor: &User, action: Action<'_>) -> bool {
    let p = &actor.permissions;
    match action {
        Action::ViewUser { target_id } => {
            actor.id == target_id || grants(p, p.can_view_users)
        }
        Action::AddUser { grants_super_user } => {
            // Only a super user may mint another one.
            grants(p, p.can_add_users) && (!grants_super_user || p.super_user)
        }
        Action::EditUser { target_id } => {
            actor.id == target_id || grants(p, p.can_edit_user_profile)
        }
        Action::ChangePermissions { target, new } => {
            if !grants(p, p.can_edit_user_permissions) {
                return false;
            }
            if new.super_user && !p.super_user {
                return false;
            }
            // Escalation guard: a target that is itself super user, or that
            // can edit permissions, is off limits to non-super actors.
            if let Some(target) = target {
                if !p.super_user
                    && (target.permissions.super_user
                        || target.permissions.can_edit_user_permissions)
                {
                    return false;
                }
            }
            true
        }
        Action::BanUser => grants(p, p.can_ban_users),
    }
}
