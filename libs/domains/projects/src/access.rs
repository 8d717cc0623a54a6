//! The authorization rule shared by every project and task operation.
//!
//! Pure functions over plain data: no request context, no repository access,
//! no side effects. Callers translate `false` into a Forbidden outcome.

use crate::models::Project;
use axum_helpers::CurrentUser;

/// Whether `user` may read this project and work with its tasks.
///
/// True for the owner and for any member (matched by email,
/// case-insensitively, since emails are unique case-insensitively).
pub fn can_access(project: &Project, user: &CurrentUser) -> bool {
    project.owner_id == user.id
        || project
            .members
            .iter()
            .any(|m| m.email.eq_ignore_ascii_case(&user.email))
}

/// Whether `user` may mutate the project itself or its member list.
///
/// Strictly owner-only. Members may read the project and create, update and
/// delete its tasks, but never touch the project record or its membership.
/// This asymmetry is deliberate; do not unify the two rules.
pub fn can_mutate(project: &Project, user: &CurrentUser) -> bool {
    project.owner_id == user.id
}
