//! User management, reserved to coordinators.
//!
//! Role changes refetch the whole roster afterwards; deletions go through a
//! confirmation step. Two guards run client-side before any request: a
//! coordinator cannot demote themselves and cannot delete themselves (the
//! backend enforces the same rules; catching them here keeps the roster
//! consistent and the error local).

use crate::api::types::{ChangeRolePayload, User};
use crate::api::{Ack, ApiError};
use crate::role::Role;

const NOT_AUTHORIZED: &str = "Vous n'avez pas l'autorisation de gérer les utilisateurs.";
const USERS_FAILED: &str = "Erreur lors du chargement des utilisateurs.";

/// The role-edit row state.
#[derive(Debug, Clone, Copy)]
pub struct RoleEdit {
    pub user_id: i64,
    pub selected: Role,
}

pub struct UserAdmin {
    authorized: bool,
    self_id: i64,
    users: Vec<User>,
    message: Option<String>,
    loading: bool,
    edit: Option<RoleEdit>,
    pending_delete: Option<i64>,
    submitting: bool,
}

impl UserAdmin {
    pub fn new(role: Option<Role>, self_id: i64) -> Self {
        let authorized = role == Some(Role::Coordinateur);
        Self {
            authorized,
            self_id,
            users: Vec::new(),
            message: if authorized {
                None
            } else {
                Some(NOT_AUTHORIZED.to_string())
            },
            loading: authorized,
            edit: None,
            pending_delete: None,
            submitting: false,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn edit(&self) -> Option<RoleEdit> {
        self.edit
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn users_loaded(&mut self, result: Result<Vec<User>, ApiError>) {
        if !self.authorized {
            return;
        }
        self.loading = false;
        match result {
            Ok(users) => {
                self.users = users;
                self.message = None;
            }
            Err(err) => {
                self.users.clear();
                self.message = Some(err.user_message(USERS_FAILED));
            }
        }
    }

    /// Opens the role editor for the user at `index`, preselecting their
    /// current role.
    pub fn begin_edit_at(&mut self, index: usize) -> bool {
        if !self.authorized {
            return false;
        }
        match self.users.get(index) {
            Some(user) => {
                let current = Role::from_wire(&user.role).unwrap_or(Role::Etudiant);
                self.edit = Some(RoleEdit {
                    user_id: user.id,
                    selected: current,
                });
                true
            }
            None => false,
        }
    }

    pub fn choose_role(&mut self, role: Role) {
        if let Some(edit) = self.edit.as_mut() {
            edit.selected = role;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Validates the edit and returns the role-change request to issue.
    pub fn begin_role_change(&mut self) -> Option<(i64, ChangeRolePayload)> {
        if self.submitting {
            return None;
        }
        let edit = self.edit?;
        if edit.user_id == self.self_id && edit.selected != Role::Coordinateur {
            self.message = Some(
                "Vous ne pouvez pas rétrograder votre propre rôle de Coordinateur.".to_string(),
            );
            return None;
        }
        self.submitting = true;
        Some((
            edit.user_id,
            ChangeRolePayload {
                role: edit.selected.wire_name().to_string(),
            },
        ))
    }

    /// Applies a role-change outcome. Returns true when the roster must be
    /// refetched (success path).
    pub fn role_change_finished(&mut self, result: Result<Ack, ApiError>) -> bool {
        self.submitting = false;
        match result {
            Ok(ack) => {
                self.edit = None;
                self.message = Some(ack.message);
                self.loading = true;
                true
            }
            Err(err) => {
                self.message =
                    Some(err.user_message("Erreur lors de la modification du rôle."));
                false
            }
        }
    }

    /// Asks to delete the user at `index`; guarded, then confirmed.
    pub fn request_delete_at(&mut self, index: usize) -> bool {
        if !self.authorized {
            return false;
        }
        let Some(user) = self.users.get(index) else {
            return false;
        };
        if user.id == self.self_id {
            self.message =
                Some("Vous ne pouvez pas supprimer votre propre compte.".to_string());
            return false;
        }
        if Role::from_wire(&user.role) == Some(Role::Coordinateur) {
            self.message =
                Some("Un compte Coordinateur ne peut pas être supprimé ici.".to_string());
            return false;
        }
        self.pending_delete = Some(user.id);
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Confirms the pending deletion, yielding the user id to delete.
    pub fn confirm_delete(&mut self) -> Option<i64> {
        self.pending_delete.take()
    }

    /// Applies a deletion outcome; returns true when the roster must be
    /// refetched.
    pub fn delete_finished(&mut self, result: Result<Ack, ApiError>) -> bool {
        match result {
            Ok(ack) => {
                self.message = Some(ack.message);
                self.loading = true;
                true
            }
            Err(err) => {
                self.message =
                    Some(err.user_message("Erreur lors de la suppression de l'utilisateur."));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: &str) -> User {
        User {
            id,
            nom: format!("Nom{id}"),
            prenom: format!("Prenom{id}"),
            email: Some(format!("u{id}@ex.fr")),
            role: role.to_string(),
        }
    }

    fn loaded_admin() -> UserAdmin {
        let mut admin = UserAdmin::new(Some(Role::Coordinateur), 1);
        admin.users_loaded(Ok(vec![
            user(1, "Coordinateur"),
            user(2, "Etudiant"),
            user(3, "Professeur"),
        ]));
        admin
    }

    #[test]
    fn test_non_coordinator_denied() {
        let mut admin = UserAdmin::new(Some(Role::Professeur), 3);
        assert!(!admin.is_authorized());
        assert_eq!(admin.message(), Some(NOT_AUTHORIZED));
        admin.users_loaded(Ok(vec![user(2, "Etudiant")]));
        assert!(admin.users().is_empty());
    }

    #[test]
    fn test_role_change_flow() {
        let mut admin = loaded_admin();
        assert!(admin.begin_edit_at(1));
        admin.choose_role(Role::Professeur);
        let (user_id, payload) = admin.begin_role_change().unwrap();
        assert_eq!(user_id, 2);
        assert_eq!(payload.role, "Professeur");

        let refetch = admin.role_change_finished(Ok(Ack {
            message: "Rôle modifié.".to_string(),
        }));
        assert!(refetch);

        // The refetched roster reflects the new role
        admin.users_loaded(Ok(vec![
            user(1, "Coordinateur"),
            user(2, "Professeur"),
            user(3, "Professeur"),
        ]));
        assert_eq!(admin.users()[1].role, "Professeur");
    }

    #[test]
    fn test_self_demotion_blocked() {
        let mut admin = loaded_admin();
        assert!(admin.begin_edit_at(0));
        admin.choose_role(Role::Etudiant);
        assert!(admin.begin_role_change().is_none());
        assert!(admin
            .message()
            .unwrap()
            .contains("votre propre rôle"));
    }

    #[test]
    fn test_self_keeping_coordinator_allowed() {
        let mut admin = loaded_admin();
        admin.begin_edit_at(0);
        admin.choose_role(Role::Coordinateur);
        assert!(admin.begin_role_change().is_some());
    }

    #[test]
    fn test_self_deletion_blocked() {
        let mut admin = loaded_admin();
        assert!(!admin.request_delete_at(0));
        assert_eq!(admin.pending_delete(), None);
    }

    #[test]
    fn test_coordinator_deletion_blocked() {
        let mut admin = UserAdmin::new(Some(Role::Coordinateur), 9);
        admin.users_loaded(Ok(vec![user(1, "Coordinateur")]));
        assert!(!admin.request_delete_at(0));
    }

    #[test]
    fn test_delete_confirmation_flow() {
        let mut admin = loaded_admin();
        assert!(admin.request_delete_at(1));

        // Declining issues no request
        admin.cancel_delete();
        assert_eq!(admin.confirm_delete(), None);

        // Confirming yields the target exactly once
        assert!(admin.request_delete_at(1));
        assert_eq!(admin.confirm_delete(), Some(2));
        assert_eq!(admin.confirm_delete(), None);
    }

    #[test]
    fn test_failed_role_change_keeps_editor() {
        let mut admin = loaded_admin();
        admin.begin_edit_at(1);
        admin.choose_role(Role::Professeur);
        let _ = admin.begin_role_change().unwrap();
        let refetch = admin.role_change_finished(Err(ApiError::Backend {
            status: 500,
            message: String::new(),
        }));
        assert!(!refetch);
        assert!(admin.edit().is_some());
    }
}
