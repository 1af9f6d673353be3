//! Projects and group membership.
//!
//! The project board cascades class → projects; each project carries its
//! groups, and professors/coordinators also get the class roster for
//! membership management. Every mutation (create group, add member, remove
//! member) is followed by a full refetch of the tree for the current class —
//! no optimistic patching here, unlike grading. Removing a member goes
//! through an explicit confirmation step.

use super::scoped_list::ListMessages;
use crate::api::types::{ClassRoom, CreateGroupPayload, Group, Project, User};
use crate::api::{Ack, ApiError};
use crate::role::Role;
use crate::views::forms::FormState;
use std::collections::HashSet;
use tracing::debug;

pub const PROJECT_TEXTS: ListMessages = ListMessages {
    no_scopes: "Vous n'êtes inscrit à aucune classe pour le moment.",
    no_items: "Aucun projet pour cette classe.",
    scopes_failed: "Erreur lors du chargement de vos classes.",
    items_failed: "Erreur lors du chargement des projets ou des groupes.",
};

/// A pending fetch of the whole project/group tree for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeFetch {
    pub class_id: i64,
    pub generation: u64,
}

/// A project with its groups.
#[derive(Debug, Clone)]
pub struct ProjectEntry {
    pub project: Project,
    pub groups: Vec<Group>,
}

/// Everything the board fetches per class.
#[derive(Debug, Clone, Default)]
pub struct ProjectTree {
    pub projects: Vec<ProjectEntry>,
    /// Students of the class; empty for roles that cannot manage groups
    pub roster: Vec<User>,
}

/// The create-group form, open under one project at a time.
#[derive(Debug)]
pub struct GroupForm {
    pub project_id: i64,
    pub nom: String,
    pub description: String,
    pub state: FormState,
}

impl GroupForm {
    pub fn validate(&self) -> Result<CreateGroupPayload, ApiError> {
        if self.nom.trim().is_empty() {
            return Err(ApiError::Validation {
                message: "Le nom du groupe ne peut pas être vide.".to_string(),
            });
        }
        Ok(CreateGroupPayload {
            projet_id: self.project_id,
            nom_groupe: self.nom.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

pub struct ProjectBoard {
    can_manage: bool,
    classes: Vec<ClassRoom>,
    selected_class: Option<i64>,
    tree: ProjectTree,
    message: Option<String>,
    generation: u64,
    loading: bool,
    group_form: Option<GroupForm>,
    pending_removal: Option<(i64, i64)>,
}

impl ProjectBoard {
    pub fn new(role: Option<Role>) -> Self {
        Self {
            can_manage: role.map(Role::can_manage_groups).unwrap_or(false),
            classes: Vec::new(),
            selected_class: None,
            tree: ProjectTree::default(),
            message: None,
            generation: 0,
            loading: true,
            group_form: None,
            pending_removal: None,
        }
    }

    pub fn can_manage(&self) -> bool {
        self.can_manage
    }

    pub fn classes(&self) -> &[ClassRoom] {
        &self.classes
    }

    pub fn selected_class(&self) -> Option<i64> {
        self.selected_class
    }

    pub fn projects(&self) -> &[ProjectEntry] {
        &self.tree.projects
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn group_form(&self) -> Option<&GroupForm> {
        self.group_form.as_ref()
    }

    pub fn group_form_mut(&mut self) -> Option<&mut GroupForm> {
        self.group_form.as_mut()
    }

    pub fn pending_removal(&self) -> Option<(i64, i64)> {
        self.pending_removal
    }

    pub fn classes_loaded(&mut self, result: Result<Vec<ClassRoom>, ApiError>) -> Option<TreeFetch> {
        self.loading = false;
        match result {
            Ok(classes) if classes.is_empty() => {
                self.classes = classes;
                self.message = Some(PROJECT_TEXTS.no_scopes.to_string());
                None
            }
            Ok(classes) => {
                self.classes = classes;
                let first = self.classes[0].id;
                Some(self.start_tree_fetch(first))
            }
            Err(err) => {
                self.message = Some(err.user_message(PROJECT_TEXTS.scopes_failed));
                None
            }
        }
    }

    pub fn select_class(&mut self, class_id: i64) -> Option<TreeFetch> {
        if self.selected_class == Some(class_id) {
            return None;
        }
        if !self.classes.iter().any(|c| c.id == class_id) {
            return None;
        }
        Some(self.start_tree_fetch(class_id))
    }

    pub fn select_class_at(&mut self, index: usize) -> Option<TreeFetch> {
        let id = self.classes.get(index)?.id;
        self.select_class(id)
    }

    /// Refetches the whole tree for the current class; issued after every
    /// successful mutation.
    pub fn refetch(&mut self) -> Option<TreeFetch> {
        let id = self.selected_class?;
        let fetch = TreeFetch {
            class_id: id,
            generation: self.bump(),
        };
        self.loading = true;
        Some(fetch)
    }

    fn start_tree_fetch(&mut self, class_id: i64) -> TreeFetch {
        self.selected_class = Some(class_id);
        self.tree = ProjectTree::default();
        self.group_form = None;
        self.pending_removal = None;
        self.message = None;
        self.loading = true;
        TreeFetch {
            class_id,
            generation: self.bump(),
        }
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn tree_loaded(&mut self, fetch: TreeFetch, result: Result<ProjectTree, ApiError>) {
        if fetch.generation != self.generation {
            debug!(class_id = fetch.class_id, "Discarding stale project tree");
            return;
        }
        self.loading = false;
        match result {
            Ok(tree) if tree.projects.is_empty() => {
                self.tree = tree;
                self.message = Some(PROJECT_TEXTS.no_items.to_string());
            }
            Ok(tree) => {
                self.tree = tree;
                self.message = None;
            }
            Err(err) => {
                self.tree = ProjectTree::default();
                self.message = Some(err.user_message(PROJECT_TEXTS.items_failed));
            }
        }
    }

    /// Opens the create-group form under the project at `index`.
    pub fn open_group_form_at(&mut self, index: usize) -> bool {
        if !self.can_manage {
            return false;
        }
        match self.tree.projects.get(index) {
            Some(entry) => {
                self.group_form = Some(GroupForm {
                    project_id: entry.project.id,
                    nom: String::new(),
                    description: String::new(),
                    state: FormState::default(),
                });
                true
            }
            None => false,
        }
    }

    pub fn close_group_form(&mut self) {
        self.group_form = None;
    }

    pub fn group_by_path(&self, project_index: usize, group_index: usize) -> Option<&Group> {
        self.tree.projects.get(project_index)?.groups.get(group_index)
    }

    /// Students of the class who are not yet members of the group: the
    /// add-member selector shows exactly this set.
    pub fn candidates_for(&self, group_id: i64) -> Vec<&User> {
        let members: HashSet<i64> = self
            .tree
            .projects
            .iter()
            .flat_map(|p| &p.groups)
            .filter(|g| g.id == group_id)
            .flat_map(|g| &g.members)
            .map(|m| m.id)
            .collect();
        self.tree
            .roster
            .iter()
            .filter(|u| !members.contains(&u.id))
            .collect()
    }

    /// Asks to remove a member; nothing is issued until confirmed.
    pub fn request_removal(&mut self, group_id: i64, user_id: i64) -> bool {
        if !self.can_manage {
            return false;
        }
        let is_member = self
            .tree
            .projects
            .iter()
            .flat_map(|p| &p.groups)
            .any(|g| g.id == group_id && g.members.iter().any(|m| m.id == user_id));
        if !is_member {
            return false;
        }
        self.pending_removal = Some((group_id, user_id));
        true
    }

    /// Declines the pending removal; no request is issued.
    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    /// Confirms the pending removal, yielding the one DELETE to issue.
    pub fn confirm_removal(&mut self) -> Option<(i64, i64)> {
        self.pending_removal.take()
    }

    /// Applies a mutation outcome; success triggers the full refetch.
    pub fn mutation_finished(
        &mut self,
        result: Result<Ack, ApiError>,
        fallback: &str,
    ) -> Option<TreeFetch> {
        match result {
            Ok(ack) => {
                self.group_form = None;
                self.message = Some(ack.message);
                self.refetch()
            }
            Err(err) => {
                self.message = Some(err.user_message(fallback));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, nom: &str) -> User {
        User {
            id,
            nom: nom.to_string(),
            prenom: "P".to_string(),
            email: None,
            role: "Etudiant".to_string(),
        }
    }

    fn sample_tree() -> ProjectTree {
        ProjectTree {
            projects: vec![ProjectEntry {
                project: Project {
                    id: 1,
                    titre: "Robotique".to_string(),
                    description: None,
                    date_debut: None,
                    date_fin: None,
                    statut: None,
                },
                groups: vec![Group {
                    id: 10,
                    nom: "Groupe A".to_string(),
                    description: None,
                    members: vec![crate::api::types::GroupMember {
                        id: 100,
                        nom: "Durand".to_string(),
                        prenom: "Paul".to_string(),
                    }],
                }],
            }],
            roster: vec![user(100, "Durand"), user(101, "Martin"), user(102, "Petit")],
        }
    }

    fn loaded_board() -> ProjectBoard {
        let mut board = ProjectBoard::new(Some(Role::Professeur));
        let fetch = board
            .classes_loaded(Ok(vec![ClassRoom {
                id: 5,
                nom: "Techno".to_string(),
                description: None,
                code: None,
                professeur_nom: None,
                professeur_prenom: None,
            }]))
            .unwrap();
        board.tree_loaded(fetch, Ok(sample_tree()));
        board
    }

    #[test]
    fn test_candidates_exclude_current_members() {
        let board = loaded_board();
        let ids: Vec<i64> = board.candidates_for(10).iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![101, 102]);
    }

    #[test]
    fn test_removal_requires_confirmation() {
        let mut board = loaded_board();
        assert!(board.request_removal(10, 100));

        // Declining issues nothing and clears the prompt
        board.cancel_removal();
        assert_eq!(board.confirm_removal(), None);

        // Confirming yields exactly one removal target, once
        assert!(board.request_removal(10, 100));
        assert_eq!(board.confirm_removal(), Some((10, 100)));
        assert_eq!(board.confirm_removal(), None);
    }

    #[test]
    fn test_removal_of_non_member_rejected() {
        let mut board = loaded_board();
        assert!(!board.request_removal(10, 101));
        assert_eq!(board.pending_removal(), None);
    }

    #[test]
    fn test_mutation_success_triggers_full_refetch() {
        let mut board = loaded_board();
        let fetch = board
            .mutation_finished(
                Ok(Ack {
                    message: "Membre supprimé.".to_string(),
                }),
                "Erreur.",
            )
            .expect("refetch after mutation");
        assert_eq!(fetch.class_id, 5);
        assert!(board.is_loading());
    }

    #[test]
    fn test_mutation_failure_does_not_refetch() {
        let mut board = loaded_board();
        let refetch = board.mutation_finished(
            Err(ApiError::Backend {
                status: 500,
                message: String::new(),
            }),
            "Erreur lors de la suppression du membre du groupe.",
        );
        assert!(refetch.is_none());
        assert_eq!(
            board.message(),
            Some("Erreur lors de la suppression du membre du groupe.")
        );
    }

    #[test]
    fn test_students_cannot_manage() {
        let mut board = ProjectBoard::new(Some(Role::Etudiant));
        let fetch = board
            .classes_loaded(Ok(vec![ClassRoom {
                id: 5,
                nom: "Techno".to_string(),
                description: None,
                code: None,
                professeur_nom: None,
                professeur_prenom: None,
            }]))
            .unwrap();
        board.tree_loaded(fetch, Ok(sample_tree()));
        assert!(!board.open_group_form_at(0));
        assert!(!board.request_removal(10, 100));
    }

    #[test]
    fn test_group_form_requires_name() {
        let mut board = loaded_board();
        assert!(board.open_group_form_at(0));
        let form = board.group_form().unwrap();
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("nom du groupe"));
    }

    #[test]
    fn test_stale_tree_discarded() {
        let mut board = loaded_board();
        let old = board.refetch().unwrap();
        let new = board.refetch().unwrap();
        board.tree_loaded(new, Ok(ProjectTree::default()));
        board.tree_loaded(old, Ok(sample_tree()));
        assert!(board.projects().is_empty());
    }
}
