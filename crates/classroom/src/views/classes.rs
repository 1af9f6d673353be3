//! The class list ("Classements").
//!
//! One flat fetch: professors see the classes they own (with join codes),
//! everyone else the classes they belong to.

use crate::api::types::ClassRoom;
use crate::api::ApiError;
use crate::role::Role;

pub struct ClassList {
    /// Professors get the owner listing with join codes
    owner_view: bool,
    classes: Vec<ClassRoom>,
    message: Option<String>,
    loading: bool,
}

impl ClassList {
    pub fn new(role: Option<Role>) -> Self {
        Self {
            owner_view: role == Some(Role::Professeur),
            classes: Vec::new(),
            message: None,
            loading: true,
        }
    }

    pub fn is_owner_view(&self) -> bool {
        self.owner_view
    }

    pub fn loaded(&mut self, result: Result<Vec<ClassRoom>, ApiError>) {
        self.loading = false;
        match result {
            Ok(classes) if classes.is_empty() => {
                self.classes = classes;
                self.message = Some(if self.owner_view {
                    "Vous n'avez pas encore créé de classes.".to_string()
                } else {
                    "Vous n'êtes inscrit à aucune classe pour le moment.".to_string()
                });
            }
            Ok(classes) => {
                self.classes = classes;
                self.message = None;
            }
            Err(err) => {
                self.classes.clear();
                self.message =
                    Some(err.user_message("Erreur lors du chargement de vos classes."));
            }
        }
    }

    pub fn classes(&self) -> &[ClassRoom] {
        &self.classes
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_listing_keeps_join_code() {
        let mut list = ClassList::new(Some(Role::Professeur));
        assert!(list.is_owner_view());
        list.loaded(Ok(vec![ClassRoom {
            id: 1,
            nom: "Biology 101".to_string(),
            description: Some("Intro".to_string()),
            code: Some("AB12C3".to_string()),
            professeur_nom: None,
            professeur_prenom: None,
        }]));
        assert_eq!(list.classes()[0].code.as_deref(), Some("AB12C3"));
        assert_eq!(list.classes()[0].nom, "Biology 101");
    }

    #[test]
    fn test_joined_class_appears_on_next_fetch() {
        use crate::views::forms::JoinClassForm;

        // The student submits a join code...
        let mut form = JoinClassForm {
            code: "AB12C3".to_string(),
            ..Default::default()
        };
        let payload = form.validate().unwrap();
        assert_eq!(payload.code, "AB12C3");
        form.finish(Ok(crate::api::Ack {
            message: "Classe rejointe.".to_string(),
        }));
        assert!(form.code.is_empty());

        // ...and the next class-list fetch reflects the membership.
        let mut list = ClassList::new(Some(Role::Etudiant));
        list.loaded(Ok(vec![ClassRoom {
            id: 1,
            nom: "Biology 101".to_string(),
            description: None,
            code: Some("AB12C3".to_string()),
            professeur_nom: Some("Curie".to_string()),
            professeur_prenom: Some("Marie".to_string()),
        }]));
        assert_eq!(list.classes()[0].nom, "Biology 101");
    }

    #[test]
    fn test_student_empty_guidance() {
        let mut list = ClassList::new(Some(Role::Etudiant));
        list.loaded(Ok(vec![]));
        assert_eq!(
            list.message(),
            Some("Vous n'êtes inscrit à aucune classe pour le moment.")
        );
    }
}
