//! Task views for students: the per-class task list with inline submission,
//! the list of one's own submissions, and the single-submission detail.

use super::scoped_list::{ListMessages, ScopedList};
use crate::api::types::{Submission, SubmitTaskPayload, Task};
use crate::api::{Ack, ApiError};
use crate::views::forms::FormState;

pub const TASK_LIST_TEXTS: ListMessages = ListMessages {
    no_scopes: "Vous n'êtes inscrit à aucune classe pour le moment.",
    no_items: "Aucune tâche pour cette classe.",
    scopes_failed: "Erreur lors du chargement de vos classes.",
    items_failed: "Erreur lors du chargement des tâches.",
};

/// Inline submission form, open for one task at a time.
#[derive(Debug)]
pub struct TaskSubmitForm {
    pub task_id: i64,
    pub file_path: String,
    pub content: String,
    pub state: FormState,
}

impl TaskSubmitForm {
    fn new(task_id: i64) -> Self {
        Self {
            task_id,
            file_path: String::new(),
            content: String::new(),
            state: FormState::default(),
        }
    }

    /// A submission needs a link/path or a text content; with neither, the
    /// request is never issued.
    pub fn validate(&self) -> Result<SubmitTaskPayload, ApiError> {
        if self.file_path.trim().is_empty() && self.content.trim().is_empty() {
            return Err(ApiError::Validation {
                message: "Veuillez fournir un lien/chemin ou un contenu pour la soumission."
                    .to_string(),
            });
        }
        Ok(SubmitTaskPayload {
            file_path: self.file_path.trim().to_string(),
            content: self.content.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                self.file_path.clear();
                self.content.clear();
                self.state.finish_ok(ack.message);
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors de la soumission de la tâche."),
        }
    }
}

/// The per-class task list. Professors read it; students additionally submit.
pub struct TaskBoard {
    pub list: ScopedList<Task>,
    submit_form: Option<TaskSubmitForm>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self {
            list: ScopedList::new(TASK_LIST_TEXTS),
            submit_form: None,
        }
    }

    pub fn submit_form(&self) -> Option<&TaskSubmitForm> {
        self.submit_form.as_ref()
    }

    pub fn submit_form_mut(&mut self) -> Option<&mut TaskSubmitForm> {
        self.submit_form.as_mut()
    }

    /// Opens the submission form for the task at `index` in the current list.
    pub fn open_submit_at(&mut self, index: usize) -> bool {
        match self.list.items().get(index) {
            Some(task) => {
                self.submit_form = Some(TaskSubmitForm::new(task.id));
                true
            }
            None => false,
        }
    }

    pub fn close_submit(&mut self) {
        self.submit_form = None;
    }
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// The student's own submissions across all classes.
pub struct MySubmissions {
    submissions: Vec<Submission>,
    message: Option<String>,
    loading: bool,
}

impl MySubmissions {
    pub fn new() -> Self {
        Self {
            submissions: Vec::new(),
            message: None,
            loading: true,
        }
    }

    pub fn loaded(&mut self, result: Result<Vec<Submission>, ApiError>) {
        self.loading = false;
        match result {
            Ok(submissions) if submissions.is_empty() => {
                self.submissions = submissions;
                self.message = Some("Vous n'avez encore soumis aucune tâche.".to_string());
            }
            Ok(submissions) => {
                self.submissions = submissions;
                self.message = None;
            }
            Err(err) => {
                self.submissions.clear();
                self.message =
                    Some(err.user_message("Erreur lors du chargement de vos soumissions."));
            }
        }
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl Default for MySubmissions {
    fn default() -> Self {
        Self::new()
    }
}

/// Detail of a single submission, fetched by id.
pub struct SubmissionDetail {
    submission: Option<Submission>,
    message: Option<String>,
}

impl SubmissionDetail {
    pub fn new() -> Self {
        Self {
            submission: None,
            message: None,
        }
    }

    pub fn loaded(&mut self, result: Result<Submission, ApiError>) {
        match result {
            Ok(submission) => {
                self.submission = Some(submission);
                self.message = None;
            }
            Err(err) => {
                self.submission = None;
                self.message =
                    Some(err.user_message("Erreur lors du chargement de la soumission."));
            }
        }
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// "En attente de correction" until a grade or feedback exists.
    pub fn pending_correction(&self) -> bool {
        self.submission
            .as_ref()
            .map(|s| s.grade.is_none() && s.correction_feedback.is_none())
            .unwrap_or(false)
    }
}

impl Default for SubmissionDetail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ClassRoom;

    fn one_class() -> Vec<ClassRoom> {
        vec![ClassRoom {
            id: 5,
            nom: "Maths".to_string(),
            description: None,
            code: None,
            professeur_nom: None,
            professeur_prenom: None,
        }]
    }

    fn one_task() -> Vec<Task> {
        vec![Task {
            id: 42,
            titre: "Devoir 1".to_string(),
            description: None,
            date_limite: Some("2024-04-01".to_string()),
            created_at: None,
        }]
    }

    #[test]
    fn test_submit_requires_link_or_content() {
        let mut board = TaskBoard::new();
        let fetch = board.list.scopes_loaded(Ok(one_class())).unwrap();
        board.list.items_loaded(fetch, Ok(one_task()));
        assert!(board.open_submit_at(0));

        let form = board.submit_form().unwrap();
        let err = form.validate().unwrap_err();
        assert!(
            err.to_string().contains("lien/chemin ou un contenu"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn test_submit_with_content_only_is_valid() {
        let mut form = TaskSubmitForm::new(42);
        form.content = "Ma réponse".to_string();
        let payload = form.validate().unwrap();
        assert_eq!(payload.content, "Ma réponse");
        assert!(payload.file_path.is_empty());
    }

    #[test]
    fn test_submit_success_clears_fields() {
        let mut form = TaskSubmitForm::new(42);
        form.file_path = "https://ex.fr/devoir.pdf".to_string();
        form.finish(Ok(Ack {
            message: "Soumission enregistrée.".to_string(),
        }));
        assert!(form.file_path.is_empty());
        assert_eq!(form.state.message(), Some("Soumission enregistrée."));
    }

    #[test]
    fn test_open_submit_for_unknown_index() {
        let mut board = TaskBoard::new();
        assert!(!board.open_submit_at(3));
        assert!(board.submit_form().is_none());
    }

    #[test]
    fn test_my_submissions_empty_message() {
        let mut view = MySubmissions::new();
        view.loaded(Ok(vec![]));
        assert_eq!(
            view.message(),
            Some("Vous n'avez encore soumis aucune tâche.")
        );
    }

    #[test]
    fn test_detail_pending_correction() {
        let mut detail = SubmissionDetail::new();
        detail.loaded(Ok(Submission {
            id: 1,
            student_nom: None,
            student_prenom: None,
            task_titre: Some("Devoir 1".to_string()),
            class_name: Some("Maths".to_string()),
            file_path: None,
            content: Some("x".to_string()),
            grade: None,
            correction_feedback: None,
            submitted_at: "2024-03-05T08:30:00.000Z".to_string(),
        }));
        assert!(detail.pending_correction());
    }
}
