//! Submission review and grading.
//!
//! A professor drills class → task → submissions and grades each one through
//! an inline editor. A successful grade patches the one list entry in memory
//! instead of refetching; a failed grade keeps the editor open with the
//! error. Both cascade levels carry generation tokens so a slow response for
//! an abandoned selection cannot clobber the current one.

use crate::api::types::{ClassRoom, GradePayload, Submission, Task};
use crate::api::{Ack, ApiError};
use crate::role::Role;
use tracing::debug;

const CLASSES_FAILED: &str = "Erreur lors du chargement de vos classes.";
const TASKS_FAILED: &str = "Erreur lors du chargement des tâches.";
const SUBMISSIONS_FAILED: &str = "Erreur lors du chargement des soumissions.";
const NOT_AUTHORIZED: &str = "Vous n'avez pas l'autorisation de corriger les soumissions.";

/// A pending task-list fetch for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFetch {
    pub class_id: i64,
    pub generation: u64,
}

/// A pending submission-list fetch for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionFetch {
    pub task_id: i64,
    pub generation: u64,
}

/// The inline grading editor; at most one open at a time.
#[derive(Debug)]
pub struct GradeEditor {
    pub submission_id: i64,
    pub grade_input: String,
    pub feedback_input: String,
    pub message: Option<String>,
    submitting: bool,
}

pub struct SubmissionReview {
    authorized: bool,
    classes: Vec<ClassRoom>,
    selected_class: Option<i64>,
    tasks: Vec<Task>,
    selected_task: Option<i64>,
    submissions: Vec<Submission>,
    message: Option<String>,
    editor: Option<GradeEditor>,
    generation: u64,
    loading: bool,
}

impl SubmissionReview {
    pub fn new(role: Option<Role>) -> Self {
        let authorized = role == Some(Role::Professeur);
        Self {
            authorized,
            classes: Vec::new(),
            selected_class: None,
            tasks: Vec::new(),
            selected_task: None,
            submissions: Vec::new(),
            message: if authorized {
                None
            } else {
                Some(NOT_AUTHORIZED.to_string())
            },
            editor: None,
            generation: 0,
            loading: authorized,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn classes(&self) -> &[ClassRoom] {
        &self.classes
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn selected_class(&self) -> Option<i64> {
        self.selected_class
    }

    pub fn selected_task(&self) -> Option<i64> {
        self.selected_task
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn editor(&self) -> Option<&GradeEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut GradeEditor> {
        self.editor.as_mut()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Feeds in the professor's class list; selects the first class.
    pub fn classes_loaded(&mut self, result: Result<Vec<ClassRoom>, ApiError>) -> Option<TaskFetch> {
        if !self.authorized {
            return None;
        }
        self.loading = false;
        match result {
            Ok(classes) if classes.is_empty() => {
                self.classes = classes;
                self.message = Some("Vous n'avez pas encore créé de classes.".to_string());
                None
            }
            Ok(classes) => {
                self.classes = classes;
                self.message = None;
                let first = self.classes[0].id;
                Some(self.start_task_fetch(first))
            }
            Err(err) => {
                self.message = Some(err.user_message(CLASSES_FAILED));
                None
            }
        }
    }

    /// Changes the selected class; tasks and submissions reset.
    pub fn select_class(&mut self, class_id: i64) -> Option<TaskFetch> {
        if self.selected_class == Some(class_id) {
            return None;
        }
        if !self.classes.iter().any(|c| c.id == class_id) {
            return None;
        }
        Some(self.start_task_fetch(class_id))
    }

    pub fn select_class_at(&mut self, index: usize) -> Option<TaskFetch> {
        let id = self.classes.get(index)?.id;
        self.select_class(id)
    }

    fn start_task_fetch(&mut self, class_id: i64) -> TaskFetch {
        self.selected_class = Some(class_id);
        self.selected_task = None;
        self.tasks.clear();
        self.submissions.clear();
        self.editor = None;
        self.message = None;
        self.loading = true;
        self.generation += 1;
        TaskFetch {
            class_id,
            generation: self.generation,
        }
    }

    pub fn tasks_loaded(&mut self, fetch: TaskFetch, result: Result<Vec<Task>, ApiError>) {
        if fetch.generation != self.generation {
            debug!(class_id = fetch.class_id, "Discarding stale task response");
            return;
        }
        self.loading = false;
        match result {
            Ok(tasks) if tasks.is_empty() => {
                self.tasks = tasks;
                self.message = Some("Aucune tâche assignée pour cette classe.".to_string());
            }
            Ok(tasks) => {
                // The task is left unselected on purpose; grading starts from
                // an explicit task choice.
                self.tasks = tasks;
                self.message = None;
            }
            Err(err) => {
                self.tasks.clear();
                self.message = Some(err.user_message(TASKS_FAILED));
            }
        }
    }

    /// Selects a task and requests its submissions.
    pub fn select_task(&mut self, task_id: i64) -> Option<SubmissionFetch> {
        if self.selected_task == Some(task_id) {
            return None;
        }
        if !self.tasks.iter().any(|t| t.id == task_id) {
            return None;
        }
        self.selected_task = Some(task_id);
        self.submissions.clear();
        self.editor = None;
        self.message = None;
        self.loading = true;
        self.generation += 1;
        Some(SubmissionFetch {
            task_id,
            generation: self.generation,
        })
    }

    pub fn select_task_at(&mut self, index: usize) -> Option<SubmissionFetch> {
        let id = self.tasks.get(index)?.id;
        self.select_task(id)
    }

    pub fn submissions_loaded(
        &mut self,
        fetch: SubmissionFetch,
        result: Result<Vec<Submission>, ApiError>,
    ) {
        if fetch.generation != self.generation {
            debug!(task_id = fetch.task_id, "Discarding stale submission response");
            return;
        }
        self.loading = false;
        match result {
            Ok(submissions) if submissions.is_empty() => {
                self.submissions = submissions;
                self.message = Some("Aucune soumission pour cette tâche.".to_string());
            }
            Ok(submissions) => {
                self.submissions = submissions;
                self.message = None;
            }
            Err(err) => {
                self.submissions.clear();
                self.message = Some(err.user_message(SUBMISSIONS_FAILED));
            }
        }
    }

    /// Opens the editor for one submission, prefilled with its current grade
    /// and feedback. Any previously open editor is replaced.
    pub fn open_editor(&mut self, submission_id: i64) -> bool {
        let Some(submission) = self.submissions.iter().find(|s| s.id == submission_id) else {
            return false;
        };
        self.editor = Some(GradeEditor {
            submission_id,
            grade_input: submission.grade.map(|g| g.to_string()).unwrap_or_default(),
            feedback_input: submission
                .correction_feedback
                .clone()
                .unwrap_or_default(),
            message: None,
            submitting: false,
        });
        true
    }

    pub fn open_editor_at(&mut self, index: usize) -> bool {
        match self.submissions.get(index) {
            Some(submission) => {
                let id = submission.id;
                self.open_editor(id)
            }
            None => false,
        }
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Validates the editor and begins the grade request.
    ///
    /// Returns the submission id and payload to send, or `None` when the
    /// editor is invalid, absent, or already submitting (the validation
    /// message lands in the editor).
    pub fn begin_grade(&mut self) -> Option<(i64, GradePayload)> {
        let editor = self.editor.as_mut()?;
        if editor.submitting {
            return None;
        }
        let grade = match editor.grade_input.trim().parse::<i32>() {
            Ok(grade) if (0..=100).contains(&grade) => grade,
            _ => {
                editor.message =
                    Some("La note doit être un entier entre 0 et 100.".to_string());
                return None;
            }
        };
        editor.submitting = true;
        editor.message = None;
        Some((
            editor.submission_id,
            GradePayload {
                grade,
                feedback: editor.feedback_input.trim().to_string(),
            },
        ))
    }

    /// Applies the grading outcome.
    ///
    /// Success patches the one in-memory entry and closes the editor; the
    /// sibling submissions are untouched and nothing is refetched. Failure
    /// keeps the editor open with the error shown.
    pub fn grade_finished(
        &mut self,
        submission_id: i64,
        payload: &GradePayload,
        result: Result<Ack, ApiError>,
    ) {
        match result {
            Ok(ack) => {
                if let Some(entry) = self.submissions.iter_mut().find(|s| s.id == submission_id) {
                    entry.grade = Some(payload.grade);
                    entry.correction_feedback = if payload.feedback.is_empty() {
                        None
                    } else {
                        Some(payload.feedback.clone())
                    };
                }
                self.editor = None;
                self.message = Some(ack.message);
            }
            Err(err) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.submitting = false;
                    editor.message =
                        Some(err.user_message("Erreur lors de la notation de la soumission."));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(ids: &[i64]) -> Vec<ClassRoom> {
        ids.iter()
            .map(|&id| ClassRoom {
                id,
                nom: format!("Classe {id}"),
                description: None,
                code: None,
                professeur_nom: None,
                professeur_prenom: None,
            })
            .collect()
    }

    fn tasks(ids: &[i64]) -> Vec<Task> {
        ids.iter()
            .map(|&id| Task {
                id,
                titre: format!("Tâche {id}"),
                description: None,
                date_limite: None,
                created_at: None,
            })
            .collect()
    }

    fn submissions(ids: &[i64]) -> Vec<Submission> {
        ids.iter()
            .map(|&id| Submission {
                id,
                student_nom: Some("Durand".to_string()),
                student_prenom: Some("Paul".to_string()),
                task_titre: None,
                class_name: None,
                file_path: None,
                content: Some("réponse".to_string()),
                grade: None,
                correction_feedback: None,
                submitted_at: "2024-03-05T08:30:00.000Z".to_string(),
            })
            .collect()
    }

    fn loaded_review() -> SubmissionReview {
        let mut review = SubmissionReview::new(Some(Role::Professeur));
        let task_fetch = review.classes_loaded(Ok(classes(&[1, 2]))).unwrap();
        review.tasks_loaded(task_fetch, Ok(tasks(&[10, 11])));
        let sub_fetch = review.select_task(10).unwrap();
        review.submissions_loaded(sub_fetch, Ok(submissions(&[100, 101])));
        review
    }

    #[test]
    fn test_non_professor_is_denied() {
        let review = SubmissionReview::new(Some(Role::Etudiant));
        assert!(!review.is_authorized());
        assert_eq!(review.message(), Some(NOT_AUTHORIZED));
    }

    #[test]
    fn test_task_not_preselected_after_class_load() {
        let mut review = SubmissionReview::new(Some(Role::Professeur));
        let fetch = review.classes_loaded(Ok(classes(&[1]))).unwrap();
        review.tasks_loaded(fetch, Ok(tasks(&[10])));
        assert_eq!(review.selected_task(), None);
        assert!(review.submissions().is_empty());
    }

    #[test]
    fn test_class_change_resets_tasks_and_submissions() {
        let mut review = loaded_review();
        assert_eq!(review.submissions().len(), 2);
        let fetch = review.select_class(2).unwrap();
        assert_eq!(fetch.class_id, 2);
        assert!(review.tasks().is_empty());
        assert!(review.submissions().is_empty());
        assert_eq!(review.selected_task(), None);
    }

    #[test]
    fn test_grade_patches_only_target_submission() {
        let mut review = loaded_review();
        assert!(review.open_editor(100));
        {
            let editor = review.editor_mut().unwrap();
            editor.grade_input = "85".to_string();
            editor.feedback_input = "Good".to_string();
        }
        let (id, payload) = review.begin_grade().unwrap();
        assert_eq!(id, 100);
        assert_eq!(payload.grade, 85);

        review.grade_finished(
            id,
            &payload,
            Ok(Ack {
                message: "Note enregistrée.".to_string(),
            }),
        );

        let graded = review.submissions().iter().find(|s| s.id == 100).unwrap();
        assert_eq!(graded.grade, Some(85));
        assert_eq!(graded.correction_feedback.as_deref(), Some("Good"));
        // The sibling is untouched
        let sibling = review.submissions().iter().find(|s| s.id == 101).unwrap();
        assert_eq!(sibling.grade, None);
        assert_eq!(sibling.correction_feedback, None);
        // The editor closed
        assert!(review.editor().is_none());
    }

    #[test]
    fn test_failed_grade_keeps_editor_open() {
        let mut review = loaded_review();
        review.open_editor(100);
        review.editor_mut().unwrap().grade_input = "85".to_string();
        let (id, payload) = review.begin_grade().unwrap();
        review.grade_finished(
            id,
            &payload,
            Err(ApiError::Backend {
                status: 500,
                message: "Erreur interne.".to_string(),
            }),
        );
        let editor = review.editor().expect("editor stays open");
        assert_eq!(editor.message.as_deref(), Some("Erreur interne."));
        // And it can submit again
        assert!(review.begin_grade().is_some());
    }

    #[test]
    fn test_grade_bounds_rejected() {
        let mut review = loaded_review();
        review.open_editor(100);
        for bad in ["101", "-1", "abc", ""] {
            review.editor_mut().unwrap().grade_input = bad.to_string();
            assert!(review.begin_grade().is_none(), "accepted {bad:?}");
        }
        review.editor_mut().unwrap().grade_input = "0".to_string();
        assert!(review.begin_grade().is_some());
    }

    #[test]
    fn test_stale_submission_response_discarded() {
        let mut review = SubmissionReview::new(Some(Role::Professeur));
        let fetch = review.classes_loaded(Ok(classes(&[1]))).unwrap();
        review.tasks_loaded(fetch, Ok(tasks(&[10, 11])));
        let first = review.select_task(10).unwrap();
        let second = review.select_task(11).unwrap();
        review.submissions_loaded(second, Ok(submissions(&[200])));
        review.submissions_loaded(first, Ok(submissions(&[100])));
        assert_eq!(review.submissions()[0].id, 200);
    }

    #[test]
    fn test_only_one_editor_at_a_time() {
        let mut review = loaded_review();
        review.open_editor(100);
        review.open_editor(101);
        assert_eq!(review.editor().unwrap().submission_id, 101);
    }
}
