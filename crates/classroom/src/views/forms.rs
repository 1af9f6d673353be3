//! Form-submit views.
//!
//! Shared shape: collect required fields, guard against double submission,
//! clear the fields and show the backend's message on success, keep the
//! fields and show the error on failure. Only required-field presence is
//! checked client-side; everything semantic belongs to the backend.

use crate::api::types::{
    ClassRoom, CreateAnnouncementPayload, CreateClassPayload, CreateDocumentationPayload,
    CreateProjectPayload, CreateTaskPayload, CreatedClass, JoinClassPayload, LoginPayload,
    RegisterPayload, SendMessagePayload, User,
};
use crate::api::{Ack, ApiError};
use crate::role::Role;
use chrono::NaiveDate;

/// Submission bookkeeping shared by every form.
#[derive(Debug, Default)]
pub struct FormState {
    submitting: bool,
    message: Option<String>,
}

impl FormState {
    /// Marks the request as in flight. Returns false when one already is —
    /// the double-submit guard.
    pub fn begin(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        self.message = None;
        true
    }

    /// Records a client-side rejection; no request was started.
    pub fn reject(&mut self, err: &ApiError) {
        self.message = Some(err.to_string());
    }

    pub fn finish_ok(&mut self, message: String) {
        self.submitting = false;
        self.message = Some(message);
    }

    pub fn finish_err(&mut self, err: &ApiError, fallback: &str) {
        self.submitting = false;
        self.message = Some(err.user_message(fallback));
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

fn required(message: &str) -> ApiError {
    ApiError::Validation {
        message: message.to_string(),
    }
}

/// The class dropdown embedded in creator forms.
///
/// Unlike the list views, these forms keep the previously entered fields when
/// the selected class changes — only the target of the submission moves.
#[derive(Debug, Default)]
pub struct ClassPicker {
    classes: Vec<ClassRoom>,
    selected: Option<i64>,
    message: Option<String>,
}

impl ClassPicker {
    pub fn loaded(&mut self, result: Result<Vec<ClassRoom>, ApiError>, empty: &str, failed: &str) {
        match result {
            Ok(classes) if classes.is_empty() => {
                self.classes = classes;
                self.selected = None;
                self.message = Some(empty.to_string());
            }
            Ok(classes) => {
                self.selected = Some(classes[0].id);
                self.classes = classes;
                self.message = None;
            }
            Err(err) => {
                self.classes.clear();
                self.selected = None;
                self.message = Some(err.user_message(failed));
            }
        }
    }

    pub fn select_at(&mut self, index: usize) -> bool {
        match self.classes.get(index) {
            Some(class) => {
                self.selected = Some(class.id);
                true
            }
            None => false,
        }
    }

    pub fn classes(&self) -> &[ClassRoom] {
        &self.classes
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn require(&self) -> Result<i64, ApiError> {
        self.selected
            .ok_or_else(|| required("Veuillez sélectionner une classe."))
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub mot_de_passe: String,
    pub state: FormState,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginPayload, ApiError> {
        if self.email.trim().is_empty() || self.mot_de_passe.is_empty() {
            return Err(required("Veuillez renseigner votre email et votre mot de passe."));
        }
        Ok(LoginPayload {
            email: self.email.trim().to_string(),
            mot_de_passe: self.mot_de_passe.clone(),
        })
    }

    pub fn failed(&mut self, err: &ApiError) {
        self.state.finish_err(err, "Erreur lors de la connexion.");
    }
}

#[derive(Debug)]
pub struct RegisterForm {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub mot_de_passe: String,
    pub role: Role,
    pub state: FormState,
    /// Set on success: the app switches back to the login view shortly after
    pub switch_pending: bool,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            nom: String::new(),
            prenom: String::new(),
            email: String::new(),
            mot_de_passe: String::new(),
            // Default role unless explicitly chosen
            role: Role::Etudiant,
            state: FormState::default(),
            switch_pending: false,
        }
    }
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterPayload, ApiError> {
        if self.nom.trim().is_empty()
            || self.prenom.trim().is_empty()
            || self.email.trim().is_empty()
            || self.mot_de_passe.is_empty()
        {
            return Err(required("Veuillez remplir tous les champs."));
        }
        Ok(RegisterPayload {
            nom: self.nom.trim().to_string(),
            prenom: self.prenom.trim().to_string(),
            email: self.email.trim().to_string(),
            mot_de_passe: self.mot_de_passe.clone(),
            role: self.role.wire_name().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(_) => {
                self.nom.clear();
                self.prenom.clear();
                self.email.clear();
                self.mot_de_passe.clear();
                self.role = Role::Etudiant;
                self.state.finish_ok(
                    "Inscription réussie ! Vous pouvez maintenant vous connecter.".to_string(),
                );
                self.switch_pending = true;
            }
            Err(err) => self.state.finish_err(&err, "Erreur lors de l'inscription."),
        }
    }
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CreateClassForm {
    pub nom: String,
    pub description: String,
    pub state: FormState,
}

impl CreateClassForm {
    pub fn validate(&self) -> Result<CreateClassPayload, ApiError> {
        if self.nom.trim().is_empty() {
            return Err(required("Le nom de la classe est requis."));
        }
        Ok(CreateClassPayload {
            nom: self.nom.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<CreatedClass, ApiError>) {
        match result {
            Ok(created) => {
                self.nom.clear();
                self.description.clear();
                let code = created.class.code.as_deref().unwrap_or("?");
                self.state
                    .finish_ok(format!("{} Code de la classe : {}", created.message, code));
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors de la création de la classe."),
        }
    }
}

#[derive(Debug, Default)]
pub struct JoinClassForm {
    pub code: String,
    pub state: FormState,
}

impl JoinClassForm {
    pub fn validate(&self) -> Result<JoinClassPayload, ApiError> {
        if self.code.trim().is_empty() {
            return Err(required("Veuillez saisir le code de la classe."));
        }
        Ok(JoinClassPayload {
            code: self.code.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                self.code.clear();
                self.state.finish_ok(ack.message);
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors de la tentative de rejoindre la classe."),
        }
    }
}

// ---------------------------------------------------------------------------
// Class-scoped creators
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AnnouncementForm {
    pub picker: ClassPicker,
    pub titre: String,
    pub contenu: String,
    pub state: FormState,
}

impl AnnouncementForm {
    pub fn validate(&self) -> Result<CreateAnnouncementPayload, ApiError> {
        let class_id = self.picker.require()?;
        if self.titre.trim().is_empty() || self.contenu.trim().is_empty() {
            return Err(required("Veuillez remplir tous les champs."));
        }
        Ok(CreateAnnouncementPayload {
            class_id,
            titre: self.titre.trim().to_string(),
            contenu: self.contenu.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                self.titre.clear();
                self.contenu.clear();
                self.state.finish_ok(ack.message);
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors de la création de l'annonce."),
        }
    }
}

#[derive(Debug, Default)]
pub struct TaskForm {
    pub picker: ClassPicker,
    pub titre: String,
    pub description: String,
    pub date_limite: String,
    pub state: FormState,
}

impl TaskForm {
    pub fn validate(&self) -> Result<CreateTaskPayload, ApiError> {
        let class_id = self.picker.require()?;
        if self.titre.trim().is_empty()
            || self.description.trim().is_empty()
            || self.date_limite.trim().is_empty()
        {
            return Err(required("Veuillez remplir tous les champs."));
        }
        Ok(CreateTaskPayload {
            class_id,
            titre: self.titre.trim().to_string(),
            description: self.description.trim().to_string(),
            date_limite: self.date_limite.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                self.titre.clear();
                self.description.clear();
                self.date_limite.clear();
                self.state.finish_ok(ack.message);
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors de l'attribution de la tâche."),
        }
    }
}

#[derive(Debug, Default)]
pub struct DocumentationForm {
    pub picker: ClassPicker,
    pub titre: String,
    pub description: String,
    pub file_path: String,
    pub state: FormState,
}

impl DocumentationForm {
    pub fn validate(&self) -> Result<CreateDocumentationPayload, ApiError> {
        let class_id = self.picker.require()?;
        if self.titre.trim().is_empty() || self.file_path.trim().is_empty() {
            return Err(required("Veuillez renseigner un titre et un lien."));
        }
        Ok(CreateDocumentationPayload {
            class_id,
            titre: self.titre.trim().to_string(),
            description: self.description.trim().to_string(),
            file_path: self.file_path.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                self.titre.clear();
                self.description.clear();
                self.file_path.clear();
                self.state.finish_ok(ack.message);
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors du partage du document."),
        }
    }
}

#[derive(Debug, Default)]
pub struct ProjectForm {
    pub picker: ClassPicker,
    pub titre: String,
    pub description: String,
    pub date_debut: String,
    pub date_fin: String,
    pub state: FormState,
}

impl ProjectForm {
    pub fn validate(&self) -> Result<CreateProjectPayload, ApiError> {
        let class_id = self.picker.require()?;
        if self.titre.trim().is_empty()
            || self.date_debut.trim().is_empty()
            || self.date_fin.trim().is_empty()
        {
            return Err(required("Veuillez renseigner le titre et les deux dates."));
        }
        let debut = parse_date(self.date_debut.trim())?;
        let fin = parse_date(self.date_fin.trim())?;
        if debut > fin {
            return Err(required(
                "La date de début ne peut pas être postérieure à la date de fin.",
            ));
        }
        Ok(CreateProjectPayload {
            class_id,
            titre: self.titre.trim().to_string(),
            description: self.description.trim().to_string(),
            date_debut: self.date_debut.trim().to_string(),
            date_fin: self.date_fin.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                self.titre.clear();
                self.description.clear();
                self.date_debut.clear();
                self.date_fin.clear();
                self.state.finish_ok(ack.message);
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors de la création du projet."),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        required("Les dates doivent être au format AAAA-MM-JJ.")
    })
}

// ---------------------------------------------------------------------------
// Message composer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Private,
    Public,
}

impl MessageKind {
    fn wire_name(self) -> &'static str {
        match self {
            MessageKind::Private => "private",
            MessageKind::Public => "public",
        }
    }
}

/// The send-message view: a recipient (private) or class (public) target plus
/// free-text content.
pub struct MessageComposer {
    pub kind: MessageKind,
    pub content: String,
    pub state: FormState,
    role: Option<Role>,
    recipients: Vec<User>,
    selected_recipient: Option<i64>,
    classes: Vec<ClassRoom>,
    selected_class: Option<i64>,
}

impl MessageComposer {
    pub fn new(role: Option<Role>) -> Self {
        Self {
            kind: MessageKind::Private,
            content: String::new(),
            state: FormState::default(),
            role,
            recipients: Vec::new(),
            selected_recipient: None,
            classes: Vec::new(),
            selected_class: None,
        }
    }

    /// Installs the possible private recipients, excluding the sender.
    pub fn recipients_loaded(&mut self, users: Vec<User>, self_id: i64) {
        self.recipients = users.into_iter().filter(|u| u.id != self_id).collect();
        self.selected_recipient = self.recipients.first().map(|u| u.id);
    }

    /// Installs the classes a public message may target.
    pub fn classes_loaded(&mut self, classes: Vec<ClassRoom>) {
        self.selected_class = classes.first().map(|c| c.id);
        self.classes = classes;
    }

    pub fn recipients(&self) -> &[User] {
        &self.recipients
    }

    pub fn classes(&self) -> &[ClassRoom] {
        &self.classes
    }

    pub fn selected_recipient(&self) -> Option<i64> {
        self.selected_recipient
    }

    pub fn selected_class(&self) -> Option<i64> {
        self.selected_class
    }

    pub fn select_recipient_at(&mut self, index: usize) -> bool {
        match self.recipients.get(index) {
            Some(user) => {
                self.selected_recipient = Some(user.id);
                true
            }
            None => false,
        }
    }

    pub fn select_class_at(&mut self, index: usize) -> bool {
        match self.classes.get(index) {
            Some(class) => {
                self.selected_class = Some(class.id);
                true
            }
            None => false,
        }
    }

    /// True if the active role may compose public messages at all.
    pub fn public_allowed(&self) -> bool {
        self.role.map(Role::can_post_public).unwrap_or(false)
    }

    pub fn validate(&self) -> Result<SendMessagePayload, ApiError> {
        if self.content.trim().is_empty() {
            return Err(required("Le message ne peut pas être vide."));
        }
        match self.kind {
            MessageKind::Private => {
                let receiver_id = self
                    .selected_recipient
                    .ok_or_else(|| required("Veuillez sélectionner un destinataire."))?;
                Ok(SendMessagePayload {
                    message_type: MessageKind::Private.wire_name().to_string(),
                    content: self.content.trim().to_string(),
                    receiver_id: Some(receiver_id),
                    class_id: None,
                })
            }
            MessageKind::Public => {
                // Defensive re-check; the router normally keeps students out
                if !self.public_allowed() {
                    return Err(required(
                        "Seuls les professeurs et coordinateurs peuvent envoyer des messages publics.",
                    ));
                }
                let class_id = self
                    .selected_class
                    .ok_or_else(|| required("Veuillez sélectionner une classe."))?;
                Ok(SendMessagePayload {
                    message_type: MessageKind::Public.wire_name().to_string(),
                    content: self.content.trim().to_string(),
                    receiver_id: None,
                    class_id: Some(class_id),
                })
            }
        }
    }

    pub fn finish(&mut self, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                self.content.clear();
                self.state.finish_ok(ack.message);
            }
            Err(err) => self
                .state
                .finish_err(&err, "Erreur lors de l'envoi du message."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_ack() -> Result<Ack, ApiError> {
        Ok(Ack {
            message: "Enregistré.".to_string(),
        })
    }

    #[test]
    fn test_double_submit_guard() {
        let mut state = FormState::default();
        assert!(state.begin());
        assert!(!state.begin());
        state.finish_ok("ok".to_string());
        assert!(state.begin());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let form = LoginForm {
            email: "mc@ex.fr".to_string(),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(ApiError::Validation { .. })));
    }

    #[test]
    fn test_register_defaults_to_student() {
        let form = RegisterForm {
            nom: "Durand".to_string(),
            prenom: "Paul".to_string(),
            email: "pd@ex.fr".to_string(),
            mot_de_passe: "secret".to_string(),
            ..Default::default()
        };
        let payload = form.validate().unwrap();
        assert_eq!(payload.role, "Etudiant");
    }

    #[test]
    fn test_register_success_clears_and_requests_switch() {
        let mut form = RegisterForm {
            nom: "Durand".to_string(),
            prenom: "Paul".to_string(),
            email: "pd@ex.fr".to_string(),
            mot_de_passe: "secret".to_string(),
            ..Default::default()
        };
        form.finish(ok_ack());
        assert!(form.switch_pending);
        assert!(form.nom.is_empty());
        assert!(form.mot_de_passe.is_empty());
    }

    #[test]
    fn test_failure_keeps_fields() {
        let mut form = JoinClassForm {
            code: "AB12C3".to_string(),
            ..Default::default()
        };
        form.finish(Err(ApiError::Backend {
            status: 404,
            message: "Code de classe invalide.".to_string(),
        }));
        assert_eq!(form.code, "AB12C3");
        assert_eq!(form.state.message(), Some("Code de classe invalide."));
    }

    #[test]
    fn test_create_class_success_reports_join_code() {
        let mut form = CreateClassForm {
            nom: "Biology 101".to_string(),
            description: "Intro".to_string(),
            ..Default::default()
        };
        form.finish(Ok(CreatedClass {
            message: "Classe créée avec succès.".to_string(),
            class: ClassRoom {
                id: 1,
                nom: "Biology 101".to_string(),
                description: None,
                code: Some("AB12C3".to_string()),
                professeur_nom: None,
                professeur_prenom: None,
            },
        }));
        assert!(form.nom.is_empty());
        let message = form.state.message().unwrap();
        assert!(message.contains("AB12C3"), "join code missing: {message}");
    }

    #[test]
    fn test_project_date_ordering() {
        let mut form = ProjectForm {
            titre: "Robotique".to_string(),
            date_debut: "2024-06-01".to_string(),
            date_fin: "2024-05-01".to_string(),
            ..Default::default()
        };
        form.picker.loaded(
            Ok(vec![ClassRoom {
                id: 2,
                nom: "Techno".to_string(),
                description: None,
                code: None,
                professeur_nom: None,
                professeur_prenom: None,
            }]),
            "aucune classe",
            "erreur",
        );
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("postérieure"));
    }

    #[test]
    fn test_composer_excludes_sender_from_recipients() {
        let mut composer = MessageComposer::new(Some(Role::Etudiant));
        let users = vec![
            User {
                id: 1,
                nom: "Moi".to_string(),
                prenom: "Même".to_string(),
                email: None,
                role: "Etudiant".to_string(),
            },
            User {
                id: 2,
                nom: "Curie".to_string(),
                prenom: "Marie".to_string(),
                email: None,
                role: "Professeur".to_string(),
            },
        ];
        composer.recipients_loaded(users, 1);
        assert_eq!(composer.recipients().len(), 1);
        assert_eq!(composer.selected_recipient(), Some(2));
    }

    #[test]
    fn test_student_cannot_compose_public() {
        let mut composer = MessageComposer::new(Some(Role::Etudiant));
        composer.kind = MessageKind::Public;
        composer.content = "Bonjour à tous".to_string();
        composer.classes_loaded(vec![ClassRoom {
            id: 3,
            nom: "Maths".to_string(),
            description: None,
            code: None,
            professeur_nom: None,
            professeur_prenom: None,
        }]);
        let err = composer.validate().unwrap_err();
        assert!(err.to_string().contains("professeurs"));
    }
}
