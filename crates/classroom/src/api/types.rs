//! Wire types for the Classroom backend.
//!
//! Field names mirror the backend's JSON exactly; the backend mixes
//! snake_case and camelCase, so renames are applied per field rather than
//! with a container-level convention.

use serde::{Deserialize, Serialize};

/// An authenticated or listed user.
///
/// `role` stays a plain string here: role matching is exact and the backend
/// owns the canonical spelling, so parsing happens at the routing layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
}

impl User {
    /// "Prénom Nom" as shown everywhere in the UI.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

/// A class: the scoping entity for everything else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassRoom {
    pub id: i64,
    pub nom: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Join code; present on the owner's listing
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "professeurNom", default)]
    pub professeur_nom: Option<String>,
    #[serde(rename = "professeurPrenom", default)]
    pub professeur_prenom: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Announcement {
    pub id: i64,
    pub titre: String,
    pub contenu: String,
    #[serde(rename = "professeurNom", default)]
    pub professeur_nom: Option<String>,
    #[serde(rename = "professeurPrenom", default)]
    pub professeur_prenom: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub titre: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_limite: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One student's submission for a task.
///
/// Student identity fields are present when listing a task's submissions;
/// task/class context fields are present when listing one's own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub id: i64,
    #[serde(rename = "studentNom", default)]
    pub student_nom: Option<String>,
    #[serde(rename = "studentPrenom", default)]
    pub student_prenom: Option<String>,
    #[serde(rename = "taskTitre", default)]
    pub task_titre: Option<String>,
    #[serde(rename = "className", default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// 0–100, set only after creation by the grading professor
    #[serde(default)]
    pub grade: Option<i32>,
    #[serde(default)]
    pub correction_feedback: Option<String>,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Documentation {
    pub id: i64,
    pub titre: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(rename = "professeurNom", default)]
    pub professeur_nom: Option<String>,
    #[serde(rename = "professeurPrenom", default)]
    pub professeur_prenom: Option<String>,
    pub created_at: String,
}

/// A private or public message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    #[serde(rename = "senderId", default)]
    pub sender_id: Option<i64>,
    #[serde(rename = "senderNom", default)]
    pub sender_nom: Option<String>,
    #[serde(rename = "senderPrenom", default)]
    pub sender_prenom: Option<String>,
    #[serde(rename = "senderRole", default)]
    pub sender_role: Option<String>,
    #[serde(rename = "receiverNom", default)]
    pub receiver_nom: Option<String>,
    #[serde(rename = "receiverPrenom", default)]
    pub receiver_prenom: Option<String>,
    #[serde(rename = "receiverRole", default)]
    pub receiver_role: Option<String>,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub titre: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_debut: Option<String>,
    #[serde(default)]
    pub date_fin: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMember {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: i64,
    pub nom: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LoginPayload {
    pub email: String,
    #[serde(rename = "motDePasse")]
    pub mot_de_passe: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterPayload {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    #[serde(rename = "motDePasse")]
    pub mot_de_passe: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct CreateClassPayload {
    pub nom: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct JoinClassPayload {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CreateAnnouncementPayload {
    pub class_id: i64,
    pub titre: String,
    pub contenu: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskPayload {
    pub class_id: i64,
    pub titre: String,
    pub description: String,
    pub date_limite: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitTaskPayload {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct GradePayload {
    pub grade: i32,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct CreateDocumentationPayload {
    pub class_id: i64,
    pub titre: String,
    pub description: String,
    pub file_path: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessagePayload {
    pub message_type: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateProjectPayload {
    pub class_id: i64,
    pub titre: String,
    pub description: String,
    pub date_debut: String,
    pub date_fin: String,
}

#[derive(Debug, Serialize)]
pub struct CreateGroupPayload {
    pub projet_id: i64,
    pub nom_groupe: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AddMemberPayload {
    pub user_id_to_add: i64,
}

#[derive(Debug, Serialize)]
pub struct ChangeRolePayload {
    pub role: String,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

/// Mutation acknowledgement; the message is shown to the user verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Response to class creation, carrying the generated join code.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedClass {
    #[serde(default)]
    pub message: String,
    pub class: ClassRoom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_shape() {
        let json = r#"{
            "message": "Connexion réussie.",
            "token": "eyJhbGciOi.abc.def",
            "user": {"id": 7, "nom": "Curie", "prenom": "Marie", "email": "mc@ex.fr", "role": "Professeur"}
        }"#;
        let parsed: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.user.role, "Professeur");
        assert_eq!(parsed.user.full_name(), "Marie Curie");
        assert_eq!(parsed.token, "eyJhbGciOi.abc.def");
    }

    #[test]
    fn test_announcement_mixed_casing() {
        let json = r#"{
            "id": 3,
            "titre": "Examen",
            "contenu": "Lundi prochain.",
            "professeurNom": "Curie",
            "professeurPrenom": "Marie",
            "created_at": "2024-03-02T10:00:00.000Z"
        }"#;
        let parsed: Announcement = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.professeur_nom.as_deref(), Some("Curie"));
        assert_eq!(parsed.created_at, "2024-03-02T10:00:00.000Z");
    }

    #[test]
    fn test_submission_optional_fields() {
        // A fresh, ungraded submission listed for a professor
        let json = r#"{
            "id": 12,
            "studentNom": "Durand",
            "studentPrenom": "Paul",
            "file_path": null,
            "content": "Ma réponse",
            "grade": null,
            "correction_feedback": null,
            "submitted_at": "2024-03-05T08:30:00.000Z"
        }"#;
        let parsed: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.grade, None);
        assert_eq!(parsed.content.as_deref(), Some("Ma réponse"));
        assert_eq!(parsed.task_titre, None);
    }

    #[test]
    fn test_created_class_carries_join_code() {
        let json = r#"{
            "message": "Classe créée avec succès.",
            "class": {"id": 1, "nom": "Biology 101", "description": "Intro", "code": "AB12C3"}
        }"#;
        let parsed: CreatedClass = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.class.code.as_deref(), Some("AB12C3"));
    }

    #[test]
    fn test_send_message_payload_omits_unused_target() {
        let payload = SendMessagePayload {
            message_type: "private".to_string(),
            content: "Bonjour".to_string(),
            receiver_id: Some(4),
            class_id: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["receiver_id"], 4);
        assert!(json.get("class_id").is_none());
    }

    #[test]
    fn test_register_payload_wire_names() {
        let payload = RegisterPayload {
            nom: "Durand".to_string(),
            prenom: "Paul".to_string(),
            email: "pd@ex.fr".to_string(),
            mot_de_passe: "secret".to_string(),
            role: "Etudiant".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["motDePasse"], "secret");
        assert_eq!(json["role"], "Etudiant");
    }
}
