//! Role-to-view routing.
//!
//! A static table per role drives the sidebar menu and which view is mounted
//! after login. The tables are the routing authority: a view absent from the
//! active role's table is simply unreachable, though views still re-check the
//! role defensively when mounted.

use crate::role::Role;

/// Every mountable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    // Unauthenticated
    Login,
    Register,
    // Authenticated
    ClassList,
    CreateClass,
    JoinClass,
    CreateAnnouncement,
    AnnouncementList,
    ShareDocumentation,
    DocumentationList,
    AssignTask,
    TaskList,
    SubmissionReview,
    MySubmissions,
    SendMessage,
    PublicMessageList,
    PrivateMessageList,
    CreateProject,
    ProjectList,
    UserManagement,
}

/// One sidebar entry.
#[derive(Debug, Clone, Copy)]
pub struct MenuEntry {
    pub label: &'static str,
    pub view: ViewId,
    pub icon: &'static str,
}

const fn entry(label: &'static str, view: ViewId, icon: &'static str) -> MenuEntry {
    MenuEntry { label, view, icon }
}

/// Professor menu, in display order.
const PROFESSEUR_MENU: &[MenuEntry] = &[
    entry("Classements", ViewId::ClassList, "▤"),
    entry("Créer une Classe", ViewId::CreateClass, "✚"),
    entry("Créer une Annonce", ViewId::CreateAnnouncement, "✚"),
    entry("Liste des Annonces", ViewId::AnnouncementList, "▣"),
    entry("Partager un Document", ViewId::ShareDocumentation, "✚"),
    entry("Liste des Documents", ViewId::DocumentationList, "▣"),
    entry("Attribuer une Tâche", ViewId::AssignTask, "✚"),
    entry("Liste des Tâches", ViewId::TaskList, "▣"),
    entry("Réviser les Soumissions", ViewId::SubmissionReview, "✎"),
    entry("Envoyer un Message", ViewId::SendMessage, "✉"),
    entry("Messages Publics", ViewId::PublicMessageList, "▣"),
    entry("Messages Privés", ViewId::PrivateMessageList, "▣"),
    entry("Créer un Projet", ViewId::CreateProject, "✚"),
    entry("Liste des Projets", ViewId::ProjectList, "▣"),
];

/// Student menu, in display order.
const ETUDIANT_MENU: &[MenuEntry] = &[
    entry("Classements", ViewId::ClassList, "▤"),
    entry("Rejoindre une Classe", ViewId::JoinClass, "✚"),
    entry("Liste des Annonces", ViewId::AnnouncementList, "▣"),
    entry("Liste des Documents", ViewId::DocumentationList, "▣"),
    entry("Liste des Tâches", ViewId::TaskList, "▣"),
    entry("Mes Soumissions", ViewId::MySubmissions, "✎"),
    entry("Envoyer un Message", ViewId::SendMessage, "✉"),
    entry("Messages Publics", ViewId::PublicMessageList, "▣"),
    entry("Messages Privés", ViewId::PrivateMessageList, "▣"),
    entry("Liste des Projets", ViewId::ProjectList, "▣"),
];

/// Coordinator menu, in display order.
const COORDINATEUR_MENU: &[MenuEntry] = &[
    entry("Gestion des Utilisateurs", ViewId::UserManagement, "♟"),
    entry("Classements", ViewId::ClassList, "▤"),
    entry("Créer une Classe", ViewId::CreateClass, "✚"),
    entry("Liste des Annonces", ViewId::AnnouncementList, "▣"),
    entry("Liste des Documents", ViewId::DocumentationList, "▣"),
    entry("Liste des Tâches", ViewId::TaskList, "▣"),
    entry("Liste des Projets", ViewId::ProjectList, "▣"),
    entry("Messages Publics", ViewId::PublicMessageList, "▣"),
    entry("Messages Privés", ViewId::PrivateMessageList, "▣"),
];

/// The ordered menu for a role.
pub fn menu_for(role: Role) -> &'static [MenuEntry] {
    match role {
        Role::Professeur => PROFESSEUR_MENU,
        Role::Etudiant => ETUDIANT_MENU,
        Role::Coordinateur => COORDINATEUR_MENU,
    }
}

/// The menu for a role string as the backend sent it.
///
/// Unknown or absent roles get an empty menu.
pub fn menu_for_wire(role: &str) -> &'static [MenuEntry] {
    match Role::from_wire(role) {
        Some(role) => menu_for(role),
        None => &[],
    }
}

/// The view shown right after login.
pub fn default_view(role: Role) -> ViewId {
    match role {
        Role::Professeur | Role::Etudiant => ViewId::AnnouncementList,
        Role::Coordinateur => ViewId::UserManagement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_order_is_stable() {
        let first: Vec<&str> = menu_for(Role::Professeur).iter().map(|e| e.label).collect();
        let second: Vec<&str> = menu_for(Role::Professeur).iter().map(|e| e.label).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "Classements");
        assert_eq!(first.len(), 14);
    }

    #[test]
    fn test_unknown_role_gets_empty_menu() {
        assert!(menu_for_wire("Directeur").is_empty());
        assert!(menu_for_wire("").is_empty());
        // Case-sensitive on purpose: the backend owns the spelling
        assert!(menu_for_wire("professeur").is_empty());
    }

    #[test]
    fn test_both_student_spellings_route() {
        assert_eq!(menu_for_wire("Etudiant").len(), 10);
        assert_eq!(menu_for_wire("Étudiant").len(), 10);
    }

    #[test]
    fn test_default_views() {
        assert_eq!(default_view(Role::Professeur), ViewId::AnnouncementList);
        assert_eq!(default_view(Role::Etudiant), ViewId::AnnouncementList);
        assert_eq!(default_view(Role::Coordinateur), ViewId::UserManagement);
    }

    #[test]
    fn test_default_view_reachable_from_menu() {
        for role in [Role::Etudiant, Role::Professeur, Role::Coordinateur] {
            let target = default_view(role);
            assert!(
                menu_for(role).iter().any(|e| e.view == target),
                "default view for {role} missing from its menu"
            );
        }
    }

    #[test]
    fn test_student_menu_excludes_professor_views() {
        let student = menu_for(Role::Etudiant);
        assert!(!student.iter().any(|e| e.view == ViewId::SubmissionReview));
        assert!(!student.iter().any(|e| e.view == ViewId::CreateClass));
        assert!(!student.iter().any(|e| e.view == ViewId::UserManagement));
    }
}
