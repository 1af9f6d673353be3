//! User roles as the backend spells them.

use std::fmt;

/// The three roles known to the backend.
///
/// The backend is the source of truth for the spelling; role matching is
/// exact (case- and accent-sensitive). Production data carries both
/// `Etudiant` and `Étudiant`, so both spellings parse to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Etudiant,
    Professeur,
    Coordinateur,
}

impl Role {
    /// Parses a role string as received from the backend.
    ///
    /// Returns `None` for anything that is not an exact match — no case
    /// folding, no trimming.
    pub fn from_wire(value: &str) -> Option<Role> {
        match value {
            "Etudiant" | "Étudiant" => Some(Role::Etudiant),
            "Professeur" => Some(Role::Professeur),
            "Coordinateur" => Some(Role::Coordinateur),
            _ => None,
        }
    }

    /// The canonical spelling sent back to the backend (register, role change).
    pub fn wire_name(self) -> &'static str {
        match self {
            Role::Etudiant => "Etudiant",
            Role::Professeur => "Professeur",
            Role::Coordinateur => "Coordinateur",
        }
    }

    /// Indicates whether this role may author public (class-wide) messages.
    pub fn can_post_public(self) -> bool {
        matches!(self, Role::Professeur | Role::Coordinateur)
    }

    /// Indicates whether this role may create projects and manage groups.
    pub fn can_manage_groups(self) -> bool {
        matches!(self, Role::Professeur | Role::Coordinateur)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Etudiant => write!(f, "Étudiant"),
            Role::Professeur => write!(f, "Professeur"),
            Role::Coordinateur => write!(f, "Coordinateur"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_student_spellings_parse() {
        assert_eq!(Role::from_wire("Etudiant"), Some(Role::Etudiant));
        assert_eq!(Role::from_wire("Étudiant"), Some(Role::Etudiant));
    }

    #[test]
    fn test_matching_is_exact() {
        assert_eq!(Role::from_wire("professeur"), None);
        assert_eq!(Role::from_wire("PROFESSEUR"), None);
        assert_eq!(Role::from_wire(" Professeur"), None);
        assert_eq!(Role::from_wire(""), None);
        assert_eq!(Role::from_wire("Admin"), None);
    }

    #[test]
    fn test_wire_name_roundtrip() {
        for role in [Role::Etudiant, Role::Professeur, Role::Coordinateur] {
            assert_eq!(Role::from_wire(role.wire_name()), Some(role));
        }
    }

    #[test]
    fn test_public_message_permission() {
        assert!(!Role::Etudiant.can_post_public());
        assert!(Role::Professeur.can_post_public());
        assert!(Role::Coordinateur.can_post_public());
    }
}
