//! Error types for the backend API client.

use thiserror::Error;

/// Errors surfaced by API calls.
///
/// Every view turns one of these into an inline message; nothing here is
/// allowed to escape as a panic or a global failure.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// No credential is held; the caller must log in before fetching
    #[error("Vous devez être connecté.")]
    AuthRequired,

    /// The backend rejected the credential (401) — detected only here, never
    /// proactively
    #[error("Votre session a expiré, veuillez vous reconnecter.")]
    SessionExpired,

    /// The active role may not perform the action (403)
    #[error("Accès refusé : {message}")]
    Forbidden { message: String },

    /// A required field is missing; caught client-side, no request was sent
    #[error("{message}")]
    Validation { message: String },

    /// Any other non-2xx response, message taken from the body when present
    #[error("Erreur du serveur ({status}) : {message}")]
    Backend { status: u16, message: String },

    /// Network/transport failure
    #[error("Erreur réseau : {message}")]
    Network { message: String },

    /// Response body did not match the expected shape
    #[error("Réponse du serveur illisible : {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Returns true if this error means the session must be re-established.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, ApiError::AuthRequired | ApiError::SessionExpired)
    }

    /// The text shown to the user: the backend-provided message verbatim when
    /// there is one, the supplied localized fallback otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Forbidden { message } | ApiError::Backend { message, .. } => {
                if message.is_empty() {
                    fallback.to_string()
                } else {
                    message.clone()
                }
            }
            ApiError::Validation { message } => message.clone(),
            ApiError::AuthRequired | ApiError::SessionExpired => self.to_string(),
            ApiError::Network { .. } | ApiError::Decode { .. } => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode {
                message: err.to_string(),
            }
        } else {
            ApiError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::Network {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_shown_verbatim() {
        let err = ApiError::Backend {
            status: 400,
            message: "Code de classe invalide.".to_string(),
        };
        assert_eq!(err.user_message("Erreur générique."), "Code de classe invalide.");
    }

    #[test]
    fn test_empty_backend_message_falls_back() {
        let err = ApiError::Backend {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message("Erreur générique."), "Erreur générique.");
    }

    #[test]
    fn test_network_errors_use_fallback() {
        let err = ApiError::Network {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.user_message("Erreur de chargement."), "Erreur de chargement.");
    }

    #[test]
    fn test_reauth_detection() {
        assert!(ApiError::AuthRequired.needs_reauth());
        assert!(ApiError::SessionExpired.needs_reauth());
        assert!(!ApiError::Forbidden {
            message: String::new()
        }
        .needs_reauth());
    }
}
