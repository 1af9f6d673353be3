//! Message lists.
//!
//! Private messages are one flat fetch of everything sent or received by the
//! current user; public messages are a scoped list over the user's classes.
//! Composition lives with the other forms.

use super::scoped_list::{ListMessages, ScopedList};
use crate::api::types::Message;
use crate::api::ApiError;

pub const PUBLIC_TEXTS: ListMessages = ListMessages {
    no_scopes: "Vous n'êtes inscrit à aucune classe pour le moment.",
    no_items: "Aucun message public pour cette classe.",
    scopes_failed: "Erreur lors du chargement de vos classes.",
    items_failed: "Erreur lors du chargement des messages publics.",
};

/// The public message list is a plain scoped list.
pub type PublicMessages = ScopedList<Message>;

/// Direction of a private message relative to the session user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

pub struct PrivateMessages {
    self_id: i64,
    messages: Vec<Message>,
    message: Option<String>,
    loading: bool,
}

impl PrivateMessages {
    pub fn new(self_id: i64) -> Self {
        Self {
            self_id,
            messages: Vec::new(),
            message: None,
            loading: true,
        }
    }

    pub fn loaded(&mut self, result: Result<Vec<Message>, ApiError>) {
        self.loading = false;
        match result {
            Ok(messages) if messages.is_empty() => {
                self.messages = messages;
                self.message = Some("Aucun message privé pour le moment.".to_string());
            }
            Ok(messages) => {
                self.messages = messages;
                self.message = None;
            }
            Err(err) => {
                self.messages.clear();
                self.message =
                    Some(err.user_message("Erreur lors du chargement des messages privés."));
            }
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sent when the session user authored it, received otherwise.
    pub fn direction(&self, message: &Message) -> Direction {
        if message.sender_id == Some(self.self_id) {
            Direction::Sent
        } else {
            Direction::Received
        }
    }
}
