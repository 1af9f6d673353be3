//! The cascading-select list view.
//!
//! One generic state machine for every "pick a class, list its items" view:
//! announcements, documentation, tasks, projects, public messages. The scope
//! list is fetched once at mount; selecting a scope clears the displayed
//! items and issues exactly one item fetch for the new scope. Items are never
//! cached across scope changes — every selection refetches.
//!
//! Each item fetch carries a generation token. A response whose token no
//! longer matches the machine's generation is discarded, so a slow response
//! for a previously selected scope cannot overwrite the current one.

use crate::api::types::ClassRoom;
use crate::api::ApiError;
use tracing::{debug, warn};

/// Localized texts a view supplies for its empty/error states.
#[derive(Debug, Clone, Copy)]
pub struct ListMessages {
    /// No classes at all (guidance, not an error)
    pub no_scopes: &'static str,
    /// The selected class has no items
    pub no_items: &'static str,
    /// Fallback when loading the class list fails without a backend message
    pub scopes_failed: &'static str,
    /// Fallback when loading items fails without a backend message
    pub items_failed: &'static str,
}

/// A pending item fetch, tagged with the generation that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFetch {
    pub scope_id: i64,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unauthenticated,
    LoadingScopes,
    Ready,
    LoadingItems,
}

/// Generic scoped list state.
pub struct ScopedList<T> {
    texts: ListMessages,
    phase: Phase,
    scopes: Vec<ClassRoom>,
    selected: Option<i64>,
    items: Vec<T>,
    message: Option<String>,
    generation: u64,
}

impl<T> ScopedList<T> {
    /// A machine about to load its scopes.
    pub fn new(texts: ListMessages) -> Self {
        Self {
            texts,
            phase: Phase::LoadingScopes,
            scopes: Vec::new(),
            selected: None,
            items: Vec::new(),
            message: None,
            generation: 0,
        }
    }

    /// A machine mounted without a session; terminal until login.
    pub fn unauthenticated(texts: ListMessages) -> Self {
        Self {
            phase: Phase::Unauthenticated,
            message: Some(super::MUST_LOGIN.to_string()),
            ..Self::new(texts)
        }
    }

    pub fn scopes(&self) -> &[ClassRoom] {
        &self.scopes
    }

    pub fn selected_scope(&self) -> Option<i64> {
        self.selected
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::LoadingScopes | Phase::LoadingItems)
    }

    /// Feeds in the scope-list result. Selects the first scope by default and
    /// returns the item fetch for it.
    pub fn scopes_loaded(
        &mut self,
        result: Result<Vec<ClassRoom>, ApiError>,
    ) -> Option<ItemFetch> {
        if self.phase == Phase::Unauthenticated {
            return None;
        }
        match result {
            Ok(scopes) if scopes.is_empty() => {
                self.scopes = scopes;
                self.phase = Phase::Ready;
                self.message = Some(self.texts.no_scopes.to_string());
                None
            }
            Ok(scopes) => {
                self.scopes = scopes;
                self.phase = Phase::Ready;
                self.message = None;
                let first = self.scopes[0].id;
                self.start_item_fetch(first)
            }
            Err(err) => {
                if err.needs_reauth() {
                    // Expiry is only ever noticed here, on a failed request.
                    warn!("Credential rejected while loading classes");
                }
                self.scopes.clear();
                self.items.clear();
                self.phase = Phase::Ready;
                self.message = Some(err.user_message(self.texts.scopes_failed));
                None
            }
        }
    }

    /// Selects a scope by id. Returns the single item fetch to issue, or
    /// `None` when the id is unknown or already selected.
    pub fn select_scope(&mut self, scope_id: i64) -> Option<ItemFetch> {
        if self.selected == Some(scope_id) {
            return None;
        }
        if !self.scopes.iter().any(|c| c.id == scope_id) {
            return None;
        }
        self.start_item_fetch(scope_id)
    }

    /// Selects a scope by its position in the list (terminal input is 1-based
    /// elsewhere; this takes a 0-based index).
    pub fn select_scope_at(&mut self, index: usize) -> Option<ItemFetch> {
        let id = self.scopes.get(index)?.id;
        self.select_scope(id)
    }

    /// Refetches the currently selected scope (explicit user refresh — there
    /// is no automatic retry).
    pub fn refresh(&mut self) -> Option<ItemFetch> {
        let id = self.selected?;
        self.start_item_fetch(id)
    }

    fn start_item_fetch(&mut self, scope_id: i64) -> Option<ItemFetch> {
        self.selected = Some(scope_id);
        // Previously displayed items disappear before the new ones arrive.
        self.items.clear();
        self.message = None;
        self.generation += 1;
        self.phase = Phase::LoadingItems;
        Some(ItemFetch {
            scope_id,
            generation: self.generation,
        })
    }

    /// Feeds in an item-list result. Stale generations are discarded.
    pub fn items_loaded(&mut self, fetch: ItemFetch, result: Result<Vec<T>, ApiError>) {
        if fetch.generation != self.generation {
            debug!(
                scope_id = fetch.scope_id,
                stale = fetch.generation,
                current = self.generation,
                "Discarding stale item response"
            );
            return;
        }
        self.phase = Phase::Ready;
        match result {
            Ok(items) if items.is_empty() => {
                self.items = items;
                self.message = Some(self.texts.no_items.to_string());
            }
            Ok(items) => {
                self.items = items;
                self.message = None;
            }
            Err(err) => {
                self.items.clear();
                self.message = Some(err.user_message(self.texts.items_failed));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTS: ListMessages = ListMessages {
        no_scopes: "Vous n'êtes inscrit à aucune classe pour le moment.",
        no_items: "Aucune annonce pour cette classe.",
        scopes_failed: "Erreur lors du chargement de vos classes.",
        items_failed: "Erreur lors du chargement des annonces.",
    };

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

    #[test]
    fn test_first_scope_selected_by_default() {
        let mut list: ScopedList<String> = ScopedList::new(TEXTS);
        let fetch = list.scopes_loaded(Ok(classes(&[4, 9]))).unwrap();
        assert_eq!(fetch.scope_id, 4);
        assert_eq!(list.selected_scope(), Some(4));
    }

    #[test]
    fn test_scope_change_issues_one_fetch_and_clears_items() {
        let mut list: ScopedList<String> = ScopedList::new(TEXTS);
        let fetch = list.scopes_loaded(Ok(classes(&[4, 9]))).unwrap();
        list.items_loaded(fetch, Ok(vec!["ancienne".to_string()]));
        assert_eq!(list.items().len(), 1);

        let fetch = list.select_scope(9).expect("one fetch for the new scope");
        assert_eq!(fetch.scope_id, 9);
        // Cleared before the new response arrives
        assert!(list.items().is_empty());
        // Re-selecting the same scope issues nothing
        assert!(list.select_scope(9).is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut list: ScopedList<String> = ScopedList::new(TEXTS);
        let first = list.scopes_loaded(Ok(classes(&[4, 9]))).unwrap();
        let second = list.select_scope(9).unwrap();

        // The newer response lands first...
        list.items_loaded(second, Ok(vec!["nouvelle".to_string()]));
        // ...then the slow one for the old scope arrives and must not win.
        list.items_loaded(first, Ok(vec!["ancienne".to_string()]));

        assert_eq!(list.items(), &["nouvelle".to_string()]);
        assert_eq!(list.selected_scope(), Some(9));
    }

    #[test]
    fn test_empty_scopes_show_guidance() {
        let mut list: ScopedList<String> = ScopedList::new(TEXTS);
        assert!(list.scopes_loaded(Ok(vec![])).is_none());
        assert_eq!(list.message(), Some(TEXTS.no_scopes));
        assert!(!list.is_loading());
    }

    #[test]
    fn test_error_keeps_selector_usable() {
        let mut list: ScopedList<String> = ScopedList::new(TEXTS);
        let fetch = list.scopes_loaded(Ok(classes(&[4, 9]))).unwrap();
        list.items_loaded(
            fetch,
            Err(ApiError::Backend {
                status: 500,
                message: String::new(),
            }),
        );
        assert_eq!(list.message(), Some(TEXTS.items_failed));
        // The scope selector still works after the failure
        assert!(list.select_scope(9).is_some());
    }

    #[test]
    fn test_backend_error_text_shown_verbatim() {
        let mut list: ScopedList<String> = ScopedList::new(TEXTS);
        let fetch = list.scopes_loaded(Ok(classes(&[4]))).unwrap();
        list.items_loaded(
            fetch,
            Err(ApiError::Backend {
                status: 403,
                message: "Vous n'êtes pas membre de cette classe.".to_string(),
            }),
        );
        assert_eq!(
            list.message(),
            Some("Vous n'êtes pas membre de cette classe.")
        );
    }

    #[test]
    fn test_unauthenticated_is_terminal() {
        let mut list: ScopedList<String> = ScopedList::unauthenticated(TEXTS);
        assert_eq!(list.message(), Some(super::super::MUST_LOGIN));
        assert!(list.scopes_loaded(Ok(classes(&[1]))).is_none());
        assert!(list.scopes().is_empty());
    }

    #[test]
    fn test_refresh_refetches_current_scope() {
        let mut list: ScopedList<String> = ScopedList::new(TEXTS);
        let fetch = list.scopes_loaded(Ok(classes(&[4]))).unwrap();
        list.items_loaded(fetch, Ok(vec!["a".to_string()]));
        let again = list.refresh().unwrap();
        assert_eq!(again.scope_id, 4);
        assert!(again.generation > fetch.generation);
    }
}
