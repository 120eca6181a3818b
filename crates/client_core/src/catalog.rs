use shared::domain::{Lesson, LessonId};
use tracing::{debug, info, warn};

use crate::{StorefrontClient, StorefrontEvent};

/// Last-fetched snapshot of the remote catalog. Only gateway responses
/// mutate it: fetches replace it wholesale, cart confirmations patch `spaces`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogStore {
    lessons: Vec<Lesson>,
}

impl CatalogStore {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn find(&self, lesson_id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| &lesson.id == lesson_id)
    }

    pub fn replace(&mut self, lessons: Vec<Lesson>) {
        self.lessons = lessons;
    }

    /// Copies only `spaces` from a gateway-confirmed lesson. Returns false if
    /// the lesson is no longer in the snapshot.
    pub fn patch_spaces(&mut self, confirmed: &Lesson) -> bool {
        match self
            .lessons
            .iter_mut()
            .find(|lesson| lesson.id == confirmed.id)
        {
            Some(lesson) => {
                lesson.spaces = confirmed.spaces;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { lessons: usize },
    /// A newer fetch was issued while this one was in flight.
    Stale,
    Failed(String),
}

impl StorefrontClient {
    pub async fn fetch_lessons(&self) -> FetchOutcome {
        self.load_catalog(None).await
    }

    /// Records `term` as the active search and replaces the catalog with the
    /// matching lessons. A blank term lists the full catalog.
    pub async fn search(&self, term: &str) -> FetchOutcome {
        self.load_catalog(Some(term.to_string())).await
    }

    async fn load_catalog(&self, term: Option<String>) -> FetchOutcome {
        let (sequence, query) = {
            let mut guard = self.inner.lock().await;
            guard.fetch_sequence += 1;
            guard.loading = true;
            guard.last_error = None;
            if let Some(term) = &term {
                guard.filters.search_term = term.clone();
            }
            let query = term
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string);
            (guard.fetch_sequence, query)
        };

        let result = match &query {
            Some(query) => self.gateway.search_lessons(query).await,
            None => self.gateway.list_lessons().await,
        };

        let mut guard = self.inner.lock().await;
        if guard.fetch_sequence != sequence {
            debug!(
                sequence,
                latest = guard.fetch_sequence,
                "catalog: discarding stale response"
            );
            return FetchOutcome::Stale;
        }
        guard.loading = false;

        match result {
            Ok(lessons) => {
                let count = lessons.len();
                guard.store.replace(lessons);
                let dropped = guard.reconcile_after_fetch();
                drop(guard);

                info!(lessons = count, query = ?query, "catalog: replaced snapshot");
                let _ = self
                    .events
                    .send(StorefrontEvent::CatalogReplaced { lessons: count });
                if !dropped.is_empty() {
                    warn!(
                        dropped = dropped.len(),
                        "catalog: dropped unconfirmed cart lines after refresh"
                    );
                    let _ = self
                        .events
                        .send(StorefrontEvent::CartReconciled { dropped });
                }
                FetchOutcome::Applied { lessons: count }
            }
            Err(err) => {
                let message = err.message().to_string();
                guard.last_error = Some(message.clone());
                drop(guard);

                warn!(error = %message, query = ?query, "catalog: fetch failed");
                let _ = self.events.send(StorefrontEvent::Error(message.clone()));
                FetchOutcome::Failed(message)
            }
        }
    }
}
