use shared::domain::{CartLine, Lesson, LessonId, LineStatus};
use tracing::{info, warn};

use crate::{StorefrontClient, StorefrontEvent, StorefrontState};

/// Per-unit cart: one line for every seat the user holds, never aggregated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity(&self, lesson_id: &LessonId) -> usize {
        self.lines
            .iter()
            .filter(|line| &line.lesson_id == lesson_id)
            .count()
    }

    pub fn push(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// Removes the first line for `lesson_id`, which is not necessarily the
    /// most recently added one.
    pub fn remove_first(&mut self, lesson_id: &LessonId) -> Option<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|line| &line.lesson_id == lesson_id)?;
        Some(self.lines.remove(index))
    }

    /// Moves the first pending line for `lesson_id` to `status`. Lines are
    /// fungible per lesson, so any pending one stands for the settled call.
    pub fn settle_pending(&mut self, lesson_id: &LessonId, status: LineStatus) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|line| &line.lesson_id == lesson_id && line.status == LineStatus::Pending)
        {
            Some(line) => {
                line.status = status;
                true
            }
            None => false,
        }
    }

    pub fn drop_unconfirmed(&mut self) -> Vec<CartLine> {
        let (dropped, kept) = std::mem::take(&mut self.lines)
            .into_iter()
            .partition(|line| line.status == LineStatus::Unconfirmed);
        self.lines = kept;
        dropped
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// A point where the local cart or store is known to disagree with the
/// server until the next full fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// The decrement for an added line failed; the server holds no seat.
    AddUnconfirmed(LessonId),
    /// The increment for a removed line failed; the server still holds a seat.
    ReleaseUnconfirmed(LessonId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartOutcome {
    /// Guard rejected the action; nothing changed and no request was sent.
    Skipped,
    /// The gateway confirmed the adjustment and the store was patched.
    Confirmed(Lesson),
    /// An unconfirmed line was removed locally without contacting the gateway.
    Discarded,
    /// A line still awaiting its reservation was removed; the release is sent
    /// once that reservation is confirmed and skipped if it fails.
    Deferred,
    /// The local change stands but the gateway call failed.
    Diverged(String),
}

pub fn can_add(lesson: Option<&Lesson>) -> bool {
    lesson.is_some_and(Lesson::is_available)
}

impl StorefrontState {
    pub(crate) fn reconcile_after_fetch(&mut self) -> Vec<CartLine> {
        let dropped = self.cart.drop_unconfirmed();
        for divergence in self.divergences.drain(..) {
            if let Divergence::ReleaseUnconfirmed(lesson_id) = divergence {
                warn!(lesson_id = %lesson_id, "cart: server may still hold a released seat");
            }
        }
        dropped
    }

    fn take_deferred_release(&mut self, lesson_id: &LessonId) -> bool {
        match self.deferred_releases.iter().position(|id| id == lesson_id) {
            Some(index) => {
                self.deferred_releases.remove(index);
                true
            }
            None => false,
        }
    }
}

impl StorefrontClient {
    pub async fn can_add(&self, lesson_id: &LessonId) -> bool {
        let guard = self.inner.lock().await;
        can_add(guard.store.find(lesson_id))
    }

    pub async fn cart_quantity(&self, lesson_id: &LessonId) -> usize {
        self.inner.lock().await.cart.quantity(lesson_id)
    }

    /// Appends a line immediately, then asks the gateway to take one seat.
    /// A failed request leaves the line in the cart marked unconfirmed. If the
    /// line was removed while the request was in flight, its deferred release
    /// is sent after a confirmation and dropped after a failure.
    pub async fn add_to_cart(&self, lesson_id: &LessonId) -> CartOutcome {
        {
            let mut guard = self.inner.lock().await;
            let Some(lesson) = guard.store.find(lesson_id).filter(|l| l.is_available()) else {
                return CartOutcome::Skipped;
            };
            let line = CartLine::snapshot_of(lesson);
            guard.cart.push(line);
            guard.last_error = None;
        }
        self.emit_cart_changed().await;

        match self.gateway.adjust_spaces(lesson_id, -1).await {
            Ok(confirmed) => {
                let release_now = {
                    let mut guard = self.inner.lock().await;
                    !guard.cart.settle_pending(lesson_id, LineStatus::Confirmed)
                        && guard.take_deferred_release(lesson_id)
                };
                self.apply_confirmation(lesson_id, &confirmed).await;
                if release_now {
                    info!(lesson_id = %lesson_id, "cart: sending deferred release");
                    self.release_seat(lesson_id).await;
                }
                CartOutcome::Confirmed(confirmed)
            }
            Err(err) => {
                let message = err.message().to_string();
                {
                    let mut guard = self.inner.lock().await;
                    if guard
                        .cart
                        .settle_pending(lesson_id, LineStatus::Unconfirmed)
                    {
                        guard
                            .divergences
                            .push(Divergence::AddUnconfirmed(lesson_id.clone()));
                    } else if guard.take_deferred_release(lesson_id) {
                        info!(lesson_id = %lesson_id, "cart: dropped deferred release for unreserved seat");
                    }
                    guard.last_error = Some(message.clone());
                }
                warn!(lesson_id = %lesson_id, error = %message, "cart: seat reservation failed");
                let _ = self.events.send(StorefrontEvent::Error(message.clone()));
                CartOutcome::Diverged(message)
            }
        }
    }

    /// Removes one line and asks the gateway to release its seat. Lines whose
    /// reservation never succeeded are dropped locally instead, and lines whose
    /// reservation is still in flight release only once it is confirmed.
    pub async fn decrease_from_cart(&self, lesson_id: &LessonId) -> CartOutcome {
        let removed = {
            let mut guard = self.inner.lock().await;
            let Some(removed) = guard.cart.remove_first(lesson_id) else {
                return CartOutcome::Skipped;
            };
            match removed.status {
                LineStatus::Unconfirmed => {
                    let marker = Divergence::AddUnconfirmed(lesson_id.clone());
                    if let Some(index) = guard.divergences.iter().position(|d| *d == marker) {
                        guard.divergences.remove(index);
                    }
                }
                LineStatus::Pending => guard.deferred_releases.push(lesson_id.clone()),
                LineStatus::Confirmed => {}
            }
            guard.last_error = None;
            removed
        };
        self.emit_cart_changed().await;

        match removed.status {
            LineStatus::Unconfirmed => {
                info!(lesson_id = %lesson_id, "cart: discarded unconfirmed line");
                CartOutcome::Discarded
            }
            LineStatus::Pending => {
                info!(lesson_id = %lesson_id, "cart: release deferred until reservation settles");
                CartOutcome::Deferred
            }
            LineStatus::Confirmed => self.release_seat(lesson_id).await,
        }
    }

    /// Empties the cart without contacting the gateway.
    pub async fn clear_cart(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.cart.clear();
        }
        self.emit_cart_changed().await;
    }

    pub async fn pending_divergences(&self) -> Vec<Divergence> {
        self.inner.lock().await.divergences.clone()
    }

    async fn release_seat(&self, lesson_id: &LessonId) -> CartOutcome {
        match self.gateway.adjust_spaces(lesson_id, 1).await {
            Ok(confirmed) => {
                self.apply_confirmation(lesson_id, &confirmed).await;
                CartOutcome::Confirmed(confirmed)
            }
            Err(err) => {
                let message = err.message().to_string();
                {
                    let mut guard = self.inner.lock().await;
                    guard
                        .divergences
                        .push(Divergence::ReleaseUnconfirmed(lesson_id.clone()));
                    guard.last_error = Some(message.clone());
                }
                warn!(lesson_id = %lesson_id, error = %message, "cart: seat release failed");
                let _ = self.events.send(StorefrontEvent::Error(message.clone()));
                CartOutcome::Diverged(message)
            }
        }
    }

    async fn apply_confirmation(&self, lesson_id: &LessonId, confirmed: &Lesson) {
        let patched = self.inner.lock().await.store.patch_spaces(confirmed);
        info!(
            lesson_id = %lesson_id,
            spaces = confirmed.spaces,
            patched,
            "cart: availability confirmed"
        );
        if patched {
            let _ = self.events.send(StorefrontEvent::LessonPatched {
                lesson_id: lesson_id.clone(),
                spaces: confirmed.spaces,
            });
        }
    }

    async fn emit_cart_changed(&self) {
        let lines = self.inner.lock().await.cart.len();
        let _ = self.events.send(StorefrontEvent::CartChanged { lines });
    }
}
