use shared::{
    domain::{LineStatus, Order, OrderItem},
    protocol::OrderReceipt,
};
use tracing::{info, warn};

use crate::{
    derive::{cart_summary, cart_total, valid_customer},
    filters::FilterState,
    StorefrontClient, StorefrontEvent, StorefrontState,
};

/// Free-text checkout fields; nothing is validated until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Catalog,
    Cart,
    Checkout,
    Success,
}

impl View {
    /// User-driven navigation. `Success` is only reachable through a
    /// successful order submission.
    pub fn can_navigate_to(self, next: View) -> bool {
        matches!(
            (self, next),
            (View::Catalog, View::Cart)
                | (View::Cart, View::Catalog)
                | (View::Cart, View::Checkout)
                | (View::Checkout, View::Cart)
                | (View::Success, View::Catalog)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyCart,
    InvalidCustomer,
    /// Some line is still awaiting its reservation or was never reserved.
    UnsettledCart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Skipped(SkipReason),
    Submitted(OrderReceipt),
    Failed(String),
}

impl StorefrontState {
    fn build_order(&self) -> Result<Order, SkipReason> {
        if self.cart.is_empty() {
            return Err(SkipReason::EmptyCart);
        }
        if !valid_customer(&self.form) {
            return Err(SkipReason::InvalidCustomer);
        }
        if self
            .cart
            .lines()
            .iter()
            .any(|line| line.status != LineStatus::Confirmed)
        {
            return Err(SkipReason::UnsettledCart);
        }

        let items = cart_summary(&self.cart, &self.store)
            .into_iter()
            .map(|entry| OrderItem {
                lesson_id: entry.lesson_id,
                quantity: entry.qty,
            })
            .collect();

        Ok(Order {
            name: self.form.name.trim().to_string(),
            phone: self.form.phone.trim().to_string(),
            email: self.form.email.trim().to_string(),
            address: self.form.address.trim().to_string(),
            items,
            total: cart_total(&self.cart),
        })
    }

    fn reset_after_order(&mut self) {
        self.cart.clear();
        self.filters = FilterState::default();
        self.form = CustomerForm::default();
        self.view = View::Success;
    }
}

impl StorefrontClient {
    pub async fn update_form(&self, edit: impl FnOnce(&mut CustomerForm)) {
        let mut guard = self.inner.lock().await;
        edit(&mut guard.form);
    }

    /// Returns false if the transition is not a user-driven one.
    pub async fn navigate(&self, next: View) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.view.can_navigate_to(next) {
            return false;
        }
        guard.view = next;
        true
    }

    /// Silently skips an empty cart, invalid customer details, or a cart with
    /// lines the gateway has not confirmed; those clear once their
    /// reservations settle or the next fetch drops them. On success
    /// the session is reset and the catalog re-fetched; on failure nothing
    /// but the error message changes, so the user may retry.
    pub async fn submit_order(&self) -> SubmitOutcome {
        let order = {
            let mut guard = self.inner.lock().await;
            match guard.build_order() {
                Ok(order) => {
                    guard.last_error = None;
                    order
                }
                Err(reason) => return SubmitOutcome::Skipped(reason),
            }
        };

        match self.gateway.submit_order(&order).await {
            Ok(receipt) => {
                self.inner.lock().await.reset_after_order();
                info!(
                    items = order.items.len(),
                    total = order.total,
                    order_id = ?receipt.order_id,
                    "checkout: order submitted"
                );
                let _ = self.events.send(StorefrontEvent::OrderSubmitted {
                    receipt: receipt.clone(),
                });
                let _ = self.events.send(StorefrontEvent::CartChanged { lines: 0 });

                self.fetch_lessons().await;
                SubmitOutcome::Submitted(receipt)
            }
            Err(err) => {
                let message = err.message().to_string();
                self.inner.lock().await.last_error = Some(message.clone());
                warn!(error = %message, "checkout: order rejected");
                let _ = self.events.send(StorefrontEvent::Error(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }
}
