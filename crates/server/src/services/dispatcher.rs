//! Best-effort notification fan-out.
//!
//! Every queue transition produces notifications: the customer hears about
//! their own order, operators hear about new orders, dashboards get a live
//! event. None of them may affect the transition itself: the order is
//! accepted or served before any send starts, and a failed send is logged
//! and dropped. Each recipient is attempted independently, so one dead
//! phone number never silences the rest.

use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::broadcast;

use lastcall_core::{Channel, OrderId, PhoneNumber};

use crate::config::{SupportConfig, TwilioConfig, WhatsAppConfig};
use crate::db::PushSubscriptionRepository;
use crate::queue::Order;
use crate::services::optout::OptOutRegistry;
use crate::services::push::PushClient;
use crate::services::twilio::TwilioClient;
use crate::services::whatsapp::{WhatsAppClient, WhatsAppError};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Footer carriers require on conversational SMS traffic.
pub const SMS_FOOTER: &str = "Reply STOP to opt out.";

/// Append the compliance footer unless the message already carries it
/// (the HELP reply and the opt-in confirmation mention it themselves).
fn append_sms_footer(body: &str) -> String {
    if body.contains(SMS_FOOTER) {
        body.to_string()
    } else {
        format!("{body} {SMS_FOOTER}")
    }
}

/// A queue transition broadcast to dashboard listeners.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    OrderNew {
        id: OrderId,
        canonical_id: String,
        display_name: String,
        source: Channel,
    },
    OrderDone {
        id: OrderId,
        canonical_id: String,
        display_name: String,
        client_tag: Option<String>,
    },
    QueueCleared {
        count: usize,
    },
}

/// Routes notifications to customers, operators and dashboards.
pub struct Dispatcher {
    whatsapp: Option<WhatsAppClient>,
    sms: Option<TwilioClient>,
    push: Option<PushClient>,
    pool: PgPool,
    opt_outs: Arc<OptOutRegistry>,
    admin_numbers: Vec<PhoneNumber>,
    menu_url: Option<String>,
    support: SupportConfig,
    events: broadcast::Sender<QueueEvent>,
}

impl Dispatcher {
    /// Build the dispatcher from whichever channels are configured.
    ///
    /// # Errors
    ///
    /// Returns `WhatsAppError` if the WhatsApp HTTP client fails to build.
    pub fn new(
        whatsapp: Option<&WhatsAppConfig>,
        twilio: Option<&TwilioConfig>,
        push: Option<&crate::config::PushConfig>,
        pool: PgPool,
        opt_outs: Arc<OptOutRegistry>,
        admin_numbers: Vec<PhoneNumber>,
        menu_url: Option<String>,
        support: SupportConfig,
    ) -> Result<Self, WhatsAppError> {
        let whatsapp = whatsapp.map(WhatsAppClient::new).transpose()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            whatsapp,
            sms: twilio.map(TwilioClient::new),
            push: push.map(PushClient::new),
            pool,
            opt_outs,
            admin_numbers,
            menu_url,
            support,
            events,
        })
    }

    /// Subscribe a dashboard listener to queue events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Notifications for an order that was just accepted.
    pub async fn order_received(&self, order: &Order) {
        let ack = format!(
            "Hi {}, we received your order for \"{}\". We'll let you know when it's ready!",
            order.customer_name, order.raw_text
        );
        self.send_to_customer(order, &ack).await;

        let alert = format!(
            "New order: {} for {} (#{})",
            order.display_name,
            order.customer_name,
            order.id.get()
        );
        for admin in &self.admin_numbers {
            self.send_phone(admin.as_str(), &alert).await;
        }

        let _ = self.events.send(QueueEvent::OrderNew {
            id: order.id,
            canonical_id: order.canonical_id.clone(),
            display_name: order.display_name.clone(),
            source: order.channel,
        });
    }

    /// Notifications for an order that was just served.
    pub async fn order_ready(&self, order: &Order) {
        let message = format!("Your \"{}\" is ready! Come pick it up at the bar.", order.raw_text);
        self.send_to_customer(order, &message).await;

        let _ = self.events.send(QueueEvent::OrderDone {
            id: order.id,
            canonical_id: order.canonical_id.clone(),
            display_name: order.display_name.clone(),
            client_tag: order.client_tag.clone(),
        });
    }

    /// Broadcast a queue-cleared event to dashboard listeners.
    pub fn queue_cleared(&self, count: usize) {
        let _ = self.events.send(QueueEvent::QueueCleared { count });
    }

    /// Send an ad-hoc reply on a messaging channel (admin command replies,
    /// unknown-drink and out-of-stock notices).
    pub async fn reply(&self, channel: Channel, recipient: &str, body: &str) {
        match channel {
            Channel::Whatsapp => self.send_whatsapp(recipient, body).await,
            Channel::Sms => self.send_sms(recipient, body).await,
            Channel::Web => {}
        }
    }

    /// The support reply for the SMS HELP keyword.
    #[must_use]
    pub fn help_reply(&self) -> String {
        let mut lines = vec!["Last Call drink orders.".to_string()];
        if let Some(email) = &self.support.email {
            lines.push(format!("Questions? Email {email}"));
        }
        if let Some(phone) = &self.support.phone {
            lines.push(format!("or call {phone}."));
        }
        if let Some(url) = &self.support.privacy_url {
            lines.push(format!("Privacy: {url}"));
        }
        lines.push(SMS_FOOTER.to_string());
        lines.join(" ")
    }

    /// The menu pointer appended to text replies when configured.
    #[must_use]
    pub fn menu_hint(&self) -> Option<String> {
        self.menu_url.as_ref().map(|url| format!("Menu: {url}"))
    }

    async fn send_to_customer(&self, order: &Order, body: &str) {
        match order.channel {
            Channel::Whatsapp => self.send_whatsapp(&order.customer_ref, body).await,
            Channel::Sms => self.send_sms(&order.customer_ref, body).await,
            Channel::Web => {
                if let Some(tag) = &order.client_tag {
                    self.send_push(tag, &order.display_name, body).await;
                }
            }
        }
    }

    /// Send to a phone number on whichever messaging channel is configured,
    /// preferring WhatsApp.
    async fn send_phone(&self, to: &str, body: &str) {
        if self.whatsapp.is_some() {
            self.send_whatsapp(to, body).await;
        } else {
            self.send_sms(to, body).await;
        }
    }

    async fn send_whatsapp(&self, to: &str, body: &str) {
        let Some(client) = &self.whatsapp else {
            tracing::debug!(to, "WhatsApp not configured, dropping message");
            return;
        };
        if let Err(e) = client.send_text(to, body).await {
            tracing::warn!(to, error = %e, "WhatsApp send failed");
        }
    }

    async fn send_sms(&self, to: &str, body: &str) {
        let Some(client) = &self.sms else {
            tracing::debug!(to, "SMS not configured, dropping message");
            return;
        };
        let Ok(number) = PhoneNumber::normalize(to) else {
            tracing::warn!(to, "unparseable SMS recipient, dropping message");
            return;
        };
        if self.opt_outs.is_opted_out(&number) {
            tracing::debug!(to, "recipient opted out, dropping SMS");
            return;
        }
        let body = append_sms_footer(body);
        // Twilio requires E.164; canonical form is digits-only.
        if let Err(e) = client.send_text(&number.to_e164(), &body).await {
            tracing::warn!(to, error = %e, "SMS send failed");
        }
    }

    async fn send_push(&self, client_tag: &str, title: &str, body: &str) {
        let Some(client) = &self.push else {
            tracing::debug!(client_tag, "push not configured, dropping notification");
            return;
        };

        let repo = PushSubscriptionRepository::new(&self.pool);
        let subscription = match repo.get_by_client_tag(client_tag).await {
            Ok(Some(sub)) => sub,
            Ok(None) => {
                tracing::debug!(client_tag, "no push subscription on file");
                return;
            }
            Err(e) => {
                tracing::warn!(client_tag, error = %e, "push subscription lookup failed");
                return;
            }
        };

        match client.notify(&subscription.subscription, title, body).await {
            Ok(()) => {}
            Err(e) if e.is_stale() => {
                tracing::info!(client_tag, "push subscription stale, removing");
                if let Err(e) = repo.delete_by_client_tag(client_tag).await {
                    tracing::warn!(client_tag, error = %e, "failed to remove stale subscription");
                }
            }
            Err(e) => {
                tracing::warn!(client_tag, error = %e, "push send failed");
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("whatsapp", &self.whatsapp.is_some())
            .field("sms", &self.sms.is_some())
            .field("push", &self.push.is_some())
            .field("admin_numbers", &self.admin_numbers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sms_footer_appended_to_order_messages() {
        let ack = append_sms_footer("Hi Ada, we received your order for \"margarita\".");
        assert!(ack.ends_with(SMS_FOOTER));

        let ready = append_sms_footer("Your \"margarita\" is ready! Come pick it up at the bar.");
        assert!(ready.ends_with(SMS_FOOTER));
    }

    #[test]
    fn sms_footer_not_duplicated() {
        let already = format!("You're opted back in. {SMS_FOOTER}");
        let out = append_sms_footer(&already);
        assert_eq!(out, already);
        assert_eq!(out.matches(SMS_FOOTER).count(), 1);
    }
}
