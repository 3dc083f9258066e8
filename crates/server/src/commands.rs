//! Admin commands embedded in the customer-facing messaging channels.
//!
//! Operators text the same number the customers do; a short allow-list of
//! phone numbers decides whose messages are first offered to the command
//! parser. Anything the parser does not recognize falls through to the
//! ordinary order flow, so an admin can still order a drink.

use lastcall_core::{OrderId, PhoneNumber};

/// A recognized operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// List pending orders with positions and ids.
    Queue,
    /// Remove all pending orders (stock is untouched).
    Clear,
    /// Serve the order at this 1-based queue position.
    ServeByPosition(usize),
    /// Serve the order with this stable id, tolerant of queue reordering
    /// between listing and action.
    ServeById(OrderId),
}

/// Who is allowed to issue [`AdminCommand`]s.
#[derive(Debug, Clone, Default)]
pub struct AdminRegistry {
    allowed: Vec<PhoneNumber>,
    open_access: bool,
}

impl AdminRegistry {
    /// Build a registry from the configured allow-list.
    ///
    /// `open_access` makes *every* sender an admin when the allow-list is
    /// empty. This is a bootstrap convenience for test setups where numbers
    /// are not known yet; it must be enabled explicitly and is logged
    /// loudly at startup. With `open_access` off, an empty allow-list means
    /// nobody is an admin.
    #[must_use]
    pub fn new(allowed: Vec<PhoneNumber>, open_access: bool) -> Self {
        Self {
            allowed,
            open_access,
        }
    }

    /// Whether this sender's messages are offered to the command parser.
    #[must_use]
    pub fn is_admin(&self, sender: &PhoneNumber) -> bool {
        if self.allowed.is_empty() {
            self.open_access
        } else {
            self.allowed.contains(sender)
        }
    }

    /// Admin recipients for new-order alerts.
    #[must_use]
    pub fn alert_recipients(&self) -> &[PhoneNumber] {
        &self.allowed
    }

    /// Parse a message from `sender` as an admin command.
    ///
    /// Returns `None` when the sender is not an admin or the text is not a
    /// recognized command; callers must then continue with the normal order
    /// flow, the parser never swallows text.
    #[must_use]
    pub fn parse(&self, sender: &PhoneNumber, text: &str) -> Option<AdminCommand> {
        if !self.is_admin(sender) {
            return None;
        }
        parse_command(text)
    }
}

/// Parse the command grammar: `queue`, `clear`, a bare 1-based position,
/// or `done id <n>` / `id <n>` for serving by stable id.
///
/// Case-insensitive, surrounding whitespace ignored. A bare integer must be
/// the whole message: "2 margaritas" is an order, not a serve command.
#[must_use]
pub fn parse_command(text: &str) -> Option<AdminCommand> {
    let lower = text.trim().to_lowercase();

    match lower.as_str() {
        "queue" => return Some(AdminCommand::Queue),
        "clear" => return Some(AdminCommand::Clear),
        _ => {}
    }

    if let Ok(position) = lower.parse::<usize>() {
        if position > 0 {
            return Some(AdminCommand::ServeByPosition(position));
        }
        return None;
    }

    let id_arg = lower
        .strip_prefix("done id ")
        .or_else(|| lower.strip_prefix("id "))?;
    id_arg
        .trim()
        .parse::<i64>()
        .ok()
        .map(|id| AdminCommand::ServeById(OrderId::new(id)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn phone(s: &str) -> PhoneNumber {
        PhoneNumber::normalize(s).unwrap()
    }

    fn admins() -> AdminRegistry {
        AdminRegistry::new(vec![phone("+1 555 000 1111")], false)
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(parse_command("queue"), Some(AdminCommand::Queue));
        assert_eq!(parse_command("  QUEUE "), Some(AdminCommand::Queue));
        assert_eq!(parse_command("Clear"), Some(AdminCommand::Clear));
    }

    #[test]
    fn test_bare_position() {
        assert_eq!(parse_command("3"), Some(AdminCommand::ServeByPosition(3)));
        assert_eq!(parse_command(" 1 "), Some(AdminCommand::ServeByPosition(1)));
        assert_eq!(parse_command("0"), None);
    }

    #[test]
    fn test_position_must_be_whole_message() {
        // "2 margaritas" is a customer order from an admin, not "serve #2".
        assert_eq!(parse_command("2 margaritas"), None);
        assert_eq!(parse_command("-1"), None);
    }

    #[test]
    fn test_serve_by_id_forms() {
        let id = OrderId::new(1_700_000_000_123);
        assert_eq!(
            parse_command("done id 1700000000123"),
            Some(AdminCommand::ServeById(id))
        );
        assert_eq!(
            parse_command("ID 1700000000123"),
            Some(AdminCommand::ServeById(id))
        );
        assert_eq!(parse_command("id nonsense"), None);
    }

    #[test]
    fn test_unknown_text_falls_through() {
        assert_eq!(parse_command("margarita"), None);
        assert_eq!(parse_command("done"), None);
    }

    #[test]
    fn test_non_admin_sender_never_matches() {
        let registry = admins();
        assert_eq!(registry.parse(&phone("+1 555 999 2222"), "queue"), None);
        assert_eq!(
            registry.parse(&phone("+1 555 000 1111"), "queue"),
            Some(AdminCommand::Queue)
        );
    }

    #[test]
    fn test_allow_list_matches_across_formats() {
        // The admin typed "+1 555 000 1111" into config; WhatsApp delivers
        // "15550001111". Normalization makes them the same sender.
        let registry = admins();
        assert!(registry.is_admin(&phone("15550001111")));
    }

    #[test]
    fn test_empty_allow_list_is_closed_by_default() {
        let closed = AdminRegistry::new(vec![], false);
        assert!(!closed.is_admin(&phone("15550001111")));

        let open = AdminRegistry::new(vec![], true);
        assert!(open.is_admin(&phone("15550001111")));
    }
}
