//! Inbound order channels.

use serde::{Deserialize, Serialize};

/// The surface an order arrived through.
///
/// The channel determines how the customer is notified when their order is
/// ready: WhatsApp and SMS orders are addressed by phone number, web orders
/// by push subscription (looked up via the order's client tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Whatsapp,
    Sms,
    Web,
}

impl Channel {
    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Sms => "sms",
            Self::Web => "web",
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Channel::Whatsapp).unwrap(), "\"whatsapp\"");
        assert_eq!(serde_json::to_string(&Channel::Sms).unwrap(), "\"sms\"");
        let back: Channel = serde_json::from_str("\"web\"").unwrap();
        assert_eq!(back, Channel::Web);
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(Channel::Sms.to_string(), "sms");
        assert_eq!(Channel::Whatsapp.to_string(), "whatsapp");
    }
}
