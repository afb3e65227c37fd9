// 📲 WhatsApp messaging - deep links handed off to an opener
//
// Nothing here waits for delivery. "Sent" means a `https://wa.me/...` link was
// built and handed to the `Messenger`.

pub mod business;
pub mod phone;
pub mod templates;

use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

pub use business::{BusinessApi, BusinessApiConfig};

/// Base of every deep link
pub const WA_ME: &str = "https://wa.me/";

// ============================================================================
// OUTBOUND MESSAGES
// ============================================================================

/// Who a message goes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// The clinic's own WhatsApp number (from configuration)
    Clinic,
    /// Any phone number, in any punctuation
    Phone(String),
}

/// A message built by a view-model, not yet handed to a messenger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: Recipient,
    pub text: String,
}

impl OutboundMessage {
    pub fn to_clinic(text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Clinic,
            text: text.into(),
        }
    }

    pub fn to_phone(phone: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Phone(phone.into()),
            text: text.into(),
        }
    }
}

/// `https://wa.me/<digits>?text=<percent-encoded message>`
pub fn deep_link(phone: &str, message: &str) -> String {
    format!(
        "{}{}?text={}",
        WA_ME,
        phone::normalize(phone),
        urlencoding::encode(message)
    )
}

// ============================================================================
// MESSENGERS
// ============================================================================

/// Something that can open a link in a new browsing context
pub trait Messenger {
    fn open(&mut self, url: &str);
}

/// Keeps every opened link in memory, newest last
#[derive(Debug, Default, Clone)]
pub struct Outbox {
    links: Vec<String>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn last(&self) -> Option<&str> {
        self.links.last().map(String::as_str)
    }
}

impl Messenger for Outbox {
    fn open(&mut self, url: &str) {
        self.links.push(url.to_string());
    }
}

/// Opens links with the platform URL handler
///
/// - Windows: explorer
/// - macOS: open
/// - Linux: xdg-open
#[derive(Debug, Clone)]
pub struct SystemOpener {
    program: String,
}

impl Default for SystemOpener {
    fn default() -> Self {
        let program = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Self::with_program(program)
    }
}

impl SystemOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific opener binary instead of the platform one
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Messenger for SystemOpener {
    fn open(&mut self, url: &str) {
        // The dashboard owns the terminal; the child must not write into it
        let spawned = Command::new(&self.program)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                // reaped off the UI thread so no zombie is left behind
                thread::spawn(move || {
                    if let Err(e) = child.wait() {
                        debug!(error = %e, "opener exit status unavailable");
                    }
                });
            }
            Err(e) => warn!(program = %self.program, error = %e, "could not open link"),
        }
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Resolves recipients against the clinic number and hands links to a messenger
pub struct WhatsApp<M: Messenger> {
    clinic_number: String,
    messenger: M,
}

impl<M: Messenger> WhatsApp<M> {
    pub fn new(clinic_number: impl Into<String>, messenger: M) -> Self {
        Self {
            clinic_number: clinic_number.into(),
            messenger,
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Open a chat with `phone`; returns the link that was opened
    pub fn send_message(&mut self, phone: &str, message: &str) -> String {
        let link = deep_link(phone, message);
        debug!(to = %phone::normalize(phone), "opening whatsapp link");
        self.messenger.open(&link);
        link
    }

    /// Open a chat with the clinic; returns the link that was opened
    pub fn send_to_clinic(&mut self, message: &str) -> String {
        let clinic = self.clinic_number.clone();
        self.send_message(&clinic, message)
    }

    pub fn deliver(&mut self, message: &OutboundMessage) -> String {
        match &message.recipient {
            Recipient::Clinic => self.send_to_clinic(&message.text),
            Recipient::Phone(phone) => self.send_message(phone, &message.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_link_normalizes_and_encodes() {
        let link = deep_link("(11) 99999-9999", "Olá! Tudo bem?");
        assert_eq!(link, "https://wa.me/11999999999?text=Ol%C3%A1%21%20Tudo%20bem%3F");
    }

    #[test]
    fn test_deep_link_encodes_newlines() {
        let link = deep_link("11999999999", "a\nb");
        assert!(link.ends_with("?text=a%0Ab"));
    }

    #[test]
    fn test_send_to_clinic_uses_configured_number() {
        let mut whatsapp = WhatsApp::new("5511999999999", Outbox::new());

        let link = whatsapp.send_to_clinic("oi");

        assert_eq!(link, "https://wa.me/5511999999999?text=oi");
        assert_eq!(whatsapp.messenger().links(), &[link]);
    }

    #[test]
    fn test_deliver_routes_by_recipient() {
        let mut whatsapp = WhatsApp::new("5511000000000", Outbox::new());

        whatsapp.deliver(&OutboundMessage::to_phone("11 98888-7777", "x"));
        whatsapp.deliver(&OutboundMessage::to_clinic("y"));

        let links = whatsapp.messenger().links();
        assert_eq!(links.len(), 2);
        assert!(links[0].starts_with("https://wa.me/11988887777?"));
        assert!(links[1].starts_with("https://wa.me/5511000000000?"));
        assert_eq!(whatsapp.messenger().last(), Some(links[1].as_str()));
    }

    #[test]
    fn test_missing_opener_only_logs() {
        let opener = SystemOpener::with_program("caramelo-no-such-opener");
        let mut whatsapp = WhatsApp::new("5511999999999", opener);

        let link = whatsapp.send_to_clinic("oi");

        assert_eq!(link, "https://wa.me/5511999999999?text=oi");
        assert_eq!(whatsapp.messenger().program(), "caramelo-no-such-opener");
    }

    #[cfg(unix)]
    #[test]
    fn test_opener_runs_detached() {
        let mut whatsapp = WhatsApp::new("5511999999999", SystemOpener::with_program("true"));

        let link = whatsapp.deliver(&OutboundMessage::to_phone("11999999999", "x"));
        assert!(link.starts_with("https://wa.me/11999999999?"));
    }

    #[test]
    fn test_default_opener_matches_platform() {
        let expected = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        assert_eq!(SystemOpener::new().program(), expected);
    }
}
