//! Call/message URI formatting for stored contacts.
//!
//! Numbers are stored unnormalized; these helpers only strip whitespace so
//! the result is a valid URI. Dispatching the URI is the embedder's job.

use crate::model::contact::ContactRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// `tel:` URI for the contact's number, or `None` when it has no number.
pub fn dial_uri(contact: &ContactRecord) -> Option<String> {
    format_uri("tel", &contact.phone_number)
}

/// `sms:` URI for the contact's number, or `None` when it has no number.
pub fn message_uri(contact: &ContactRecord) -> Option<String> {
    format_uri("sms", &contact.phone_number)
}

fn format_uri(scheme: &str, phone_number: &str) -> Option<String> {
    let compact = WHITESPACE_RE.replace_all(phone_number, "");
    if compact.is_empty() {
        return None;
    }
    Some(format!("{scheme}:{compact}"))
}

#[cfg(test)]
mod tests {
    use super::{dial_uri, message_uri};
    use crate::model::contact::{ContactDraft, ContactRecord};

    fn contact(phone_number: &str) -> ContactRecord {
        ContactRecord::from_draft(1, ContactDraft::new("Ann", phone_number))
    }

    #[test]
    fn strips_whitespace_and_keeps_separators() {
        let ann = contact(" +1 (555) 010-99 ");
        assert_eq!(dial_uri(&ann).as_deref(), Some("tel:+1(555)010-99"));
        assert_eq!(message_uri(&ann).as_deref(), Some("sms:+1(555)010-99"));
    }

    #[test]
    fn blank_number_has_no_uri() {
        assert_eq!(dial_uri(&contact("")), None);
        assert_eq!(message_uri(&contact("  \t")), None);
    }
}
