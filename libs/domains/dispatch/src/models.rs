//! Data models for the dispatch domain.

use serde::{Deserialize, Serialize};

/// Default subject when the request carries none.
pub const DEFAULT_SUBJECT: &str = "Test wysyłki PDF";
/// Default PDF title when the request carries no subject.
pub const DEFAULT_TITLE: &str = "Test PDF";
/// Default PDF body text when the request carries no message.
pub const DEFAULT_MESSAGE: &str = "Treść testowa PDF.";
/// Default email body when the request carries no message. Distinct from
/// the PDF body default.
pub const DEFAULT_EMAIL_BODY: &str = "W załączniku PDF.";
/// Default attachment filename.
pub const DEFAULT_ATTACHMENT_FILENAME: &str = "raport-godzin.pdf";

/// An inbound request to render a PDF and mail it to one recipient.
///
/// `recipient` also deserializes from the legacy `to` field.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SendRequest {
    /// Recipient email address. Required and non-empty.
    #[serde(alias = "to", default)]
    pub recipient: String,
    /// Email subject, doubles as the PDF title. Optional.
    #[serde(default)]
    pub subject: Option<String>,
    /// Email/PDF body text. Optional.
    #[serde(default)]
    pub message: Option<String>,
}

impl SendRequest {
    /// Subject with the fixed default applied.
    pub fn subject_or_default(&self) -> &str {
        match self.subject.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_SUBJECT,
        }
    }

    /// PDF title with the fixed default applied.
    pub fn title_or_default(&self) -> &str {
        match self.subject.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_TITLE,
        }
    }

    /// PDF body with the fixed default applied.
    pub fn message_or_default(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_MESSAGE,
        }
    }

    /// Email body with its own fixed default applied.
    pub fn email_body_or_default(&self) -> &str {
        match self.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => DEFAULT_EMAIL_BODY,
        }
    }

    /// HTML rendition of the email body, with `<` escaped.
    pub fn html_body(&self) -> String {
        format!(
            "<p>{}</p>",
            self.email_body_or_default().replace('<', "&lt;")
        )
    }
}

/// A rendered PDF document, immutable once produced.
///
/// Owned exclusively by the dispatch call that created it and dropped after
/// the send attempt.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Attachment filename the document will be delivered under.
    pub filename: String,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

/// Success half of the uniform response envelope.
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    /// Which provider handled the send.
    pub provider: &'static str,
    /// Provider-specific message identifier, when the provider reports one.
    pub message_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_accepts_to_alias() {
        let req: SendRequest = serde_json::from_str(r#"{"to":"a@b.pl"}"#).unwrap();
        assert_eq!(req.recipient, "a@b.pl");
        assert!(req.subject.is_none());
        assert!(req.message.is_none());
    }

    #[test]
    fn test_send_request_accepts_recipient_field() {
        let req: SendRequest =
            serde_json::from_str(r#"{"recipient":"a@b.pl","subject":"S","message":"M"}"#).unwrap();
        assert_eq!(req.recipient, "a@b.pl");
        assert_eq!(req.subject_or_default(), "S");
        assert_eq!(req.message_or_default(), "M");
    }

    #[test]
    fn test_send_request_missing_recipient_deserializes_empty() {
        let req: SendRequest = serde_json::from_str(r#"{"subject":"S"}"#).unwrap();
        assert!(req.recipient.is_empty());
    }

    #[test]
    fn test_defaults_applied_when_fields_absent_or_empty() {
        let req = SendRequest::default();
        assert_eq!(req.subject_or_default(), DEFAULT_SUBJECT);
        assert_eq!(req.title_or_default(), DEFAULT_TITLE);
        assert_eq!(req.message_or_default(), DEFAULT_MESSAGE);
        assert_eq!(req.email_body_or_default(), DEFAULT_EMAIL_BODY);

        let req = SendRequest {
            recipient: "a@b.pl".into(),
            subject: Some(String::new()),
            message: Some(String::new()),
        };
        assert_eq!(req.subject_or_default(), DEFAULT_SUBJECT);
        assert_eq!(req.message_or_default(), DEFAULT_MESSAGE);
        assert_eq!(req.email_body_or_default(), DEFAULT_EMAIL_BODY);
    }

    #[test]
    fn test_default_email_body_differs_from_pdf_body() {
        let req = SendRequest {
            recipient: "a@b.pl".into(),
            subject: None,
            message: None,
        };
        assert_eq!(req.message_or_default(), "Treść testowa PDF.");
        assert_eq!(req.email_body_or_default(), "W załączniku PDF.");
        assert_eq!(req.html_body(), "<p>W załączniku PDF.</p>");

        // An explicit message feeds both the PDF and the email body
        let req = SendRequest {
            recipient: "a@b.pl".into(),
            subject: None,
            message: Some("Raport w załączniku".into()),
        };
        assert_eq!(req.message_or_default(), req.email_body_or_default());
    }

    #[test]
    fn test_html_body_escapes_angle_brackets() {
        let req = SendRequest {
            recipient: "a@b.pl".into(),
            subject: None,
            message: Some("<script>alert(1)</script>".into()),
        };
        assert_eq!(
            req.html_body(),
            "<p>&lt;script>alert(1)&lt;/script></p>"
        );
    }
}
