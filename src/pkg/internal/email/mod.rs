use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub mod assign;

use crate::{conf::settings, prelude::Result};

pub trait SendEmail {
    fn send(&self, email: &str) -> Result<()>;
}

/// Builds the message without touching the network. A bad address or body
/// yields an error for the caller to log; nothing in here panics.
fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    body: String,
    is_html: bool,
) -> std::result::Result<Message, String> {
    let content_type = if is_html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };
    let from: Mailbox = from.parse().map_err(|e| format!("invalid from address: {e}"))?;
    let to: Mailbox = to.parse().map_err(|e| format!("invalid to address: {e}"))?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(content_type)
        .body(body)
        .map_err(|e| format!("could not build message: {e}"))
}

/// Queues the mail on a detached task. Delivery failures are logged and
/// swallowed; form state is durable whether or not the notification lands.
pub fn send_email(email: &str, subject: &str, body: &str, is_html: bool) -> Result<()> {
    let (name, _) = email.split_once("@").unwrap_or(("unknown", ""));
    let name = name.to_string();
    let email = email.to_string();
    let subject = subject.to_string();
    let body = body.to_string();
    tracing::debug!("sending email to {}", &email);
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || -> std::result::Result<(), String> {
            let message = build_message(
                &format!("{} <{}>", &settings.service_name, &settings.from_email),
                &format!("{} <{}>", &name, &email),
                &subject,
                body,
                is_html,
            )?;

            let creds = Credentials::new(settings.smtp_user.clone(), settings.smtp_pass.clone());

            let mailer = SmtpTransport::relay(&settings.smtp_server)
                .map_err(|e| format!("could not reach relay: {e}"))?
                .credentials(creds)
                .build();

            mailer.send(&message).map_err(|e| format!("send failed: {e}"))?;
            Ok(())
        })
        .await;

        match result {
            Ok(Ok(())) => tracing::info!("email sent successfully"),
            Ok(Err(e)) => tracing::error!("could not send email: {e}"),
            Err(e) => tracing::error!("mail task failed to execute: {e:?}"),
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_rejects_bad_addresses_without_panicking() {
        let ok = build_message(
            "Formgate <forms@corp.com>",
            "Ashu <ashu@corp.com>",
            "hello",
            "<p>hi</p>".into(),
            true,
        );
        assert!(ok.is_ok());

        let bad = build_message(
            "Formgate <forms@corp.com>",
            "not-an-address",
            "hello",
            "hi".into(),
            false,
        );
        assert!(bad.is_err());
    }
}
