use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::{smtp::authentication::Credentials, stub::AsyncStubTransport},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::config::{Config, EmailBackend};

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Stub(AsyncStubTransport),
}

pub struct EmailService {
    transport: Transport,
    from: Mailbox,
}

impl EmailService {
    /// Returns None if the configured backend is not usable.
    pub fn new(config: &Config) -> Option<Self> {
        // Sender defaults to the SMTP login.
        let from_addr = config
            .smtp_from
            .as_deref()
            .or(config.smtp_username.as_deref());

        if config.email_backend == EmailBackend::Stub {
            let from: Mailbox = from_addr.unwrap_or("noreply@restaurant.local").parse().ok()?;
            return Some(Self::stub(from, false));
        }

        let from: Mailbox = from_addr?.parse().ok()?;
        let host = config.smtp_host.as_deref()?;
        let username = config.smtp_username.clone()?;
        let password = config.smtp_password.clone()?;

        let port = config.smtp_port.unwrap_or(587);
        let creds = Credentials::new(username, password);

        let transport = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .ok()?
                .port(port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .port(port)
                .credentials(creds)
                .build()
        };

        Some(Self {
            transport: Transport::Smtp(transport),
            from,
        })
    }

    /// In-memory transport. With `failing` set, every send returns an error.
    pub fn stub(from: Mailbox, failing: bool) -> Self {
        let transport = if failing {
            AsyncStubTransport::new_error()
        } else {
            AsyncStubTransport::new_ok()
        };
        Self {
            transport: Transport::Stub(transport),
            from,
        }
    }

    /// Raw messages accepted by the stub transport; always empty for SMTP.
    pub async fn sent_messages(&self) -> Vec<String> {
        match &self.transport {
            Transport::Stub(stub) => stub
                .messages()
                .await
                .into_iter()
                .map(|(_, raw)| raw)
                .collect(),
            Transport::Smtp(_) => Vec::new(),
        }
    }

    // ─── Private helpers ─────────────────────────────────────────────────────

    fn new_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }

    fn wrap_html(content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width,initial-scale=1">
  <title>Le restaurant</title>
</head>
<body style="margin:0;padding:0;background-color:#f5f5f4;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif">
  <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background-color:#f5f5f4;padding:40px 16px">
    <tr>
      <td align="center">
        <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="max-width:520px">
          <tr>
            <td style="background:#ffffff;border-radius:12px;padding:40px">
              {content}
            </td>
          </tr>
          <tr>
            <td align="center" style="padding-top:20px">
              <p style="margin:0;font-size:12px;color:#a8a29e">L'équipe du restaurant</p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>"#
        )
    }

    async fn send_email(&self, to: Mailbox, subject: &str, text: &str, html: &str) -> anyhow::Result<()> {
        let email = Message::builder()
            .message_id(Some(self.new_message_id()))
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )
            .context("Failed to build email message")?;

        match &self.transport {
            Transport::Smtp(smtp) => {
                smtp.send(email)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to send email: {e}"))?;
            }
            Transport::Stub(stub) => {
                stub.send(email)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to send email: {e}"))?;
                tracing::info!(subject, "Email captured by stub transport");
            }
        }

        Ok(())
    }

    // ─── Public methods ───────────────────────────────────────────────────────

    pub async fn send_password_reset(
        &self,
        to_email: &str,
        username: &str,
        reset_url: &str,
        validity_seconds: i32,
    ) -> anyhow::Result<()> {
        let validity = describe_validity(validity_seconds);
        let to: Mailbox = to_email
            .parse()
            .with_context(|| format!("Invalid recipient address: {to_email}"))?;

        let subject = "Réinitialisation de votre mot de passe";
        let text = format!(
            "Bonjour {username},\n\n\
             Vous avez demandé à réinitialiser votre mot de passe. \
             Veuillez cliquer sur le lien suivant pour continuer :\n\
             {reset_url}\n\n\
             Ce lien est valide pendant {validity}.\n\n\
             L'équipe du restaurant\n"
        );
        let html = Self::wrap_html(&format!(
            r#"<p style="margin:0 0 16px;font-size:15px;color:#1c1917">Bonjour {username},</p>
              <p style="margin:0 0 24px;font-size:15px;color:#44403c">Vous avez demandé à réinitialiser votre mot de passe. Cliquez sur le bouton ci-dessous pour continuer.</p>
              <p style="margin:0 0 24px;text-align:center"><a href="{reset_url}" style="display:inline-block;background:#b45309;color:#ffffff;text-decoration:none;padding:12px 24px;border-radius:8px;font-weight:600">Choisir un nouveau mot de passe</a></p>
              <p style="margin:0;font-size:13px;color:#78716c">Ce lien est valide pendant {validity}. Si vous n'êtes pas à l'origine de cette demande, ignorez cet email.</p>"#
        ));

        self.send_email(to, subject, &text, &html).await
    }
}

/// French wording of a validity window, e.g. "1 heure" or "30 minutes".
fn describe_validity(seconds: i32) -> String {
    match seconds {
        3600 => "1 heure".to_string(),
        s if s % 3600 == 0 => format!("{} heures", s / 3600),
        s if s >= 60 => format!("{} minutes", s / 60),
        s => format!("{s} secondes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_validity() {
        assert_eq!(describe_validity(3600), "1 heure");
        assert_eq!(describe_validity(7200), "2 heures");
        assert_eq!(describe_validity(1800), "30 minutes");
    }

    #[tokio::test]
    async fn test_stub_transport_records_reset_email() {
        let svc = EmailService::stub("noreply@restaurant.local".parse().unwrap(), false);
        svc.send_password_reset(
            "chef@example.com",
            "chef",
            "https://front.example/reset-password/1/abc/",
            3600,
        )
        .await
        .unwrap();
        let sent = svc.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("chef@example.com"));
    }

    #[tokio::test]
    async fn test_failing_stub_reports_error() {
        let svc = EmailService::stub("noreply@restaurant.local".parse().unwrap(), true);
        let result = svc
            .send_password_reset("chef@example.com", "chef", "https://front.example/", 3600)
            .await;
        assert!(result.is_err());
    }
}
