use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::errors::{AppError, Result};

/// SMTP relay for OTP delivery. One send per reset request, no retries;
/// a failed send surfaces to the caller while the stored OTP stays valid.
#[derive(Clone)]
pub struct MailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl MailService {
    pub fn new(host: &str, port: u16, username: String, password: String) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::NotificationFailed(format!("SMTP relay error: {}", e)))?
            .port(port)
            .credentials(Credentials::new(username.clone(), password))
            .build();

        Ok(Self {
            transport,
            from: username,
        })
    }

    pub async fn send_otp(&self, to: &str, code: u32) -> Result<()> {
        let body = format!(
            "<p>Your OTP for password reset is: <strong>{}</strong></p>\
             <p>It is valid for 5 minutes.</p>",
            code
        );

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::NotificationFailed(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::NotificationFailed(format!("Invalid to address: {}", e)))?)
            .subject("Password Reset OTP")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| AppError::NotificationFailed(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::NotificationFailed(e.to_string()))?;

        Ok(())
    }
}
