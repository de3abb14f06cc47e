use std::sync::Arc;

use mongodb::Database;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::mail_service::MailService;
use crate::services::otp_store::OtpStore;
use crate::services::vision_service::VisionService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt_secret: String,
    pub otp_store: OtpStore,
    pub vision: Arc<VisionService>,
    pub mailer: Arc<MailService>,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Result<Self> {
        let vision = VisionService::new(config.openai_api_key.clone(), config.openai_model.clone());
        let mailer = MailService::new(
            &config.smtp_host,
            config.smtp_port,
            config.mail_username.clone(),
            config.mail_password.clone(),
        )?;

        Ok(AppState {
            db,
            jwt_secret: config.jwt_secret.clone(),
            otp_store: OtpStore::new(),
            vision: Arc::new(vision),
            mailer: Arc::new(mailer),
        })
    }
}
