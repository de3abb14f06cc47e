// config.rs
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub jwt_secret: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub mail_username: String,
    pub mail_password: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            mongodb_uri: env::var("MONGODB_URI")
                .expect("MONGODB_URI must be set"),
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            openai_api_key: env::var("OPENAI_API_KEY")
                .expect("OPENAI_API_KEY must be set"),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            smtp_host: env::var("SMTP_HOST")
                .unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .expect("SMTP_PORT must be a number"),
            mail_username: env::var("MAIL_USERNAME")
                .expect("MAIL_USERNAME must be set"),
            mail_password: env::var("MAIL_PASSWORD")
                .expect("MAIL_PASSWORD must be set"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3002".to_string())
                .parse()
                .expect("PORT must be a number"),
        }
    }
}
