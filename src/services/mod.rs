pub mod extraction;
pub mod mail_service;
pub mod otp_store;
pub mod vision_service;
