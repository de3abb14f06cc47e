use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const OTP_TTL_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy)]
struct OtpEntry {
    code: u32,
    expires_at: DateTime<Utc>,
}

/// Process-local store of pending password-reset codes, keyed by email.
/// At most one live entry per email; a newer request overwrites the old
/// one and a successful verification consumes the entry. Entries are lost
/// on restart, which is fine for a single-instance deployment.
///
/// Mutating operations take `now` so expiry behavior is deterministic in
/// tests; handlers pass `Utc::now()`.
#[derive(Clone, Default)]
pub struct OtpStore {
    entries: Arc<Mutex<HashMap<String, OtpEntry>>>,
}

impl OtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a 6-digit OTP, uniform over [100000, 999999].
    pub fn generate_code() -> u32 {
        let mut rng = rand::thread_rng();
        rng.gen_range(100_000..=999_999)
    }

    /// Store a code for `email`, replacing any pending entry.
    pub fn issue(&self, email: &str, code: u32, now: DateTime<Utc>) {
        let entry = OtpEntry {
            code,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
        };
        let mut entries = self.entries.lock().unwrap();
        entries.insert(email.to_string(), entry);
    }

    /// Check `code` against the pending entry for `email` without
    /// removing it. The entry is only deleted by an explicit `consume`
    /// once the caller has persisted the new password, so a failed write
    /// does not burn the code. Expired entries are reclaimed by `sweep`.
    pub fn verify(&self, email: &str, code: u32, now: DateTime<Utc>) -> bool {
        let entries = self.entries.lock().unwrap();
        matches!(
            entries.get(email),
            Some(entry) if entry.code == code && now <= entry.expires_at
        )
    }

    /// Remove the pending entry for `email` (single-use).
    pub fn consume(&self, email: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(email);
    }

    /// Drop every entry whose expiry has passed. Returns how many were
    /// removed. Run periodically from a background task.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        before - entries.len()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
