//! Administrative seeding of the initial teacher and student accounts,
//! run with `marksheet-api seed`.

use bcrypt::{hash, DEFAULT_COST};
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::database::connection::USERS_COLLECTION;
use crate::errors::{AppError, Result};
use crate::models::user::{Role, User};

const INITIAL_USERS: &[(&str, &str, Role)] = &[
    ("teacher.ise@bmsce.ac.in", "teacher123", Role::Teacher),
    ("student.is21@bmsce.ac.in", "student123", Role::Student),
];

pub async fn seed_initial_users(db: &Database) -> Result<()> {
    let users: Collection<User> = db.collection(USERS_COLLECTION);

    for (email, password, role) in INITIAL_USERS {
        let existing = users.find_one(doc! { "email": email }).await?;
        if existing.is_some() {
            tracing::info!("User already exists: {}", email);
            continue;
        }

        let user = User {
            _id: None,
            email: email.to_string(),
            password: hash(password, DEFAULT_COST).map_err(|_| AppError::PasswordHash)?,
            role: *role,
            reset_token: None,
            reset_token_expiration: None,
        };
        users.insert_one(&user).await?;
        tracing::info!("User created: {}", email);
    }

    Ok(())
}
