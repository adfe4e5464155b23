use chrono::Utc;
use futures::future::BoxFuture;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::models::{NewAccount, User, UserProfile};

/// Account storage. Implementations must create the user and its profile
/// together or not at all.
pub trait UserRepository: Send + Sync {
    fn create_account(&self, account: NewAccount) -> BoxFuture<'_, Result<User, AuthError>>;
    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<User>, AuthError>>;
    fn find_by_username<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<Option<User>, AuthError>>;
    fn find_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<User>, AuthError>>;
    fn find_profile(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<UserProfile>, AuthError>>;
    fn update_password<'a>(&'a self, user_id: Uuid, password_hash: &'a str) -> BoxFuture<'a, Result<(), AuthError>>;
    fn record_login(&self, user_id: Uuid) -> BoxFuture<'_, Result<(), AuthError>>;
}

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, date_joined, last_login";

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn map_unique_violation(error: sqlx::Error) -> AuthError {
        if let sqlx::Error::Database(db_error) = &error {
            match db_error.constraint() {
                Some("users_username_key") => return AuthError::UsernameTaken,
                Some("users_email_key") => return AuthError::EmailTaken,
                _ => {}
            }
        }
        AuthError::Database(error)
    }
}

impl UserRepository for PgUserRepository {
    fn create_account(&self, account: NewAccount) -> BoxFuture<'_, Result<User, AuthError>> {
        Box::pin(async move {
            let mut tx = self.db.begin().await?;

            let user = sqlx::query_as::<_, User>(&format!(
                "INSERT INTO users (id, username, email, password_hash, is_active, date_joined)
                 VALUES ($1, $2, $3, $4, TRUE, $5)
                 RETURNING {}",
                USER_COLUMNS
            ))
            .bind(Uuid::new_v4())
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(Self::map_unique_violation)?;

            sqlx::query(
                "INSERT INTO user_profiles (user_id, phone_number, dob, hospital_name)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user.id)
            .bind(&account.phone_number)
            .bind(account.dob)
            .bind(&account.hospital_name)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(user)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<User>, AuthError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
            Ok(user)
        })
    }

    fn find_by_username<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<Option<User>, AuthError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
                .bind(username)
                .fetch_optional(&self.db)
                .await?;
            Ok(user)
        })
    }

    fn find_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<User>, AuthError>> {
        Box::pin(async move {
            let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
                .bind(email)
                .fetch_optional(&self.db)
                .await?;
            Ok(user)
        })
    }

    fn find_profile(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<UserProfile>, AuthError>> {
        Box::pin(async move {
            let profile = sqlx::query_as::<_, UserProfile>(
                "SELECT user_id, phone_number, dob, hospital_name FROM user_profiles WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
            Ok(profile)
        })
    }

    fn update_password<'a>(&'a self, user_id: Uuid, password_hash: &'a str) -> BoxFuture<'a, Result<(), AuthError>> {
        Box::pin(async move {
            sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
                .bind(user_id)
                .bind(password_hash)
                .execute(&self.db)
                .await?;
            Ok(())
        })
    }

    fn record_login(&self, user_id: Uuid) -> BoxFuture<'_, Result<(), AuthError>> {
        Box::pin(async move {
            sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
                .bind(user_id)
                .bind(Utc::now())
                .execute(&self.db)
                .await?;
            Ok(())
        })
    }
}

/// Process-local account storage for running without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    accounts: Arc<RwLock<HashMap<Uuid, (User, UserProfile)>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_user(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .map(|(user, _)| user)
            .find(|user| predicate(user))
            .cloned()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create_account(&self, account: NewAccount) -> BoxFuture<'_, Result<User, AuthError>> {
        Box::pin(async move {
            let mut accounts = self.accounts.write().await;

            if accounts.values().any(|(u, _)| u.username == account.username) {
                return Err(AuthError::UsernameTaken);
            }
            if accounts.values().any(|(u, _)| u.email == account.email) {
                return Err(AuthError::EmailTaken);
            }

            let user = User {
                id: Uuid::new_v4(),
                username: account.username,
                email: account.email,
                password_hash: account.password_hash,
                is_active: true,
                date_joined: Utc::now(),
                last_login: None,
            };
            let profile = UserProfile {
                user_id: user.id,
                phone_number: account.phone_number,
                dob: account.dob,
                hospital_name: account.hospital_name,
            };

            accounts.insert(user.id, (user.clone(), profile));
            Ok(user)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<User>, AuthError>> {
        Box::pin(async move {
            let accounts = self.accounts.read().await;
            Ok(accounts.get(&id).map(|(user, _)| user.clone()))
        })
    }

    fn find_by_username<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<Option<User>, AuthError>> {
        Box::pin(async move { Ok(self.find_user(|u| u.username == username).await) })
    }

    fn find_by_email<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<User>, AuthError>> {
        Box::pin(async move { Ok(self.find_user(|u| u.email == email).await) })
    }

    fn find_profile(&self, user_id: Uuid) -> BoxFuture<'_, Result<Option<UserProfile>, AuthError>> {
        Box::pin(async move {
            let accounts = self.accounts.read().await;
            Ok(accounts.get(&user_id).map(|(_, profile)| profile.clone()))
        })
    }

    fn update_password<'a>(&'a self, user_id: Uuid, password_hash: &'a str) -> BoxFuture<'a, Result<(), AuthError>> {
        Box::pin(async move {
            let mut accounts = self.accounts.write().await;
            if let Some((user, _)) = accounts.get_mut(&user_id) {
                user.password_hash = password_hash.to_string();
            }
            Ok(())
        })
    }

    fn record_login(&self, user_id: Uuid) -> BoxFuture<'_, Result<(), AuthError>> {
        Box::pin(async move {
            let mut accounts = self.accounts.write().await;
            if let Some((user, _)) = accounts.get_mut(&user_id) {
                user.last_login = Some(Utc::now());
            }
            Ok(())
        })
    }
}
