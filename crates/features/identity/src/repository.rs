use lvai_database::surrealdb::Error;
use lvai_database::{Database, DatabaseError, DatabaseErrorExt};
use lvai_kernel::safe_nanoid;
use surrealdb_types::SurrealValue;

/// A row of the `user` table.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
    pub credits: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_login_at: Option<i64>,
}

impl UserRecord {
    /// A fresh active account with an empty balance; the welcome grant goes through the ledger.
    #[must_use]
    pub fn new(
        email: String,
        username: String,
        password_hash: String,
        full_name: Option<String>,
        now: i64,
    ) -> Self {
        Self {
            uid: safe_nanoid!(),
            email,
            username,
            password_hash,
            full_name,
            avatar_url: None,
            is_active: true,
            is_verified: false,
            is_superuser: false,
            credits: 0,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }
}

/// Which unique account field is already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountConflict {
    Email,
    Username,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Database,
}

impl UserRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, uid: &str) -> Result<Option<UserRecord>, DatabaseError> {
        self.find_one("uid", uid).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        self.find_one("email", email).await
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        self.find_one("username", username).await
    }

    /// Email wins when both are taken.
    pub async fn conflict(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<AccountConflict>, DatabaseError> {
        if self.find_by_email(email).await?.is_some() {
            return Ok(Some(AccountConflict::Email));
        }
        if self.find_by_username(username).await?.is_some() {
            return Ok(Some(AccountConflict::Username));
        }
        Ok(None)
    }

    async fn find_one(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let rows = self
            .db
            .query(format!("SELECT * OMIT id FROM user WHERE {field} = $value LIMIT 1"))
            .bind(("value", value.to_owned()))
            .await
            .context("Loading user")?
            .take::<Vec<UserRecord>>(0)
            .context("Parsing user")?;

        Ok(rows.into_iter().next())
    }

    /// Inserts the account and, when `initial_credits > 0`, its `initial` ledger entry in one
    /// transaction.
    pub async fn create(
        &self,
        user: UserRecord,
        initial_credits: i64,
    ) -> Result<UserRecord, DatabaseError> {
        let uid = user.uid.clone();

        self.db
            .query(
                "BEGIN TRANSACTION;
                CREATE user CONTENT $user;
                IF $initial > 0 {
                    fn::ledger_apply($uid, $initial, {
                        uid: $entry_uid,
                        transaction_type: 'initial',
                        description: 'Welcome credits',
                        reference_id: NONE,
                        reference_type: NONE,
                        created_at: $now
                    });
                };
                COMMIT TRANSACTION;",
            )
            .bind(("now", user.created_at))
            .bind(("user", user))
            .bind(("uid", uid.clone()))
            .bind(("initial", initial_credits))
            .bind(("entry_uid", safe_nanoid!()))
            .await
            .context("Creating user")?
            .check()
            .map_err(Error::from)
            .context("Creating user")?;

        self.find_by_id(&uid).await?.ok_or_else(|| DatabaseError::Internal {
            message: "user vanished after insert".into(),
            context: Some(uid.into()),
        })
    }

    pub async fn record_login(&self, uid: &str, now: i64) -> Result<(), DatabaseError> {
        self.db
            .query("UPDATE user SET last_login_at = $now, updated_at = $now WHERE uid = $uid")
            .bind(("uid", uid.to_owned()))
            .bind(("now", now))
            .await
            .context("Recording login")?
            .check()
            .map_err(Error::from)
            .context("Recording login")?;
        Ok(())
    }

    /// Sets the provided profile fields and returns the updated row.
    pub async fn update_profile(
        &self,
        uid: &str,
        full_name: Option<String>,
        avatar_url: Option<String>,
        now: i64,
    ) -> Result<Option<UserRecord>, DatabaseError> {
        let mut assignments = vec!["updated_at = $now"];
        if full_name.is_some() {
            assignments.push("full_name = $full_name");
        }
        if avatar_url.is_some() {
            assignments.push("avatar_url = $avatar_url");
        }

        self.db
            .query(format!("UPDATE user SET {} WHERE uid = $uid", assignments.join(", ")))
            .bind(("uid", uid.to_owned()))
            .bind(("now", now))
            .bind(("full_name", full_name))
            .bind(("avatar_url", avatar_url))
            .await
            .context("Updating profile")?
            .check()
            .map_err(Error::from)
            .context("Updating profile")?;

        self.find_by_id(uid).await
    }
}
