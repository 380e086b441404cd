use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::ports::AccountRepository;
use crate::account::errors::AccountError;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, google_id, is_email_verified, \
     verification_token, token_version, first_name, last_name, country, last_login_at, \
     created_at, updated_at";

const EMAIL_CONSTRAINT: &str = "accounts_email_key";
const GOOGLE_ID_CONSTRAINT: &str = "accounts_google_id_key";

pub struct PostgresAccountRepository {
    pool: PgPool,
    /// Upper bound for each statement, pool acquisition included
    timeout: Duration,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, sqlx::Error> {
        tokio::time::timeout(self.timeout, query)
            .await
            .unwrap_or(Err(sqlx::Error::PoolTimedOut))
    }

    async fn find_one(
        &self,
        filter: &str,
        value: impl for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    ) -> Result<Option<Account>, AccountError> {
        let sql = format!("SELECT {} FROM accounts WHERE {} = $1", ACCOUNT_COLUMNS, filter);
        let row = self
            .bounded(
                sqlx::query_as::<_, AccountRow>(&sql)
                    .bind(value)
                    .fetch_optional(&self.pool),
            )
            .await
            .map_err(database_error)?;

        row.map(Account::try_from).transpose()
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    google_id: Option<String>,
    is_email_verified: bool,
    verification_token: Option<String>,
    token_version: i32,
    first_name: String,
    last_name: String,
    country: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId(row.id),
            email: EmailAddress::parse(&row.email)?,
            password_hash: row.password_hash,
            google_id: row.google_id,
            is_email_verified: row.is_email_verified,
            verification_token: row.verification_token,
            token_version: row.token_version,
            first_name: row.first_name,
            last_name: row.last_name,
            country: row.country,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map driver errors; timeouts and connection loss become `ServiceUnavailable`.
fn database_error(e: sqlx::Error) -> AccountError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::error!(error = %e, "Database unavailable");
            AccountError::ServiceUnavailable("database unavailable".to_string())
        }
        e => AccountError::DatabaseError(e.to_string()),
    }
}

/// Map write errors, translating unique violations into domain conflicts.
fn write_error(e: sqlx::Error, account: &Account) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                return AccountError::EmailAlreadyExists(account.email.to_string());
            }
            if db_err.constraint() == Some(GOOGLE_ID_CONSTRAINT) {
                return AccountError::GoogleIdAlreadyLinked;
            }
        }
    }
    database_error(e)
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let query = sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, password_hash, google_id, is_email_verified, verification_token,
                token_version, first_name, last_name, country, last_login_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(account.password_hash.as_deref())
        .bind(account.google_id.as_deref())
        .bind(account.is_email_verified)
        .bind(account.verification_token.as_deref())
        .bind(account.token_version)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.country.as_deref())
        .bind(account.last_login_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool);

        self.bounded(query)
            .await
            .map_err(|e| write_error(e, &account))?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        self.find_one("id", id.0).await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        self.find_one("email", email.as_str().to_string()).await
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<Account>, AccountError> {
        self.find_one("google_id", google_id.to_string()).await
    }

    async fn update(&self, account: Account) -> Result<Account, AccountError> {
        let query = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, password_hash = $3, google_id = $4, is_email_verified = $5,
                verification_token = $6, token_version = $7, first_name = $8, last_name = $9,
                country = $10, last_login_at = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(account.password_hash.as_deref())
        .bind(account.google_id.as_deref())
        .bind(account.is_email_verified)
        .bind(account.verification_token.as_deref())
        .bind(account.token_version)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.country.as_deref())
        .bind(account.last_login_at)
        .bind(account.updated_at)
        .execute(&self.pool);

        let result = self
            .bounded(query)
            .await
            .map_err(|e| write_error(e, &account))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(account.id.to_string()));
        }

        Ok(account)
    }

    async fn record_login(&self, id: &AccountId, at: DateTime<Utc>) -> Result<(), AccountError> {
        let result = self
            .bounded(
                sqlx::query("UPDATE accounts SET last_login_at = $2, updated_at = $2 WHERE id = $1")
                    .bind(id.0)
                    .bind(at)
                    .execute(&self.pool),
            )
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn link_google(
        &self,
        id: &AccountId,
        google_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Account, AccountError> {
        let sql = format!(
            r#"
            UPDATE accounts
            SET google_id = $2, is_email_verified = TRUE, verification_token = NULL,
                last_login_at = $3, updated_at = $3
            WHERE id = $1 AND google_id IS NULL
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );
        let row = self
            .bounded(
                sqlx::query_as::<_, AccountRow>(&sql)
                    .bind(id.0)
                    .bind(google_id)
                    .bind(at)
                    .fetch_optional(&self.pool),
            )
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_database_error()
                    .map_or(false, |db_err| db_err.is_unique_violation());
                if duplicate {
                    AccountError::GoogleIdAlreadyLinked
                } else {
                    database_error(e)
                }
            })?;

        let Some(row) = row else {
            return match self.find_by_id(id).await? {
                Some(_) => Err(AccountError::GoogleIdAlreadyLinked),
                None => Err(AccountError::NotFound(id.to_string())),
            };
        };

        Account::try_from(row)
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountError> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM accounts WHERE id = $1")
                    .bind(id.0)
                    .execute(&self.pool),
            )
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
