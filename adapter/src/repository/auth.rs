use crate::database::{model::user::UserCredentialRow, ConnectionPool};
use crate::redis::RedisClient;
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    auth::{event::CreateToken, AccessToken},
    id::UserId,
};
use kernel::repository::auth::AuthRepository;
use shared::error::{AppError, AppResult};
use std::str::FromStr;
use std::sync::Arc;

#[derive(new)]
pub struct AuthRepositoryImpl {
    db: ConnectionPool,
    kv: Arc<RedisClient>,
    ttl: u64,
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>> {
        let value = self.kv.get(&token_key(access_token)).await?;
        value.map(|v| UserId::from_str(&v)).transpose()
    }

    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId> {
        let row = sqlx::query_as::<_, UserCredentialRow>(
            r#"
                SELECT user_id, password_hash
                FROM users
                WHERE email = $1 AND is_active
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // ユーザーの不存在とパスワード不一致は区別せずに返す
        let Some(row) = row else {
            return Err(AppError::UnauthenticatedError);
        };

        let valid = bcrypt::verify(password, &row.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(row.user_id)
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let access_token = AccessToken(token);
        self.kv
            .set_ex(
                &token_key(&access_token),
                &event.user_id.to_string(),
                self.ttl,
            )
            .await?;
        Ok(access_token)
    }

    async fn delete_token(&self, access_token: AccessToken) -> AppResult<()> {
        self.kv.delete(&token_key(&access_token)).await
    }
}

fn token_key(access_token: &AccessToken) -> String {
    format!("token:{}", access_token.0)
}
