use crate::database::{
    classify_db_error,
    model::user::{UserCredentialRow, UserRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    reservation::ReservationStatus,
    role::Role,
    user::{
        event::{CreateUser, DeleteUser, UpdateUserActive, UpdateUserPassword, UpdateUserRole},
        User, UserListOptions,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let user_id = UserId::new();
        let hashed_password = bcrypt::hash(&event.password, bcrypt::DEFAULT_COST)?;
        let role = Role::Client;

        let res = sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&event.user_name)
        .bind(&event.email)
        .bind(&hashed_password)
        .bind(role)
        .execute(self.db.inner_ref())
        .await;

        match res {
            Ok(_) => Ok(User {
                user_id,
                user_name: event.user_name,
                email: event.email,
                role,
                is_active: true,
            }),
            // 23505: unique_violation — メールアドレスの重複
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => Err(
                AppError::UnprocessableEntity("このメールアドレスはすでに登録されています。".into()),
            ),
            Err(e) => Err(AppError::SpecificOperationError(e)),
        }
    }

    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, user_name, email, role, is_active
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(current_user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(User::from))
    }

    // ユーザー一覧を条件付きで取得する。search は名前・メールアドレスの部分一致
    async fn find_all(&self, options: UserListOptions) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT user_id, user_name, email, role, is_active
                FROM users
                WHERE ($1::text IS NULL
                       OR user_name ILIKE '%' || $1 || '%'
                       OR email ILIKE '%' || $1 || '%')
                  AND ($2::user_role IS NULL OR role = $2)
                  AND ($3::boolean IS NULL OR is_active = $3)
                ORDER BY created_at DESC
                LIMIT $4 OFFSET $5
            "#,
        )
        .bind(options.search)
        .bind(options.role)
        .bind(options.is_active)
        .bind(options.limit)
        .bind(options.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(User::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn update_password(&self, event: UpdateUserPassword) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 現在のパスワードを照合してから更新する
        let row = sqlx::query_as::<_, UserCredentialRow>(
            r#"
                SELECT user_id, password_hash
                FROM users
                WHERE user_id = $1
                FOR UPDATE
            "#,
        )
        .bind(event.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        let Some(row) = row else {
            return Err(AppError::EntityNotFound(format!(
                "ユーザー（{}）が見つかりませんでした。",
                event.user_id
            )));
        };

        let valid = bcrypt::verify(&event.current_password, &row.password_hash)?;
        if !valid {
            return Err(AppError::UnauthorizedError);
        }

        let new_hash = bcrypt::hash(&event.new_password, bcrypt::DEFAULT_COST)?;
        sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(event.user_id)
            .bind(&new_hash)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 降格によって稼働中の管理者がいなくなる場合は拒否する
        if event.role == Role::Client {
            self.guard_last_active_admin(&mut tx, event.user_id).await?;
        }

        let res = sqlx::query("UPDATE users SET role = $2 WHERE user_id = $1")
            .bind(event.user_id)
            .bind(event.role)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "ユーザー（{}）が見つかりませんでした。",
                event.user_id
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    // 稼働フラグを変更する。無効化で稼働中の管理者がいなくなる場合は拒否する
    async fn update_active(&self, event: UpdateUserActive) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        if !event.is_active {
            self.guard_last_active_admin(&mut tx, event.user_id).await?;
        }

        let res = sqlx::query("UPDATE users SET is_active = $2 WHERE user_id = $1")
            .bind(event.user_id)
            .bind(event.is_active)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "ユーザー（{}）が見つかりませんでした。",
                event.user_id
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn delete(&self, event: DeleteUser) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        self.guard_last_active_admin(&mut tx, event.user_id).await?;

        // 削除は外部キーのカスケードで予約行を消すため、
        // 稼働中の予約ぶんの残枠を先に復元しておく
        sqlx::query(
            r#"
                UPDATE slots AS s
                SET remaining = LEAST(s.capacity, s.remaining + sub.cnt::int)
                FROM (
                    SELECT slot_id, COUNT(*) AS cnt
                    FROM reservations
                    WHERE user_id = $1 AND status = $2
                    GROUP BY slot_id
                ) AS sub
                WHERE s.slot_id = sub.slot_id
            "#,
        )
        .bind(event.user_id)
        .bind(ReservationStatus::Active)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        let res = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(event.user_id)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "ユーザー（{}）が見つかりませんでした。",
                event.user_id
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

impl UserRepositoryImpl {
    // 対象ユーザーが最後の稼働中管理者でないことを確かめる。
    // 管理者テーブル全体をロックして数えることで、並行操作で 0 人になるのを防ぐ
    async fn guard_last_active_admin(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        target_user_id: UserId,
    ) -> AppResult<()> {
        let admins = sqlx::query_scalar::<_, UserId>(
            r#"
                SELECT user_id FROM users
                WHERE role = $1 AND is_active
                FOR UPDATE
            "#,
        )
        .bind(Role::Admin)
        .fetch_all(&mut **tx)
        .await
        .map_err(classify_db_error)?;

        if admins.contains(&target_user_id) && admins.len() <= 1 {
            return Err(AppError::UnprocessableEntity(
                "最後の管理者を削除または降格することはできません。".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reservation::ReservationRepositoryImpl;
    use chrono::{NaiveDate, NaiveTime};
    use kernel::model::id::{FacilityId, SlotId};
    use kernel::model::reservation::event::BookSlot;
    use kernel::repository::reservation::ReservationRepository;

    fn list_options() -> UserListOptions {
        UserListOptions {
            search: None,
            role: None,
            is_active: None,
            limit: 50,
            offset: 0,
        }
    }

    async fn seed_facility_and_slot(
        pool: &sqlx::PgPool,
        capacity: i32,
    ) -> anyhow::Result<(FacilityId, SlotId)> {
        let facility_id = FacilityId::new();
        sqlx::query("INSERT INTO facilities (facility_id, name) VALUES ($1, 'テニスコート A')")
            .bind(facility_id)
            .execute(pool)
            .await?;

        let slot_id = SlotId::new();
        sqlx::query(
            r#"
                INSERT INTO slots
                (slot_id, facility_id, slot_date, starts_at, ends_at, capacity, remaining)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(slot_id)
        .bind(facility_id)
        .bind(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap())
        .bind(NaiveTime::from_hms_opt(10, 0, 0).unwrap())
        .bind(NaiveTime::from_hms_opt(11, 0, 0).unwrap())
        .bind(capacity)
        .execute(pool)
        .await?;

        Ok((facility_id, slot_id))
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn last_admin_cannot_be_demoted_or_deleted(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        // マイグレーションで投入された初期管理者を対象にする
        let admin_id = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM users WHERE email = 'admin@example.com'",
        )
        .fetch_one(&pool)
        .await?;

        let err = repo
            .update_role(UpdateUserRole {
                user_id: admin_id,
                role: Role::Client,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        let err = repo
            .delete(DeleteUser { user_id: admin_id })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        // 管理者がもう一人いれば降格できる
        let second = repo
            .create(CreateUser {
                user_name: "second-admin".into(),
                email: "second-admin@example.com".into(),
                password: "password".into(),
            })
            .await?;
        repo.update_role(UpdateUserRole {
            user_id: second.user_id,
            role: Role::Admin,
        })
        .await?;

        repo.update_role(UpdateUserRole {
            user_id: admin_id,
            role: Role::Client,
        })
        .await?;

        let demoted = repo.find_current_user(admin_id).await?.unwrap();
        assert_eq!(demoted.role, Role::Client);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn duplicate_email_is_rejected(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create(CreateUser {
            user_name: "taro".into(),
            email: "taro@example.com".into(),
            password: "password".into(),
        })
        .await?;

        let err = repo
            .create(CreateUser {
                user_name: "taro2".into(),
                email: "taro@example.com".into(),
                password: "password".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn deleting_user_restores_reserved_capacity(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let users = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let reservations = ReservationRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let (facility_id, slot_id) = seed_facility_and_slot(&pool, 3).await?;

        let user = users
            .create(CreateUser {
                user_name: "taro".into(),
                email: "taro@example.com".into(),
                password: "password".into(),
            })
            .await?;

        reservations
            .book(BookSlot::new(facility_id, slot_id, user.user_id))
            .await?;
        let remaining = sqlx::query_scalar::<_, i32>("SELECT remaining FROM slots WHERE slot_id = $1")
            .bind(slot_id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 2);

        users.delete(DeleteUser { user_id: user.user_id }).await?;

        // 予約行はカスケードで消え、残枠は予約前の値に戻る
        let remaining = sqlx::query_scalar::<_, i32>("SELECT remaining FROM slots WHERE slot_id = $1")
            .bind(slot_id)
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 3);

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations WHERE slot_id = $1",
        )
        .bind(slot_id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(count, 0);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn last_admin_cannot_be_deactivated(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let admin_id = sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM users WHERE email = 'admin@example.com'",
        )
        .fetch_one(&pool)
        .await?;

        let err = repo
            .update_active(UpdateUserActive {
                user_id: admin_id,
                is_active: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        // 一般ユーザーは無効化でき、再度有効化もできる
        let user = repo
            .create(CreateUser {
                user_name: "taro".into(),
                email: "taro@example.com".into(),
                password: "password".into(),
            })
            .await?;
        repo.update_active(UpdateUserActive {
            user_id: user.user_id,
            is_active: false,
        })
        .await?;
        let current = repo.find_current_user(user.user_id).await?.unwrap();
        assert!(!current.is_active);

        repo.update_active(UpdateUserActive {
            user_id: user.user_id,
            is_active: true,
        })
        .await?;
        let current = repo.find_current_user(user.user_id).await?.unwrap();
        assert!(current.is_active);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn user_listing_supports_filters(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let taro = repo
            .create(CreateUser {
                user_name: "taro".into(),
                email: "taro@example.com".into(),
                password: "password".into(),
            })
            .await?;
        repo.create(CreateUser {
            user_name: "hanako".into(),
            email: "hanako@example.com".into(),
            password: "password".into(),
        })
        .await?;
        repo.update_active(UpdateUserActive {
            user_id: taro.user_id,
            is_active: false,
        })
        .await?;

        // 初期管理者を含めて 3 人
        assert_eq!(repo.find_all(list_options()).await?.len(), 3);

        // 部分一致検索
        let found = repo
            .find_all(UserListOptions {
                search: Some("hana".into()),
                ..list_options()
            })
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_name, "hanako");

        // ロールで絞る
        let admins = repo
            .find_all(UserListOptions {
                role: Some(Role::Admin),
                ..list_options()
            })
            .await?;
        assert_eq!(admins.len(), 1);

        // 稼働フラグで絞る
        let inactive = repo
            .find_all(UserListOptions {
                is_active: Some(false),
                ..list_options()
            })
            .await?;
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].user_id, taro.user_id);

        // limit / offset
        let paged = repo
            .find_all(UserListOptions {
                limit: 1,
                offset: 1,
                ..list_options()
            })
            .await?;
        assert_eq!(paged.len(), 1);

        Ok(())
    }
}
