use crate::database::{classify_db_error, model::slot::SlotRow, ConnectionPool};
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::model::{
    id::{FacilityId, SlotId},
    reservation::ReservationStatus,
    slot::{
        event::{CreateSlot, DeleteSlot},
        Slot,
    },
};
use kernel::repository::slot::SlotRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct SlotRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl SlotRepository for SlotRepositoryImpl {
    async fn create(&self, event: CreateSlot) -> AppResult<SlotId> {
        let slot_id = SlotId::new();
        // 残枠の初期値は定員と同じ
        let res = sqlx::query(
            r#"
                INSERT INTO slots
                (slot_id, facility_id, slot_date, starts_at, ends_at, capacity, remaining)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(slot_id)
        .bind(event.facility_id)
        .bind(event.slot_date)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.capacity)
        .execute(self.db.inner_ref())
        .await;

        match res {
            Ok(_) => Ok(slot_id),
            // 23505: unique_violation — 同一施設・同一時間帯のスロットがすでに存在する
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23505") => {
                Err(AppError::UnprocessableEntity(format!(
                    "施設（{}）には同一の時間帯のスロットがすでに存在します。",
                    event.facility_id
                )))
            }
            // 23503: foreign_key_violation — 施設が存在しない
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23503") => {
                Err(AppError::EntityNotFound(format!(
                    "施設（{}）が見つかりませんでした。",
                    event.facility_id
                )))
            }
            // 23514: check_violation — 時間帯の前後関係または定員が不正
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some("23514") => {
                Err(AppError::UnprocessableEntity(
                    "開始時刻は終了時刻より前で、定員は 1 以上である必要があります。".into(),
                ))
            }
            Err(e) => Err(AppError::SpecificOperationError(e)),
        }
    }

    async fn find_by_facility_and_date(
        &self,
        facility_id: FacilityId,
        slot_date: NaiveDate,
        only_available: bool,
    ) -> AppResult<Vec<Slot>> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r#"
                SELECT slot_id, facility_id, slot_date, starts_at, ends_at, capacity, remaining
                FROM slots
                WHERE facility_id = $1
                  AND slot_date = $2
                  AND ($3 = false OR remaining > 0)
                ORDER BY starts_at ASC
            "#,
        )
        .bind(facility_id)
        .bind(slot_date)
        .bind(only_available)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Slot::from).collect())
    }

    async fn find_by_id(&self, slot_id: SlotId) -> AppResult<Option<Slot>> {
        let row = sqlx::query_as::<_, SlotRow>(
            r#"
                SELECT slot_id, facility_id, slot_date, starts_at, ends_at, capacity, remaining
                FROM slots
                WHERE slot_id = $1
            "#,
        )
        .bind(slot_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Slot::from))
    }

    // スロットを削除する。稼働中の予約が残っている場合は拒否する
    async fn delete(&self, event: DeleteSlot) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定のスロットが存在し、指定の施設に属しているか
        // - 稼働中の予約が残っていないか
        //
        // スロット行をロックしてから調べることで、チェックと削除の間に
        // 新しい予約が入り込む余地をなくしている
        {
            let slot_row = sqlx::query_scalar::<_, SlotId>(
                r#"
                    SELECT slot_id
                    FROM slots
                    WHERE slot_id = $1 AND facility_id = $2
                    FOR UPDATE
                "#,
            )
            .bind(event.slot_id)
            .bind(event.facility_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(classify_db_error)?;

            if slot_row.is_none() {
                return Err(AppError::EntityNotFound(format!(
                    "スロット（{}）が見つかりませんでした。",
                    event.slot_id
                )));
            }

            let has_active = sqlx::query_scalar::<_, bool>(
                r#"
                    SELECT EXISTS (
                        SELECT 1 FROM reservations
                        WHERE slot_id = $1 AND status = $2
                    )
                "#,
            )
            .bind(event.slot_id)
            .bind(ReservationStatus::Active)
            .fetch_one(&mut *tx)
            .await
            .map_err(classify_db_error)?;

            if has_active {
                return Err(AppError::UnprocessableEntity(format!(
                    "スロット（{}）には稼働中の予約が残っているため削除できません。",
                    event.slot_id
                )));
            }
        }

        let res = sqlx::query("DELETE FROM slots WHERE slot_id = $1")
            .bind(event.slot_id)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No slot record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reservation::ReservationRepositoryImpl;
    use chrono::NaiveTime;
    use kernel::model::id::UserId;
    use kernel::model::reservation::event::{BookSlot, CancelReservation};
    use kernel::model::role::Role;
    use kernel::repository::reservation::ReservationRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    async fn seed_facility(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<FacilityId> {
        let facility_id = FacilityId::new();
        sqlx::query("INSERT INTO facilities (facility_id, name) VALUES ($1, $2)")
            .bind(facility_id)
            .bind(name)
            .execute(pool)
            .await?;
        Ok(facility_id)
    }

    async fn seed_user(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<UserId> {
        let user_id = UserId::new();
        sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role)
                VALUES ($1, $2, $3, 'dummy-hash', $4)
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(format!("{name}@example.com"))
        .bind(Role::Client)
        .execute(pool)
        .await?;
        Ok(user_id)
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn duplicate_window_is_rejected(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = SlotRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let facility_id = seed_facility(&pool, "テニスコート A").await?;

        repo.create(CreateSlot::new(
            facility_id,
            date(2025, 9, 1),
            t(10, 0),
            t(11, 0),
            2,
        ))
        .await?;

        let err = repo
            .create(CreateSlot::new(
                facility_id,
                date(2025, 9, 1),
                t(10, 0),
                t(11, 0),
                4,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        // 別の時間帯なら作成できる
        let slot_id = repo
            .create(CreateSlot::new(
                facility_id,
                date(2025, 9, 1),
                t(11, 0),
                t(12, 0),
                2,
            ))
            .await?;
        let slot = repo.find_by_id(slot_id).await?.unwrap();
        assert_eq!(slot.remaining, 2);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn inverted_window_is_rejected(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = SlotRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let facility_id = seed_facility(&pool, "会議室").await?;

        let err = repo
            .create(CreateSlot::new(
                facility_id,
                date(2025, 9, 1),
                t(12, 0),
                t(11, 0),
                2,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn delete_is_refused_while_reservations_are_active(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let slots = SlotRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let reservations = ReservationRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let facility_id = seed_facility(&pool, "体育館").await?;
        let user_id = seed_user(&pool, "taro").await?;

        let slot_id = slots
            .create(CreateSlot::new(
                facility_id,
                date(2025, 9, 1),
                t(10, 0),
                t(11, 0),
                2,
            ))
            .await?;

        let reservation = reservations
            .book(BookSlot::new(facility_id, slot_id, user_id))
            .await?;

        let err = slots
            .delete(DeleteSlot {
                slot_id,
                facility_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));

        // 予約を取り消せば削除できる
        reservations
            .cancel(CancelReservation::new(reservation.reservation_id, user_id))
            .await?;
        slots
            .delete(DeleteSlot {
                slot_id,
                facility_id,
            })
            .await?;
        assert!(slots.find_by_id(slot_id).await?.is_none());

        Ok(())
    }
}
