use crate::database::{
    classify_db_error,
    model::reservation::{ReservationRow, ReservationStateRow},
    model::slot::SlotRow,
    ConnectionPool,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use derive_new::new;
use kernel::model::id::{ReservationId, UserId};
use kernel::model::reservation::{
    event::{AdminCancelReservation, BookSlot, CancelReservation},
    Reservation, ReservationListOptions, ReservationSlot, ReservationStatus,
};
use kernel::repository::reservation::ReservationRepository;
use shared::error::{AppError, AppResult};
use std::time::Duration;

// 行ロックの獲得待ちには上限を設ける（無制限にブロックしない）
const SET_LOCK_TIMEOUT: &str = "SET LOCAL lock_timeout = '3s'";
// 一時的な競合（ロック待ちタイムアウト・直列化失敗・デッドロック）の内部リトライ回数
const MAX_TX_RETRIES: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

// 初回実行のあと、最大 MAX_TX_RETRIES 回まで再試行する
fn transient_retry_allowed(attempt: u32) -> bool {
    attempt < MAX_TX_RETRIES
}

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    // 予約操作を行う
    async fn book(&self, event: BookSlot) -> AppResult<Reservation> {
        let mut attempt = 0;
        loop {
            match self.try_book(&event).await {
                Err(AppError::TransientStorageError(e)) if transient_retry_allowed(attempt) => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "retrying book after transient conflict");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                res => return res,
            }
        }
    }

    // 予約者本人による取消操作を行う
    async fn cancel(&self, event: CancelReservation) -> AppResult<()> {
        let mut attempt = 0;
        loop {
            match self.try_cancel(&event).await {
                Err(AppError::TransientStorageError(e)) if transient_retry_allowed(attempt) => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "retrying cancel after transient conflict");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                res => return res,
            }
        }
    }

    // 管理者による取消操作を行う
    async fn admin_cancel(&self, event: AdminCancelReservation) -> AppResult<()> {
        let mut attempt = 0;
        loop {
            match self.try_admin_cancel(&event).await {
                Err(AppError::TransientStorageError(e)) if transient_retry_allowed(attempt) => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "retrying admin cancel after transient conflict");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                res => return res,
            }
        }
    }

    // 指定ユーザーが同日の交差する時間帯に稼働中の予約を持つかを調べる（読み取りのみ）
    async fn has_overlap(
        &self,
        user_id: UserId,
        slot_date: NaiveDate,
        starts_at: NaiveTime,
        ends_at: NaiveTime,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(OVERLAP_EXISTS_SQL)
            .bind(user_id)
            .bind(ReservationStatus::Active)
            .bind(slot_date)
            .bind(starts_at)
            .bind(ends_at)
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }

    // ユーザー ID に紐づく稼働中の予約一覧を取得する
    async fn find_active_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, ReservationRow>(
            r#"
                SELECT
                    r.reservation_id,
                    r.user_id,
                    r.facility_id,
                    r.slot_id,
                    r.status,
                    r.reserved_at,
                    r.cancelled_at,
                    s.slot_date,
                    s.starts_at,
                    s.ends_at
                FROM reservations AS r
                INNER JOIN slots AS s ON r.slot_id = s.slot_id
                WHERE r.user_id = $1 AND r.status = $2
                ORDER BY s.slot_date ASC, s.starts_at ASC
            "#,
        )
        .bind(user_id)
        .bind(ReservationStatus::Active)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Reservation::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    // 予約情報（取消済み含む）を条件付きで取得する。管理画面の一覧用
    async fn find_all(&self, options: ReservationListOptions) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, ReservationRow>(
            r#"
                SELECT
                    r.reservation_id,
                    r.user_id,
                    r.facility_id,
                    r.slot_id,
                    r.status,
                    r.reserved_at,
                    r.cancelled_at,
                    s.slot_date,
                    s.starts_at,
                    s.ends_at
                FROM reservations AS r
                INNER JOIN slots AS s ON r.slot_id = s.slot_id
                WHERE ($1::uuid IS NULL OR r.user_id = $1)
                  AND ($2::uuid IS NULL OR r.facility_id = $2)
                  AND ($3::date IS NULL OR s.slot_date = $3)
                  AND ($4::reservation_status IS NULL OR r.status = $4)
                ORDER BY r.reserved_at DESC
                LIMIT $5 OFFSET $6
            "#,
        )
        .bind(options.user_id)
        .bind(options.facility_id)
        .bind(options.slot_date)
        .bind(options.status)
        .bind(options.limit)
        .bind(options.offset)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Reservation::from).collect())
        .map_err(AppError::SpecificOperationError)
    }
}

const OVERLAP_EXISTS_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1
        FROM reservations AS r
        INNER JOIN slots AS s ON r.slot_id = s.slot_id
        WHERE r.user_id = $1
          AND r.status = $2
          AND s.slot_date = $3
          AND s.starts_at < $5
          AND $4 < s.ends_at
    )
"#;

impl ReservationRepositoryImpl {
    async fn try_book(&self, event: &BookSlot) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;
        self.set_lock_timeout(&mut tx).await?;

        // 同一ユーザーの予約操作をトランザクション終了まで直列化する。
        // スロット行のロックだけでは、別スロット同士の同時予約で
        // 重複チェックがすり抜けるため、ユーザー単位のロックを先に取る
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(event.reserved_by.to_string())
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        // 事前のチェックとして、以下を調べる。
        // - 指定のスロットが存在し、指定の施設に属しているか
        // - 残枠があるか
        // - 同一ユーザーが同日の交差する時間帯に稼働中の予約を持っていないか
        //
        // すべて通過した場合のみ、このブロック以降の書き込みに進む
        let slot = {
            //
            // ① スロットを行ロック付きで取得する。
            //    同一スロットへの Book / Cancel はこのロックで直列化される
            //
            let slot = sqlx::query_as::<_, SlotRow>(
                r#"
                    SELECT slot_id, facility_id, slot_date, starts_at, ends_at, capacity, remaining
                    FROM slots
                    WHERE slot_id = $1
                    FOR UPDATE
                "#,
            )
            .bind(event.slot_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(classify_db_error)?;

            let Some(slot) = slot else {
                return Err(AppError::EntityNotFound(format!(
                    "スロット（{}）が見つかりませんでした。",
                    event.slot_id
                )));
            };

            // 施設 ID の不一致も NotFound として扱う
            // （他施設側にスロットが存在すること自体を応答から漏らさない）
            if slot.facility_id != event.facility_id {
                return Err(AppError::EntityNotFound(format!(
                    "スロット（{}）が見つかりませんでした。",
                    event.slot_id
                )));
            }

            //
            // ② 残枠確認
            //
            if slot.remaining <= 0 {
                return Err(AppError::CapacityExceeded(format!(
                    "スロット（{}）に空きがありません。",
                    event.slot_id
                )));
            }

            //
            // ③ 時間帯の重複確認
            //    交差条件：existing.starts_at < new.ends_at AND new.starts_at < existing.ends_at
            //
            let overlap = sqlx::query_scalar::<_, bool>(OVERLAP_EXISTS_SQL)
                .bind(event.reserved_by)
                .bind(ReservationStatus::Active)
                .bind(slot.slot_date)
                .bind(slot.starts_at)
                .bind(slot.ends_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(classify_db_error)?;

            if overlap {
                return Err(AppError::ScheduleConflict(
                    "同じ日の交差する時間帯にすでに予約があります。".into(),
                ));
            }

            slot
        };

        // 予約レコードの挿入と残枠の減算を同一トランザクションで行う。
        // 両方コミットされるか、どちらも適用されないかのいずれかになる
        let reservation_id = ReservationId::new();
        let reserved_at = Utc::now();
        let res = sqlx::query(
            r#"
                INSERT INTO reservations
                (reservation_id, user_id, facility_id, slot_id, status, reserved_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reservation_id)
        .bind(event.reserved_by)
        .bind(event.facility_id)
        .bind(event.slot_id)
        .bind(ReservationStatus::Active)
        .bind(reserved_at)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been created".into(),
            ));
        }

        let res = sqlx::query("UPDATE slots SET remaining = remaining - 1 WHERE slot_id = $1")
            .bind(event.slot_id)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No slot capacity has been decremented".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(Reservation {
            reservation_id,
            reserved_by: event.reserved_by,
            facility_id: event.facility_id,
            status: ReservationStatus::Active,
            reserved_at,
            cancelled_at: None,
            slot: ReservationSlot {
                slot_id: slot.slot_id,
                slot_date: slot.slot_date,
                starts_at: slot.starts_at,
                ends_at: slot.ends_at,
            },
        })
    }

    async fn try_cancel(&self, event: &CancelReservation) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.set_lock_timeout(&mut tx).await?;

        // ① 予約を行ロック付きで取得する
        let row = self
            .fetch_reservation_state(&mut tx, event.reservation_id)
            .await?;

        let Some(row) = row else {
            return Err(AppError::EntityNotFound(format!(
                "予約（{}）が見つかりませんでした。",
                event.reservation_id
            )));
        };

        // 取消済みの予約は、利用者経路では存在しないものとして扱う
        if row.status == ReservationStatus::Cancelled {
            return Err(AppError::EntityNotFound(format!(
                "予約（{}）が見つかりませんでした。",
                event.reservation_id
            )));
        }

        // ② 所有チェック。他ユーザーの予約は取消できない
        if row.user_id != event.requested_by {
            return Err(AppError::ForbiddenOperation(
                "他のユーザーの予約は取消できません。".into(),
            ));
        }

        self.restore_and_void(&mut tx, &row).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn try_admin_cancel(&self, event: &AdminCancelReservation) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.set_lock_timeout(&mut tx).await?;

        let row = self
            .fetch_reservation_state(&mut tx, event.reservation_id)
            .await?;

        // 冪等：存在しない予約の取消は何もせず成功とする
        let Some(row) = row else {
            return Ok(());
        };

        // 冪等：取消済みの予約をもう一度取り消しても残枠を二重加算しない
        if row.status == ReservationStatus::Cancelled {
            return Ok(());
        }

        // 所有チェックは行わない（管理者経路）
        self.restore_and_void(&mut tx, &row).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn fetch_reservation_state(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        reservation_id: ReservationId,
    ) -> AppResult<Option<ReservationStateRow>> {
        sqlx::query_as::<_, ReservationStateRow>(
            r#"
                SELECT reservation_id, user_id, slot_id, status
                FROM reservations
                WHERE reservation_id = $1
                FOR UPDATE
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(classify_db_error)
    }

    // 残枠の復元と予約の取消を同一トランザクションで行う。
    // 復元後の残枠が定員を超えないよう LEAST でクランプする
    async fn restore_and_void(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        row: &ReservationStateRow,
    ) -> AppResult<()> {
        let res = sqlx::query(
            "UPDATE slots SET remaining = LEAST(capacity, remaining + 1) WHERE slot_id = $1",
        )
        .bind(row.slot_id)
        .execute(&mut **tx)
        .await
        .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No slot capacity has been restored".into(),
            ));
        }

        let res = sqlx::query(
            r#"
                UPDATE reservations
                SET status = $2, cancelled_at = $3
                WHERE reservation_id = $1
            "#,
        )
        .bind(row.reservation_id)
        .bind(ReservationStatus::Cancelled)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .map_err(classify_db_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been cancelled".into(),
            ));
        }

        Ok(())
    }

    async fn set_lock_timeout(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query(SET_LOCK_TIMEOUT)
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}
