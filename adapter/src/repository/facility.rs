use crate::database::{model::facility::FacilityRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    facility::{
        event::{CreateFacility, DeleteFacility, UpdateFacility},
        Facility,
    },
    id::FacilityId,
};
use kernel::repository::facility::FacilityRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct FacilityRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl FacilityRepository for FacilityRepositoryImpl {
    async fn create(&self, event: CreateFacility) -> AppResult<FacilityId> {
        let facility_id = FacilityId::new();
        sqlx::query(
            r#"
                INSERT INTO facilities (facility_id, name, category, capacity_hint, is_active)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(facility_id)
        .bind(&event.name)
        .bind(&event.category)
        .bind(event.capacity_hint)
        .bind(event.is_active)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(facility_id)
    }

    async fn find_all(&self, only_active: bool) -> AppResult<Vec<Facility>> {
        let rows = sqlx::query_as::<_, FacilityRow>(
            r#"
                SELECT facility_id, name, category, capacity_hint, is_active
                FROM facilities
                WHERE ($1 = false OR is_active)
                ORDER BY created_at DESC
            "#,
        )
        .bind(only_active)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Facility::from).collect())
    }

    async fn find_by_id(&self, facility_id: FacilityId) -> AppResult<Option<Facility>> {
        let row = sqlx::query_as::<_, FacilityRow>(
            r#"
                SELECT facility_id, name, category, capacity_hint, is_active
                FROM facilities
                WHERE facility_id = $1
            "#,
        )
        .bind(facility_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Facility::from))
    }

    // None のフィールドは COALESCE で現状維持とする
    async fn update(&self, event: UpdateFacility) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE facilities
                SET
                    name = COALESCE($2, name),
                    category = COALESCE($3, category),
                    capacity_hint = COALESCE($4, capacity_hint),
                    is_active = COALESCE($5, is_active)
                WHERE facility_id = $1
            "#,
        )
        .bind(event.facility_id)
        .bind(&event.name)
        .bind(&event.category)
        .bind(event.capacity_hint)
        .bind(event.is_active)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "施設（{}）が見つかりませんでした。",
                event.facility_id
            )));
        }

        Ok(())
    }

    // 施設の削除。配下のスロット・予約は外部キーのカスケードで一緒に消える
    async fn delete(&self, event: DeleteFacility) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM facilities WHERE facility_id = $1")
            .bind(event.facility_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "施設（{}）が見つかりませんでした。",
                event.facility_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../migrations")]
    async fn test_register_facility(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = FacilityRepositoryImpl::new(ConnectionPool::new(pool));

        let facility = CreateFacility {
            name: "テニスコート A".into(),
            category: Some("tennis".into()),
            capacity_hint: Some(4),
            is_active: true,
        };

        let facility_id = repo.create(facility).await?;

        let res = repo.find_all(true).await?;
        assert_eq!(res.len(), 1);

        let res = repo.find_by_id(facility_id).await?;
        assert!(res.is_some());

        let Facility {
            facility_id: id,
            name,
            category,
            capacity_hint,
            is_active,
        } = res.unwrap();
        assert_eq!(id, facility_id);
        assert_eq!(name, "テニスコート A");
        assert_eq!(category.as_deref(), Some("tennis"));
        assert_eq!(capacity_hint, Some(4));
        assert!(is_active);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn deactivated_facility_is_filtered(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = FacilityRepositoryImpl::new(ConnectionPool::new(pool));

        let facility_id = repo
            .create(CreateFacility {
                name: "プール".into(),
                category: None,
                capacity_hint: None,
                is_active: true,
            })
            .await?;

        repo.update(UpdateFacility {
            facility_id,
            name: None,
            category: None,
            capacity_hint: None,
            is_active: Some(false),
        })
        .await?;

        assert!(repo.find_all(true).await?.is_empty());
        assert_eq!(repo.find_all(false).await?.len(), 1);

        Ok(())
    }
}
