use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use domains::{Ad, AdFilter, AdRepo, AdStatus, Result};

use super::{db_err, parse_uuid, SqliteStore};

fn map_ad(row: &sqlx::sqlite::SqliteRow) -> Result<Ad> {
    let photos: String = row.try_get("photos").map_err(db_err)?;
    Ok(Ad {
        id: parse_uuid(&row.try_get::<String, _>("id").map_err(db_err)?)?,
        title: row.try_get("title").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        category: row.try_get("category").map_err(db_err)?,
        subcategory: row.try_get("subcategory").map_err(db_err)?,
        price: row.try_get("price").map_err(db_err)?,
        location: row.try_get("location").map_err(db_err)?,
        taluka: row.try_get("taluka").map_err(db_err)?,
        photos: serde_json::from_str(&photos).map_err(db_err)?,
        mobile_number: row.try_get("mobile_number").map_err(db_err)?,
        user_id: parse_uuid(&row.try_get::<String, _>("user_id").map_err(db_err)?)?,
        status: AdStatus::parse(&row.try_get::<String, _>("status").map_err(db_err)?)?,
        rejection_reason: row.try_get("rejection_reason").map_err(db_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(db_err)?,
    })
}

#[async_trait]
impl AdRepo for SqliteStore {
    async fn insert(&self, ad: &Ad) -> Result<()> {
        sqlx::query(
            "INSERT INTO ads (id, title, description, category, subcategory, price, location,
                              taluka, photos, mobile_number, user_id, status, rejection_reason,
                              created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(ad.id.to_string())
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(&ad.category)
        .bind(&ad.subcategory)
        .bind(ad.price)
        .bind(&ad.location)
        .bind(&ad.taluka)
        .bind(serde_json::to_string(&ad.photos).map_err(db_err)?)
        .bind(&ad.mobile_number)
        .bind(ad.user_id.to_string())
        .bind(ad.status.as_str())
        .bind(&ad.rejection_reason)
        .bind(ad.created_at)
        .bind(ad.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Ad>> {
        let row = sqlx::query("SELECT * FROM ads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_ad).transpose()
    }

    async fn update(&self, ad: &Ad) -> Result<()> {
        sqlx::query(
            "UPDATE ads SET title = ?, description = ?, category = ?, subcategory = ?, price = ?,
                            location = ?, taluka = ?, photos = ?, mobile_number = ?, status = ?,
                            rejection_reason = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(&ad.category)
        .bind(&ad.subcategory)
        .bind(ad.price)
        .bind(&ad.location)
        .bind(&ad.taluka)
        .bind(serde_json::to_string(&ad.photos).map_err(db_err)?)
        .bind(&ad.mobile_number)
        .bind(ad.status.as_str())
        .bind(&ad.rejection_reason)
        .bind(ad.updated_at)
        .bind(ad.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_by_status(&self, status: AdStatus, filter: &AdFilter) -> Result<Vec<Ad>> {
        // Two optional filters; keeps the query planner on the status index.
        let rows = sqlx::query(
            "SELECT * FROM ads
             WHERE status = ?
               AND (? IS NULL OR category = ?)
               AND (? IS NULL OR taluka = ?)
             ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .bind(&filter.category)
        .bind(&filter.category)
        .bind(&filter.taluka)
        .bind(&filter.taluka)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(map_ad).collect()
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Ad>> {
        let rows = sqlx::query("SELECT * FROM ads WHERE user_id = ? ORDER BY created_at DESC")
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(map_ad).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: AdStatus,
        rejection_reason: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE ads SET status = ?, rejection_reason = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(rejection_reason)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::tests::{seed_user, store};

    fn sample_ad(owner: Uuid) -> Ad {
        Ad {
            id: Uuid::new_v4(),
            title: "Murrah buffalo".into(),
            description: "Second lactation, 12l per day".into(),
            category: "Livestock".into(),
            subcategory: Some("Buffalo".into()),
            price: 85_000,
            location: "Kopargaon".into(),
            taluka: Some("Kopargaon".into()),
            photos: vec!["/media/aa/bb/one".into()],
            mobile_number: Some("9400000000".into()),
            user_id: owner,
            status: AdStatus::Pending,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_get_round_trip() {
        let store = store().await;
        let owner = seed_user(&store, "owner").await;
        let ad = sample_ad(owner);
        AdRepo::insert(&store, &ad).await.unwrap();

        let loaded = AdRepo::get(&store, ad.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, ad.title);
        assert_eq!(loaded.photos, ad.photos);
        assert_eq!(loaded.status, AdStatus::Pending);
    }

    #[tokio::test]
    async fn status_filter_and_rejection_reason() {
        let store = store().await;
        let owner = seed_user(&store, "owner").await;
        let ad = sample_ad(owner);
        AdRepo::insert(&store, &ad).await.unwrap();

        store
            .set_status(ad.id, AdStatus::Rejected, Some("photo unclear".into()))
            .await
            .unwrap();
        let loaded = AdRepo::get(&store, ad.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, AdStatus::Rejected);
        assert_eq!(loaded.rejection_reason.as_deref(), Some("photo unclear"));

        let approved = store
            .list_by_status(AdStatus::Approved, &AdFilter::default())
            .await
            .unwrap();
        assert!(approved.is_empty());
        let rejected = store
            .list_by_status(AdStatus::Rejected, &AdFilter::default())
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
    }

    #[tokio::test]
    async fn category_and_taluka_filters_narrow_listings() {
        let store = store().await;
        let owner = seed_user(&store, "owner").await;
        let mut a = sample_ad(owner);
        a.status = AdStatus::Approved;
        let mut b = sample_ad(owner);
        b.id = Uuid::new_v4();
        b.category = "Produce".into();
        b.taluka = Some("Rahata".into());
        b.status = AdStatus::Approved;
        AdRepo::insert(&store, &a).await.unwrap();
        AdRepo::insert(&store, &b).await.unwrap();

        let all = store
            .list_by_status(AdStatus::Approved, &AdFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let filter = AdFilter {
            category: Some("Produce".into()),
            taluka: None,
        };
        let produce = store
            .list_by_status(AdStatus::Approved, &filter)
            .await
            .unwrap();
        assert_eq!(produce.len(), 1);
        assert_eq!(produce[0].id, b.id);

        let filter = AdFilter {
            category: None,
            taluka: Some("Kopargaon".into()),
        };
        let local = store
            .list_by_status(AdStatus::Approved, &filter)
            .await
            .unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].id, a.id);
    }
}
