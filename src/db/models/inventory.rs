//! Classifications and vehicle inventory.

use sqlx::FromRow;

use crate::db::DbPool;

#[derive(Debug, Clone, FromRow)]
pub struct Classification {
    pub classification_id: i64,
    pub classification_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Vehicle {
    pub inv_id: i64,
    pub classification_id: i64,
    pub inv_make: String,
    pub inv_model: String,
    pub inv_year: i64,
    pub inv_description: String,
    pub inv_image: String,
    pub inv_thumbnail: String,
    pub inv_price: f64,
    pub inv_miles: i64,
    pub inv_color: String,
}

pub struct NewVehicle<'a> {
    pub classification_id: i64,
    pub make: &'a str,
    pub model: &'a str,
    pub year: i64,
    pub description: &'a str,
    pub image: &'a str,
    pub thumbnail: &'a str,
    pub price: f64,
    pub miles: i64,
    pub color: &'a str,
}

#[derive(Clone)]
pub struct InventoryStore {
    pool: DbPool,
}

impl InventoryStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All classifications, ordered by name. Drives the site nav, so a
    /// store failure degrades to an empty list rather than a 500.
    pub async fn classifications(&self) -> Vec<Classification> {
        sqlx::query_as::<_, Classification>(
            "SELECT * FROM classifications ORDER BY classification_name",
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Classification list failed: {}", e);
            Vec::new()
        })
    }

    pub async fn classification_by_id(&self, classification_id: i64) -> Option<Classification> {
        sqlx::query_as::<_, Classification>(
            "SELECT * FROM classifications WHERE classification_id = ?",
        )
        .bind(classification_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Classification lookup failed: {}", e);
            None
        })
    }

    pub async fn classification_by_name(&self, name: &str) -> Option<Classification> {
        sqlx::query_as::<_, Classification>(
            "SELECT * FROM classifications WHERE classification_name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Classification lookup by name failed: {}", e);
            None
        })
    }

    pub async fn add_classification(&self, name: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO classifications (classification_name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn vehicles_by_classification(&self, classification_id: i64) -> Vec<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM inventory WHERE classification_id = ? ORDER BY inv_make, inv_model",
        )
        .bind(classification_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Vehicle list failed: {}", e);
            Vec::new()
        })
    }

    pub async fn vehicle_by_id(&self, inv_id: i64) -> Option<Vehicle> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM inventory WHERE inv_id = ?")
            .bind(inv_id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Vehicle lookup failed: {}", e);
                None
            })
    }

    pub async fn add_vehicle(&self, new: NewVehicle<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO inventory (
                classification_id, inv_make, inv_model, inv_year, inv_description,
                inv_image, inv_thumbnail, inv_price, inv_miles, inv_color
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.classification_id)
        .bind(new.make)
        .bind(new.model)
        .bind(new.year)
        .bind(new.description)
        .bind(new.image)
        .bind(new.thumbnail)
        .bind(new.price)
        .bind(new.miles)
        .bind(new.color)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_vehicle(
        &self,
        inv_id: i64,
        new: NewVehicle<'_>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE inventory SET
                classification_id = ?, inv_make = ?, inv_model = ?, inv_year = ?,
                inv_description = ?, inv_image = ?, inv_thumbnail = ?, inv_price = ?,
                inv_miles = ?, inv_color = ?
            WHERE inv_id = ?
            "#,
        )
        .bind(new.classification_id)
        .bind(new.make)
        .bind(new.model)
        .bind(new.year)
        .bind(new.description)
        .bind(new.image)
        .bind(new.thumbnail)
        .bind(new.price)
        .bind(new.miles)
        .bind(new.color)
        .bind(inv_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_vehicle(&self, inv_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM inventory WHERE inv_id = ?")
            .bind(inv_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn coupe(classification_id: i64) -> NewVehicle<'static> {
        NewVehicle {
            classification_id,
            make: "Aldo",
            model: "Meridian",
            year: 2021,
            description: "Low mileage, one owner, garage kept.",
            image: "/images/vehicles/meridian.jpg",
            thumbnail: "/images/vehicles/meridian-tn.jpg",
            price: 23950.0,
            miles: 18500,
            color: "Silver",
        }
    }

    #[tokio::test]
    async fn seeded_classifications_present() {
        let store = InventoryStore::new(test_pool().await);
        let names: Vec<String> = store
            .classifications()
            .await
            .into_iter()
            .map(|c| c.classification_name)
            .collect();
        assert!(names.contains(&"Sedan".to_string()));
        assert!(names.contains(&"Truck".to_string()));
    }

    #[tokio::test]
    async fn vehicle_crud_roundtrip() {
        let store = InventoryStore::new(test_pool().await);
        let class_id = store.add_classification("Coupe").await.unwrap();

        let inv_id = store.add_vehicle(coupe(class_id)).await.unwrap();
        let vehicle = store.vehicle_by_id(inv_id).await.unwrap();
        assert_eq!(vehicle.inv_make, "Aldo");
        assert_eq!(vehicle.inv_year, 2021);

        let listed = store.vehicles_by_classification(class_id).await;
        assert_eq!(listed.len(), 1);

        let mut edit = coupe(class_id);
        edit.color = "Black";
        assert!(store.update_vehicle(inv_id, edit).await.unwrap());
        assert_eq!(store.vehicle_by_id(inv_id).await.unwrap().inv_color, "Black");

        assert!(store.delete_vehicle(inv_id).await.unwrap());
        assert!(store.vehicle_by_id(inv_id).await.is_none());
        assert!(!store.delete_vehicle(inv_id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_classification_rejected() {
        let store = InventoryStore::new(test_pool().await);
        store.add_classification("Roadster").await.unwrap();
        let err = store.add_classification("Roadster").await.unwrap_err();
        assert!(crate::db::is_unique_violation(&err));
        assert!(store.classification_by_name("Roadster").await.is_some());
    }
}
