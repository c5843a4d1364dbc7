//! Menu Item Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::MenuItem;
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct MenuItemRepository {
    base: BaseRepository,
}

impl MenuItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, item: MenuItem) -> RepoResult<MenuItem> {
        let created: Option<MenuItem> = self.base.db().create("menu_item").content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu item".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<MenuItem> {
        let item: Option<MenuItem> = self.base.db().select(id.clone()).await?;
        item.ok_or_else(|| RepoError::NotFound(format!("Menu item not found: {}", id)))
    }

    pub async fn find_all_available(&self) -> RepoResult<Vec<MenuItem>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM menu_item WHERE is_available = true ORDER BY category, name")
            .await?;
        Ok(result.take(0)?)
    }

    /// Highest-priced available item in a category. Ties break on record id
    /// so concurrent calls pick the same item.
    pub async fn find_priciest_in_category(&self, category: &str) -> RepoResult<Option<MenuItem>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM menu_item \
                 WHERE category = $category AND is_available = true \
                 ORDER BY price DESC, id ASC LIMIT 1",
            )
            .bind(("category", category.to_string()))
            .await?;
        let items: Vec<MenuItem> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Cheapest available item in a category priced strictly under the cap
    pub async fn find_cheapest_under(
        &self,
        category: &str,
        price_cap: f64,
    ) -> RepoResult<Option<MenuItem>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM menu_item \
                 WHERE category = $category AND is_available = true AND price < $cap \
                 ORDER BY price ASC, id ASC LIMIT 1",
            )
            .bind(("category", category.to_string()))
            .bind(("cap", price_cap))
            .await?;
        let items: Vec<MenuItem> = result.take(0)?;
        Ok(items.into_iter().next())
    }
}
