use crate::entities::{prelude::*, search_history};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

pub struct SearchHistoryRepository {
    conn: DatabaseConnection,
}

impl SearchHistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(&self, keyword: &str, now: i64) -> Result<()> {
        SearchHistory::insert(search_history::ActiveModel {
            keyword: Set(keyword.to_string()),
            last_search: Set(now),
        })
        .on_conflict(
            OnConflict::column(search_history::Column::Keyword)
                .update_column(search_history::Column::LastSearch)
                .to_owned(),
        )
        .exec(&self.conn)
        .await?;

        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<String>> {
        let keywords = SearchHistory::find()
            .select_only()
            .column(search_history::Column::Keyword)
            .order_by_desc(search_history::Column::LastSearch)
            .limit(limit)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(keywords)
    }
}
