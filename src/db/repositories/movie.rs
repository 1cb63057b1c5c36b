use crate::entities::{actor_movie, movies, prelude::*};
use crate::models::Movie;
use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::BTreeSet;

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Writes the record and, when it lists any stars, replaces the movie's
    /// association rows in the same transaction.
    pub async fn upsert(&self, movie: &Movie, now: i64) -> Result<()> {
        let txn = self.conn.begin().await?;

        write_row(&txn, movie, now).await?;

        let star_ids: BTreeSet<&str> = movie.star_ids().collect();
        if !star_ids.is_empty() {
            ActorMovie::delete_many()
                .filter(actor_movie::Column::MovieId.eq(&movie.id))
                .exec(&txn)
                .await?;

            let links = star_ids.into_iter().map(|actor_id| actor_movie::ActiveModel {
                actor_id: Set(actor_id.to_string()),
                movie_id: Set(movie.id.clone()),
            });
            ActorMovie::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn get_fresh(&self, id: &str, cutoff: i64) -> Result<Option<Movie>> {
        let row = Movies::find_by_id(id.to_string())
            .filter(movies::Column::LastUpdated.gte(cutoff))
            .one(&self.conn)
            .await?;

        row.map(|m| decode(&m)).transpose()
    }

    /// Fresh movies linked to `actor_id`, newest release first.
    pub async fn list_for_actor(&self, actor_id: &str, cutoff: i64) -> Result<Vec<Movie>> {
        let movie_ids: Vec<String> = ActorMovie::find()
            .select_only()
            .column(actor_movie::Column::MovieId)
            .filter(actor_movie::Column::ActorId.eq(actor_id))
            .into_tuple()
            .all(&self.conn)
            .await?;

        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Movies::find()
            .filter(movies::Column::Id.is_in(movie_ids))
            .filter(movies::Column::LastUpdated.gte(cutoff))
            .order_by_desc(movies::Column::Date)
            .all(&self.conn)
            .await?;

        rows.iter().map(decode).collect()
    }

    /// Most recently written movies, regardless of age.
    pub async fn recent(&self, limit: u64) -> Result<Vec<Movie>> {
        let rows = Movies::find()
            .order_by_desc(movies::Column::LastUpdated)
            .limit(limit)
            .all(&self.conn)
            .await?;

        rows.iter().map(decode).collect()
    }

    /// Merges translated fields into the cached record. `last_updated` is kept
    /// so a translation never extends the record's freshness.
    ///
    /// Returns `false` when the movie is not cached.
    pub async fn update_translation(
        &self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(row) = Movies::find_by_id(id.to_string()).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(false);
        };

        let mut movie = decode(&row)?;
        if let Some(title) = title {
            movie.translated_title = Some(title.to_string());
        }
        if let Some(description) = description {
            movie.translated_description = Some(description.to_string());
        }

        write_row(&txn, &movie, row.last_updated).await?;
        txn.commit().await?;
        Ok(true)
    }
}

async fn write_row<C: ConnectionTrait>(conn: &C, movie: &Movie, last_updated: i64) -> Result<()> {
    let data = serde_json::to_string(movie).context("Failed to serialize movie")?;
    let publisher = Some(movie.publisher_name())
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let model = movies::ActiveModel {
        id: Set(movie.id.clone()),
        title: Set(movie.title.clone()),
        img: Set(movie.img.clone()),
        date: Set(movie.date.clone()),
        publisher: Set(publisher),
        data: Set(data),
        last_updated: Set(last_updated),
    };

    Movies::insert(model)
        .on_conflict(
            OnConflict::column(movies::Column::Id)
                .update_columns([
                    movies::Column::Title,
                    movies::Column::Img,
                    movies::Column::Date,
                    movies::Column::Publisher,
                    movies::Column::Data,
                    movies::Column::LastUpdated,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;

    Ok(())
}

fn decode(model: &movies::Model) -> Result<Movie> {
    serde_json::from_str(&model.data)
        .with_context(|| format!("Corrupt cached movie record {}", model.id))
}
