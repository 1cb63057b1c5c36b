use crate::entities::{actor_movie, actors, movies, prelude::*};
use anyhow::Result;
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, TransactionTrait,
};
use serde::Serialize;
use tracing::debug;

/// Rows removed by [`MaintenanceRepository::purge_expired`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub actors: u64,
    pub movies: u64,
    pub associations: u64,
}

pub struct MaintenanceRepository {
    conn: DatabaseConnection,
}

impl MaintenanceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Removes the actor and its associations, then every movie left with no
    /// actor at all. Returns the number of movies removed.
    pub async fn delete_actor_cascade(&self, actor_id: &str) -> Result<u64> {
        let txn = self.conn.begin().await?;

        let movie_ids: Vec<String> = ActorMovie::find()
            .select_only()
            .column(actor_movie::Column::MovieId)
            .filter(actor_movie::Column::ActorId.eq(actor_id))
            .into_tuple()
            .all(&txn)
            .await?;

        ActorMovie::delete_many()
            .filter(actor_movie::Column::ActorId.eq(actor_id))
            .exec(&txn)
            .await?;

        Actors::delete_by_id(actor_id.to_string()).exec(&txn).await?;

        let mut removed = 0;
        for movie_id in movie_ids {
            let remaining = ActorMovie::find()
                .filter(actor_movie::Column::MovieId.eq(&movie_id))
                .count(&txn)
                .await?;

            if remaining == 0 {
                removed += Movies::delete_by_id(movie_id).exec(&txn).await?.rows_affected;
            }
        }

        txn.commit().await?;

        debug!(actor_id, orphaned_movies = removed, "Cascade delete finished");
        Ok(removed)
    }

    /// Deletes records with `last_updated` strictly before the cutoffs, then
    /// any association pointing at a record that no longer exists.
    pub async fn purge_expired(&self, actor_cutoff: i64, movie_cutoff: i64) -> Result<PurgeReport> {
        let txn = self.conn.begin().await?;

        let actors = Actors::delete_many()
            .filter(actors::Column::LastUpdated.lt(actor_cutoff))
            .exec(&txn)
            .await?
            .rows_affected;

        let movies = Movies::delete_many()
            .filter(movies::Column::LastUpdated.lt(movie_cutoff))
            .exec(&txn)
            .await?
            .rows_affected;

        let associations = ActorMovie::delete_many()
            .filter(
                Condition::any()
                    .add(
                        actor_movie::Column::ActorId.not_in_subquery(
                            Query::select()
                                .column(actors::Column::Id)
                                .from(actors::Entity)
                                .to_owned(),
                        ),
                    )
                    .add(
                        actor_movie::Column::MovieId.not_in_subquery(
                            Query::select()
                                .column(movies::Column::Id)
                                .from(movies::Entity)
                                .to_owned(),
                        ),
                    ),
            )
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        Ok(PurgeReport {
            actors,
            movies,
            associations,
        })
    }
}
