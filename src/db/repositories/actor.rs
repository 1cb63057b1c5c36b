use crate::entities::{actors, prelude::*};
use crate::models::Actor;
use anyhow::{Context, Result};
use sea_orm::sea_query::{LikeExpr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct ActorRepository {
    conn: DatabaseConnection,
}

impl ActorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Full-record replace; the flat columns are rebuilt from `actor`.
    pub async fn upsert(&self, actor: &Actor, now: i64) -> Result<()> {
        let data = serde_json::to_string(actor).context("Failed to serialize actor")?;

        let model = actors::ActiveModel {
            id: Set(actor.id.clone()),
            name: Set(actor.name.clone()),
            avatar: Set(actor.avatar.clone()),
            birthday: Set(actor.birthday.clone()),
            age: Set(actor.age.clone()),
            height: Set(actor.height.clone()),
            bust: Set(actor.bust.clone()),
            waistline: Set(actor.waistline.clone()),
            hipline: Set(actor.hipline.clone()),
            birthplace: Set(actor.birthplace.clone()),
            hobby: Set(actor.hobby.clone()),
            data: Set(data),
            last_updated: Set(now),
        };

        Actors::insert(model)
            .on_conflict(
                OnConflict::column(actors::Column::Id)
                    .update_columns([
                        actors::Column::Name,
                        actors::Column::Avatar,
                        actors::Column::Birthday,
                        actors::Column::Age,
                        actors::Column::Height,
                        actors::Column::Bust,
                        actors::Column::Waistline,
                        actors::Column::Hipline,
                        actors::Column::Birthplace,
                        actors::Column::Hobby,
                        actors::Column::Data,
                        actors::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn get_fresh(&self, id: &str, cutoff: i64) -> Result<Option<Actor>> {
        let row = Actors::find_by_id(id.to_string())
            .filter(actors::Column::LastUpdated.gte(cutoff))
            .one(&self.conn)
            .await?;

        row.map(|m| decode(&m)).transpose()
    }

    /// Substring match on the name column. SQLite `LIKE` folds ASCII case only.
    pub async fn search_by_name(&self, keyword: &str, cutoff: i64) -> Result<Vec<Actor>> {
        let pattern = format!("%{}%", escape_like(keyword));
        let rows = Actors::find()
            .filter(actors::Column::Name.like(LikeExpr::new(pattern).escape('\\')))
            .filter(actors::Column::LastUpdated.gte(cutoff))
            .all(&self.conn)
            .await?;

        rows.iter().map(decode).collect()
    }
}

/// Make `%`, `_` and the escape character itself match literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn decode(model: &actors::Model) -> Result<Actor> {
    serde_json::from_str(&model.data)
        .with_context(|| format!("Corrupt cached actor record {}", model.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Yua"), "Yua");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
