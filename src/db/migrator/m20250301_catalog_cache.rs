use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Actors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Actors::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Actors::Name).string().not_null().default(""))
                    .col(ColumnDef::new(Actors::Avatar).string())
                    .col(ColumnDef::new(Actors::Birthday).string())
                    .col(ColumnDef::new(Actors::Age).string())
                    .col(ColumnDef::new(Actors::Height).string())
                    .col(ColumnDef::new(Actors::Bust).string())
                    .col(ColumnDef::new(Actors::Waistline).string())
                    .col(ColumnDef::new(Actors::Hipline).string())
                    .col(ColumnDef::new(Actors::Birthplace).string())
                    .col(ColumnDef::new(Actors::Hobby).string())
                    .col(ColumnDef::new(Actors::Data).text().not_null())
                    .col(ColumnDef::new(Actors::LastUpdated).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Movies::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Movies::Title).string().not_null().default(""))
                    .col(ColumnDef::new(Movies::Img).string())
                    .col(ColumnDef::new(Movies::Date).string())
                    .col(ColumnDef::new(Movies::Publisher).string())
                    .col(ColumnDef::new(Movies::Data).text().not_null())
                    .col(ColumnDef::new(Movies::LastUpdated).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActorMovie::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ActorMovie::ActorId).string().not_null())
                    .col(ColumnDef::new(ActorMovie::MovieId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ActorMovie::ActorId)
                            .col(ActorMovie::MovieId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SearchHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchHistory::Keyword)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SearchHistory::LastSearch)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_actors_name")
                    .table(Actors::Table)
                    .col(Actors::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_last_updated")
                    .table(Movies::Table)
                    .col(Movies::LastUpdated)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Reverse lookup for orphan detection; (actor_id, movie_id) is the PK.
        manager
            .create_index(
                Index::create()
                    .name("idx_actor_movie_movie_id")
                    .table(ActorMovie::Table)
                    .col(ActorMovie::MovieId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActorMovie::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Actors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Actors {
    Table,
    Id,
    Name,
    Avatar,
    Birthday,
    Age,
    Height,
    Bust,
    Waistline,
    Hipline,
    Birthplace,
    Hobby,
    Data,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    Img,
    Date,
    Publisher,
    Data,
    LastUpdated,
}

#[derive(DeriveIden)]
enum ActorMovie {
    Table,
    ActorId,
    MovieId,
}

#[derive(DeriveIden)]
enum SearchHistory {
    Table,
    Keyword,
    LastSearch,
}
