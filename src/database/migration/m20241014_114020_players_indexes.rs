//! Indexes backing the latest version lookups and common filters
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, indexed columns)
const INDEXES: &[(&str, &[Players])] = &[
    ("idx-players-identity", &[Players::LongName, Players::NationalityName]),
    ("idx-players-version", &[Players::GameVersion, Players::GameUpdate]),
    ("idx-players-overall", &[Players::Overall]),
    ("idx-players-gender", &[Players::Gender]),
    ("idx-players-club", &[Players::ClubName]),
    ("idx-players-short-name", &[Players::ShortName]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, columns) in INDEXES {
            let mut index = Index::create();
            index.name(*name).table(Players::Table).if_not_exists();
            for column in *columns {
                index.col(*column);
            }
            manager.create_index(index.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in INDEXES {
            manager
                .drop_index(Index::drop().table(Players::Table).name(*name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden, Clone, Copy)]
enum Players {
    Table,
    LongName,
    NationalityName,
    GameVersion,
    GameUpdate,
    Overall,
    Gender,
    ClubName,
    ShortName,
}
