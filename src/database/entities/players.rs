use crate::{database::DbResult, utils::types::PlayerID};
use sea_orm::{entity::prelude::*, ActiveValue::NotSet, DeleteResult};
use serde::Serialize;
use std::future::Future;

/// A single player card, one row per player per game version and update.
///
/// Rows of the same real player are not linked to each other, the pair
/// of `long_name` and `nationality_name` is used to identify them
#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    /// Unique identifier of this card (not of the real player)
    #[sea_orm(primary_key)]
    pub id: PlayerID,
    /// Game version ordinal ("15" to "23")
    pub game_version: String,
    /// Update ordinal within the game version ("1", "2", ...)
    pub game_update: String,
    /// Either "M" or "F"
    pub gender: String,
    pub player_face_url: String,
    pub long_name: String,
    pub short_name: String,
    /// Comma separated list of positions ("ST, CF")
    pub player_positions: String,
    pub club_name: Option<String>,
    pub nationality_name: Option<String>,

    pub overall: i32,
    pub potential: i32,
    pub value_eur: Option<i64>,
    pub wage_eur: Option<i64>,
    pub age: i32,

    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub preferred_foot: Option<String>,
    pub weak_foot: Option<i32>,
    pub skill_moves: Option<i32>,
    pub international_reputation: Option<i32>,
    pub work_rate: Option<String>,
    pub body_type: Option<String>,

    // Face stats, missing for goalkeepers
    pub pace: Option<i32>,
    pub shooting: Option<i32>,
    pub passing: Option<i32>,
    pub dribbling: Option<i32>,
    pub defending: Option<i32>,
    pub physic: Option<i32>,

    pub attacking_crossing: Option<i32>,
    pub attacking_finishing: Option<i32>,
    pub attacking_heading_accuracy: Option<i32>,
    pub attacking_short_passing: Option<i32>,
    pub attacking_volleys: Option<i32>,

    pub skill_dribbling: Option<i32>,
    pub skill_curve: Option<i32>,
    pub skill_fk_accuracy: Option<i32>,
    pub skill_long_passing: Option<i32>,
    pub skill_ball_control: Option<i32>,

    pub movement_acceleration: Option<i32>,
    pub movement_sprint_speed: Option<i32>,
    pub movement_agility: Option<i32>,
    pub movement_reactions: Option<i32>,
    pub movement_balance: Option<i32>,

    pub power_shot_power: Option<i32>,
    pub power_jumping: Option<i32>,
    pub power_stamina: Option<i32>,
    pub power_strength: Option<i32>,
    pub power_long_shots: Option<i32>,

    pub mentality_aggression: Option<i32>,
    pub mentality_interceptions: Option<i32>,
    pub mentality_positioning: Option<i32>,
    pub mentality_vision: Option<i32>,
    pub mentality_penalties: Option<i32>,
    pub mentality_composure: Option<i32>,

    pub defending_marking: Option<i32>,
    pub defending_standing_tackle: Option<i32>,
    pub defending_sliding_tackle: Option<i32>,

    pub goalkeeping_diving: Option<i32>,
    pub goalkeeping_handling: Option<i32>,
    pub goalkeeping_kicking: Option<i32>,
    pub goalkeeping_positioning: Option<i32>,
    pub goalkeeping_reflexes: Option<i32>,
    pub goalkeeping_speed: Option<i32>,

    /// Comma separated list of traits
    pub player_traits: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Finds a player card by its row ID
    ///
    /// `db` The database connection
    /// `id` The ID of the card
    pub fn by_id(
        db: &DatabaseConnection,
        id: PlayerID,
    ) -> impl Future<Output = DbResult<Option<Self>>> + Send + '_ {
        Entity::find_by_id(id).one(db)
    }

    /// Finds every card sharing the provided long name and gender,
    /// across all game versions
    ///
    /// `db`        The database connection
    /// `long_name` The full player name
    /// `gender`    The gender of the cards
    pub fn by_name_and_gender<'a>(
        db: &'a DatabaseConnection,
        long_name: &str,
        gender: &str,
    ) -> impl Future<Output = DbResult<Vec<Self>>> + Send + 'a {
        Entity::find()
            .filter(
                Column::LongName
                    .eq(long_name)
                    .and(Column::Gender.eq(gender)),
            )
            .all(db)
    }

    /// Inserts a new card from the provided active model, any
    /// provided ID is ignored
    ///
    /// `db`    The database connection
    /// `model` The card values to insert
    pub async fn create(db: &DatabaseConnection, mut model: ActiveModel) -> DbResult<Self> {
        model.id = NotSet;
        model.insert(db).await
    }

    /// Deletes the card with the provided ID
    ///
    /// `db` The database connection
    /// `id` The ID of the card to delete
    pub fn delete_by_id(
        db: &DatabaseConnection,
        id: PlayerID,
    ) -> impl Future<Output = DbResult<DeleteResult>> + Send + '_ {
        Entity::delete_by_id(id).exec(db)
    }
}
