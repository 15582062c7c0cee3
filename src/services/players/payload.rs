//! Creation and modification of individual cards

use super::{find_player, version::canonical_ordinal, PlayerQueryError, PlayerQueryResult};
use crate::{
    database::{entities::players, DatabaseConnection},
    utils::types::PlayerID,
};
use log::info;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, IntoActiveModel};
use serde::Deserialize;
use validator::{Validate, ValidationError};

fn validate_ordinal(value: &str) -> Result<(), ValidationError> {
    match canonical_ordinal(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("ordinal")),
    }
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    if matches!(value.trim(), "M" | "m" | "F" | "f") {
        Ok(())
    } else {
        Err(ValidationError::new("gender"))
    }
}

/// Card fields provided when creating or updating a card, fields
/// that are missing are left untouched
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PlayerPayload {
    #[serde(alias = "fifa_version")]
    #[validate(custom(function = "validate_ordinal"))]
    pub game_version: Option<String>,
    #[serde(alias = "fifa_update")]
    #[validate(custom(function = "validate_ordinal"))]
    pub game_update: Option<String>,
    #[validate(custom(function = "validate_gender"))]
    pub gender: Option<String>,
    pub player_face_url: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub long_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub short_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub player_positions: Option<String>,
    pub club_name: Option<String>,
    pub nationality_name: Option<String>,

    #[validate(range(min = 0, max = 100))]
    pub overall: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub potential: Option<i32>,
    #[validate(range(min = 0))]
    pub value_eur: Option<i64>,
    #[validate(range(min = 0))]
    pub wage_eur: Option<i64>,
    #[validate(range(min = 15, max = 50))]
    pub age: Option<i32>,

    #[validate(range(min = 150, max = 220))]
    pub height_cm: Option<i32>,
    #[validate(range(min = 40, max = 120))]
    pub weight_kg: Option<i32>,
    pub preferred_foot: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub weak_foot: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub skill_moves: Option<i32>,
    #[validate(range(min = 1, max = 5))]
    pub international_reputation: Option<i32>,
    pub work_rate: Option<String>,
    pub body_type: Option<String>,

    #[validate(range(min = 0, max = 100))]
    pub pace: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub shooting: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub passing: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub dribbling: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub defending: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub physic: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub attacking_crossing: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub attacking_finishing: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub attacking_heading_accuracy: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub attacking_short_passing: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub attacking_volleys: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub skill_dribbling: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub skill_curve: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub skill_fk_accuracy: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub skill_long_passing: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub skill_ball_control: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub movement_acceleration: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub movement_sprint_speed: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub movement_agility: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub movement_reactions: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub movement_balance: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub power_shot_power: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub power_jumping: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub power_stamina: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub power_strength: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub power_long_shots: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub mentality_aggression: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub mentality_interceptions: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub mentality_positioning: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub mentality_vision: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub mentality_penalties: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub mentality_composure: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub defending_marking: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub defending_standing_tackle: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub defending_sliding_tackle: Option<i32>,

    #[validate(range(min = 0, max = 100))]
    pub goalkeeping_diving: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub goalkeeping_handling: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub goalkeeping_kicking: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub goalkeeping_positioning: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub goalkeeping_reflexes: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub goalkeeping_speed: Option<i32>,

    pub player_traits: Option<String>,
}

/// Moves the provided payload fields onto the model, `required` fields
/// are stored directly while `nullable` fields are stored wrapped in
/// [`Some`]. Evaluates to whether any field was provided
macro_rules! apply_fields {
    ($payload:ident, $model:ident; required: [$($required:ident),*]; nullable: [$($nullable:ident),*]) => {{
        let mut changed = false;
        $(
            if let Some(value) = $payload.$required.take() {
                $model.$required = Set(value);
                changed = true;
            }
        )*
        $(
            if let Some(value) = $payload.$nullable.take() {
                $model.$nullable = Set(Some(value));
                changed = true;
            }
        )*
        changed
    }};
}

impl PlayerPayload {
    fn check(&self) -> PlayerQueryResult<()> {
        self.validate()
            .map_err(|err| PlayerQueryError::InvalidArgument(err.to_string()))
    }

    /// Stores every provided field on the model, ordinals and gender
    /// are stored in their canonical form
    fn apply(mut self, model: &mut players::ActiveModel) -> bool {
        if let Some(gender) = self.gender.as_mut() {
            *gender = gender.trim().to_ascii_uppercase();
        }
        for ordinal in [&mut self.game_version, &mut self.game_update] {
            if let Some(canonical) = ordinal.as_deref().and_then(canonical_ordinal) {
                *ordinal = Some(canonical);
            }
        }

        apply_fields!(
            self, model;
            required: [
                game_version, game_update, gender, player_face_url, long_name, short_name,
                player_positions, overall, potential, age
            ];
            nullable: [
                club_name, nationality_name, value_eur, wage_eur, height_cm, weight_kg,
                preferred_foot, weak_foot, skill_moves, international_reputation, work_rate,
                body_type, pace, shooting, passing, dribbling, defending, physic,
                attacking_crossing, attacking_finishing, attacking_heading_accuracy,
                attacking_short_passing, attacking_volleys, skill_dribbling, skill_curve,
                skill_fk_accuracy, skill_long_passing, skill_ball_control,
                movement_acceleration, movement_sprint_speed, movement_agility,
                movement_reactions, movement_balance, power_shot_power, power_jumping,
                power_stamina, power_strength, power_long_shots, mentality_aggression,
                mentality_interceptions, mentality_positioning, mentality_vision,
                mentality_penalties, mentality_composure, defending_marking,
                defending_standing_tackle, defending_sliding_tackle, goalkeeping_diving,
                goalkeeping_handling, goalkeeping_kicking, goalkeeping_positioning,
                goalkeeping_reflexes, goalkeeping_speed, player_traits
            ]
        )
    }

    /// Converts the payload into a new card, every field without a
    /// database default must be present
    pub fn into_new_card(mut self) -> PlayerQueryResult<players::ActiveModel> {
        self.check()?;

        let required = [
            ("game_version", self.game_version.is_some()),
            ("game_update", self.game_update.is_some()),
            ("gender", self.gender.is_some()),
            ("long_name", self.long_name.is_some()),
            ("player_positions", self.player_positions.is_some()),
            ("overall", self.overall.is_some()),
            ("potential", self.potential.is_some()),
            ("age", self.age.is_some()),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(PlayerQueryError::InvalidArgument(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        if self.short_name.is_none() {
            self.short_name = self.long_name.as_deref().map(short_name_of);
        }
        if self.player_face_url.is_none() {
            self.player_face_url = Some(String::new());
        }

        let mut model = <players::ActiveModel as ActiveModelTrait>::default();
        self.apply(&mut model);
        Ok(model)
    }
}

/// Abbreviates a full name to its first initial and last name
/// ("Lionel Andrés Messi" becomes "L. Messi")
pub fn short_name_of(long_name: &str) -> String {
    let parts: Vec<&str> = long_name.split_whitespace().collect();
    match parts.as_slice() {
        [] => String::new(),
        [single] => single.to_string(),
        [first, .., last] => {
            let initial: String = first.chars().take(1).flat_map(char::to_uppercase).collect();
            format!("{initial}. {last}")
        }
    }
}

/// Creates a new card from the provided payload
///
/// `db`      The database connection
/// `payload` The card values
pub async fn create_player(
    db: &DatabaseConnection,
    payload: PlayerPayload,
) -> PlayerQueryResult<players::Model> {
    let model = payload.into_new_card()?;
    let card = players::Model::create(db, model).await?;
    info!(
        "Created player card {} ({} {}.{})",
        card.id, card.long_name, card.game_version, card.game_update
    );
    Ok(card)
}

/// Updates the provided fields of an existing card
///
/// `db`      The database connection
/// `id`      The ID of the card to update
/// `payload` The fields to change
pub async fn update_player(
    db: &DatabaseConnection,
    id: PlayerID,
    payload: PlayerPayload,
) -> PlayerQueryResult<players::Model> {
    payload.check()?;

    let card = find_player(db, id).await?;
    let mut model = card.into_active_model();
    if !payload.apply(&mut model) {
        return Err(PlayerQueryError::InvalidArgument(
            "No fields provided to update".to_string(),
        ));
    }

    let card = model.update(db).await?;
    info!("Updated player card {}", card.id);
    Ok(card)
}

/// Deletes an existing card
///
/// `db` The database connection
/// `id` The ID of the card to delete
pub async fn delete_player(db: &DatabaseConnection, id: PlayerID) -> PlayerQueryResult<()> {
    let result = players::Model::delete_by_id(db, id).await?;
    if result.rows_affected == 0 {
        return Err(PlayerQueryError::NotFound(id));
    }
    info!("Deleted player card {id}");
    Ok(())
}
