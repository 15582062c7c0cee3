//! Detailed views of a single card: categorized stats, radar chart
//! values and the evolution of a player across game versions

use super::{find_player, version::VersionKey, PlayerQueryError, PlayerQueryResult};
use crate::{
    database::{entities::players, DatabaseConnection},
    utils::types::PlayerID,
};
use sea_orm::{ModelTrait, Value};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub id: PlayerID,
    pub name: String,
    pub positions: String,
    pub club: Option<String>,
    pub nationality: Option<String>,
    pub overall: i32,
    pub potential: i32,
    pub age: i32,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub preferred_foot: Option<String>,
    pub weak_foot: Option<i32>,
    pub skill_moves: Option<i32>,
    pub work_rate: Option<String>,
    pub body_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketValue {
    pub value_eur: Option<i64>,
    pub wage_eur: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FaceStats {
    pub pace: Option<i32>,
    pub shooting: Option<i32>,
    pub passing: Option<i32>,
    pub dribbling: Option<i32>,
    pub defending: Option<i32>,
    pub physic: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackingStats {
    pub crossing: Option<i32>,
    pub finishing: Option<i32>,
    pub heading_accuracy: Option<i32>,
    pub short_passing: Option<i32>,
    pub volleys: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStats {
    pub dribbling: Option<i32>,
    pub curve: Option<i32>,
    pub fk_accuracy: Option<i32>,
    pub long_passing: Option<i32>,
    pub ball_control: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementStats {
    pub acceleration: Option<i32>,
    pub sprint_speed: Option<i32>,
    pub agility: Option<i32>,
    pub reactions: Option<i32>,
    pub balance: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerStats {
    pub shot_power: Option<i32>,
    pub jumping: Option<i32>,
    pub stamina: Option<i32>,
    pub strength: Option<i32>,
    pub long_shots: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MentalityStats {
    pub aggression: Option<i32>,
    pub interceptions: Option<i32>,
    pub positioning: Option<i32>,
    pub vision: Option<i32>,
    pub penalties: Option<i32>,
    pub composure: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefendingStats {
    pub marking: Option<i32>,
    pub standing_tackle: Option<i32>,
    pub sliding_tackle: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct GoalkeepingStats {
    pub diving: Option<i32>,
    pub handling: Option<i32>,
    pub kicking: Option<i32>,
    pub positioning: Option<i32>,
    pub reflexes: Option<i32>,
    pub speed: Option<i32>,
}

/// The detailed sub-skill categories of a card
#[derive(Debug, Serialize)]
pub struct DetailedStats {
    pub attacking: AttackingStats,
    pub skill: SkillStats,
    pub movement: MovementStats,
    pub power: PowerStats,
    pub mentality: MentalityStats,
    pub defending: DefendingStats,
    pub goalkeeping: GoalkeepingStats,
}

impl DetailedStats {
    /// Collects the categories of a card, with `fill` set missing
    /// values are reported as zero
    fn new(card: &players::Model, fill: bool) -> Self {
        let value = |value: Option<i32>| if fill { value.or(Some(0)) } else { value };

        Self {
            attacking: AttackingStats {
                crossing: value(card.attacking_crossing),
                finishing: value(card.attacking_finishing),
                heading_accuracy: value(card.attacking_heading_accuracy),
                short_passing: value(card.attacking_short_passing),
                volleys: value(card.attacking_volleys),
            },
            skill: SkillStats {
                dribbling: value(card.skill_dribbling),
                curve: value(card.skill_curve),
                fk_accuracy: value(card.skill_fk_accuracy),
                long_passing: value(card.skill_long_passing),
                ball_control: value(card.skill_ball_control),
            },
            movement: MovementStats {
                acceleration: value(card.movement_acceleration),
                sprint_speed: value(card.movement_sprint_speed),
                agility: value(card.movement_agility),
                reactions: value(card.movement_reactions),
                balance: value(card.movement_balance),
            },
            power: PowerStats {
                shot_power: value(card.power_shot_power),
                jumping: value(card.power_jumping),
                stamina: value(card.power_stamina),
                strength: value(card.power_strength),
                long_shots: value(card.power_long_shots),
            },
            mentality: MentalityStats {
                aggression: value(card.mentality_aggression),
                interceptions: value(card.mentality_interceptions),
                positioning: value(card.mentality_positioning),
                vision: value(card.mentality_vision),
                penalties: value(card.mentality_penalties),
                composure: value(card.mentality_composure),
            },
            defending: DefendingStats {
                marking: value(card.defending_marking),
                standing_tackle: value(card.defending_standing_tackle),
                sliding_tackle: value(card.defending_sliding_tackle),
            },
            goalkeeping: GoalkeepingStats {
                diving: value(card.goalkeeping_diving),
                handling: value(card.goalkeeping_handling),
                kicking: value(card.goalkeeping_kicking),
                positioning: value(card.goalkeeping_positioning),
                reflexes: value(card.goalkeeping_reflexes),
                speed: value(card.goalkeeping_speed),
            },
        }
    }
}

/// Categorized view of every stat of a card
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub basic_info: BasicInfo,
    pub market_value: MarketValue,
    pub face_stats: FaceStats,
    #[serde(flatten)]
    pub detailed: DetailedStats,
    pub traits: Vec<String>,
}

/// Splits the comma separated traits of a card
fn split_traits(traits: Option<&str>) -> Vec<String> {
    traits
        .map(|traits| {
            traits
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Loads the categorized stats of the card with the provided ID
///
/// `db` The database connection
/// `id` The ID of the card
pub async fn player_stats(db: &DatabaseConnection, id: PlayerID) -> PlayerQueryResult<PlayerStats> {
    let card = find_player(db, id).await?;
    let detailed = DetailedStats::new(&card, false);

    Ok(PlayerStats {
        basic_info: BasicInfo {
            id: card.id,
            name: card.short_name,
            positions: card.player_positions,
            club: card.club_name,
            nationality: card.nationality_name,
            overall: card.overall,
            potential: card.potential,
            age: card.age,
            height: card.height_cm,
            weight: card.weight_kg,
            preferred_foot: card.preferred_foot,
            weak_foot: card.weak_foot,
            skill_moves: card.skill_moves,
            work_rate: card.work_rate,
            body_type: card.body_type,
        },
        market_value: MarketValue {
            value_eur: card.value_eur,
            wage_eur: card.wage_eur,
        },
        face_stats: FaceStats {
            pace: card.pace,
            shooting: card.shooting,
            passing: card.passing,
            dribbling: card.dribbling,
            defending: card.defending,
            physic: card.physic,
        },
        detailed,
        traits: split_traits(card.player_traits.as_deref()),
    })
}

/// Labels of the radar chart axes, in the order of the values
pub const RADAR_LABELS: [&str; 6] = [
    "Pace",
    "Shooting",
    "Passing",
    "Dribbling",
    "Defending",
    "Physic",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarPlayerInfo {
    pub id: PlayerID,
    pub long_name: String,
    pub short_name: String,
    pub player_face_url: String,
    pub overall: i32,
    pub potential: i32,
    pub age: i32,
    /// Primary position of the card
    pub position: String,
    pub club: String,
    pub game_version: String,
}

#[derive(Debug, Serialize)]
pub struct RadarChart {
    pub labels: [&'static str; 6],
    pub values: [i32; 6],
}

/// Radar chart data of a card
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRadar {
    pub player_info: RadarPlayerInfo,
    pub radar_chart: RadarChart,
    pub detailed_stats: DetailedStats,
}

/// Loads the radar chart data of the card with the provided ID
///
/// `db` The database connection
/// `id` The ID of the card
pub async fn player_radar(db: &DatabaseConnection, id: PlayerID) -> PlayerQueryResult<PlayerRadar> {
    let card = find_player(db, id).await?;
    let detailed_stats = DetailedStats::new(&card, true);

    let position = card
        .player_positions
        .split(',')
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or("N/A")
        .to_string();

    let values = [
        card.pace, card.shooting, card.passing, card.dribbling, card.defending, card.physic,
    ]
    .map(Option::unwrap_or_default);

    Ok(PlayerRadar {
        player_info: RadarPlayerInfo {
            id: card.id,
            long_name: card.long_name,
            short_name: card.short_name,
            player_face_url: card.player_face_url,
            overall: card.overall,
            potential: card.potential,
            age: card.age,
            position,
            club: card.club_name.unwrap_or_else(|| "Free Agent".to_string()),
            game_version: card.game_version,
        },
        radar_chart: RadarChart {
            labels: RADAR_LABELS,
            values,
        },
        detailed_stats,
    })
}

/// Maps the friendly skill names accepted by the timeline onto
/// their columns
pub fn skill_column(skill: &str) -> Option<players::Column> {
    use players::Column;

    let column = match skill.trim().to_ascii_lowercase().as_str() {
        "pace" => Column::Pace,
        "shooting" => Column::Shooting,
        "passing" => Column::Passing,
        "dribbling" => Column::Dribbling,
        "defending" => Column::Defending,
        "physic" => Column::Physic,
        "overall" => Column::Overall,
        "potential" => Column::Potential,
        "crossing" => Column::AttackingCrossing,
        "finishing" => Column::AttackingFinishing,
        "heading" => Column::AttackingHeadingAccuracy,
        "short_passing" => Column::AttackingShortPassing,
        "volleys" => Column::AttackingVolleys,
        "curve" => Column::SkillCurve,
        "fk_accuracy" => Column::SkillFkAccuracy,
        "long_passing" => Column::SkillLongPassing,
        "ball_control" => Column::SkillBallControl,
        "acceleration" => Column::MovementAcceleration,
        "sprint_speed" => Column::MovementSprintSpeed,
        "agility" => Column::MovementAgility,
        "reactions" => Column::MovementReactions,
        "balance" => Column::MovementBalance,
        "shot_power" => Column::PowerShotPower,
        "jumping" => Column::PowerJumping,
        "stamina" => Column::PowerStamina,
        "strength" => Column::PowerStrength,
        "long_shots" => Column::PowerLongShots,
        _ => return None,
    };
    Some(column)
}

/// Reads a numeric stat column from a card, missing values are zero
fn stat_value(card: &players::Model, column: players::Column) -> i32 {
    match card.get(column) {
        Value::Int(Some(value)) => value,
        _ => 0,
    }
}

/// A single version of a player within a skill timeline
#[derive(Debug, Serialize)]
pub struct SkillPoint {
    pub version: String,
    pub update: String,
    pub value: i32,
    pub overall: i32,
}

/// A single version of a player within a full timeline
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub version: String,
    pub update: String,
    pub overall: i32,
    pub potential: i32,
    pub age: i32,
    pub pace: i32,
    pub shooting: i32,
    pub passing: i32,
    pub dribbling: i32,
    pub defending: i32,
    pub physic: i32,
    pub club: Option<String>,
    pub value_eur: Option<i64>,
}

/// Evolution of a player across the game versions
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlayerTimeline {
    /// Evolution of a single skill
    Skill {
        skill: String,
        timeline: Vec<SkillPoint>,
    },
    /// Evolution of the main stats
    #[serde(rename_all = "camelCase")]
    Full {
        player_name: String,
        timeline: Vec<TimelinePoint>,
    },
}

/// Picks the latest update of each version from the provided cards,
/// ordered by version
fn latest_per_version(mut cards: Vec<players::Model>) -> Vec<players::Model> {
    cards.sort_by_key(|card| VersionKey::from(card));

    let mut latest: Vec<players::Model> = Vec::new();
    for card in cards {
        match latest.last_mut() {
            Some(last) if VersionKey::from(&*last).version == VersionKey::from(&card).version => {
                *last = card;
            }
            _ => latest.push(card),
        }
    }
    latest
}

/// Builds the timeline of the player owning the card with the provided
/// ID. Cards are matched by their long name and gender
///
/// `db`    The database connection
/// `id`    The ID of the reference card
/// `skill` Optional friendly skill name to restrict the timeline to
pub async fn player_timeline(
    db: &DatabaseConnection,
    id: PlayerID,
    skill: Option<&str>,
) -> PlayerQueryResult<PlayerTimeline> {
    let skill = match skill {
        Some(skill) => {
            let column = skill_column(skill).ok_or_else(|| {
                PlayerQueryError::InvalidArgument(format!("Unknown timeline skill '{skill}'"))
            })?;
            Some((skill, column))
        }
        None => None,
    };

    let reference = find_player(db, id).await?;
    let cards =
        players::Model::by_name_and_gender(db, &reference.long_name, &reference.gender).await?;
    let cards = latest_per_version(cards);

    let timeline = match skill {
        Some((skill, column)) => PlayerTimeline::Skill {
            skill: skill.to_string(),
            timeline: cards
                .into_iter()
                .map(|card| SkillPoint {
                    value: stat_value(&card, column),
                    overall: card.overall,
                    version: card.game_version,
                    update: card.game_update,
                })
                .collect(),
        },
        None => PlayerTimeline::Full {
            player_name: reference.long_name,
            timeline: cards
                .into_iter()
                .map(|card| TimelinePoint {
                    overall: card.overall,
                    potential: card.potential,
                    age: card.age,
                    pace: card.pace.unwrap_or_default(),
                    shooting: card.shooting.unwrap_or_default(),
                    passing: card.passing.unwrap_or_default(),
                    dribbling: card.dribbling.unwrap_or_default(),
                    defending: card.defending.unwrap_or_default(),
                    physic: card.physic.unwrap_or_default(),
                    club: card.club_name,
                    value_eur: card.value_eur,
                    version: card.game_version,
                    update: card.game_update,
                })
                .collect(),
        },
    };

    Ok(timeline)
}
