//! Bulk import of player cards from the public FIFA player CSV dumps

use super::{entities::players, DatabaseConnection, DbErr};
use crate::{config::ImportSource, services::players::version::canonical_ordinal};
use log::{debug, info, warn};
use sea_orm::{ActiveValue::Set, EntityTrait, TransactionTrait};
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

/// Number of cards inserted per statement, keeps the number of bound
/// parameters well below the sqlite variable limit
const INSERT_BATCH_SIZE: usize = 250;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read import file: {0}")]
    IO(#[from] std::io::Error),
    #[error("Failed to read CSV headers: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unknown import gender '{0}', expected M or F")]
    InvalidGender(String),
    #[error("Failed to store imported cards: {0}")]
    Database(#[from] DbErr),
}

/// Raw CSV row, only the columns stored by the server are read and
/// every value is kept as text until converted
#[derive(Debug, Deserialize)]
struct CsvRow {
    fifa_version: Option<String>,
    fifa_update: Option<String>,
    player_face_url: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    player_positions: Option<String>,
    club_name: Option<String>,
    nationality_name: Option<String>,
    overall: Option<String>,
    potential: Option<String>,
    value_eur: Option<String>,
    wage_eur: Option<String>,
    age: Option<String>,
    height_cm: Option<String>,
    weight_kg: Option<String>,
    preferred_foot: Option<String>,
    weak_foot: Option<String>,
    skill_moves: Option<String>,
    international_reputation: Option<String>,
    work_rate: Option<String>,
    body_type: Option<String>,
    pace: Option<String>,
    shooting: Option<String>,
    passing: Option<String>,
    dribbling: Option<String>,
    defending: Option<String>,
    physic: Option<String>,
    attacking_crossing: Option<String>,
    attacking_finishing: Option<String>,
    attacking_heading_accuracy: Option<String>,
    attacking_short_passing: Option<String>,
    attacking_volleys: Option<String>,
    skill_dribbling: Option<String>,
    skill_curve: Option<String>,
    skill_fk_accuracy: Option<String>,
    skill_long_passing: Option<String>,
    skill_ball_control: Option<String>,
    movement_acceleration: Option<String>,
    movement_sprint_speed: Option<String>,
    movement_agility: Option<String>,
    movement_reactions: Option<String>,
    movement_balance: Option<String>,
    power_shot_power: Option<String>,
    power_jumping: Option<String>,
    power_stamina: Option<String>,
    power_strength: Option<String>,
    power_long_shots: Option<String>,
    mentality_aggression: Option<String>,
    mentality_interceptions: Option<String>,
    mentality_positioning: Option<String>,
    mentality_vision: Option<String>,
    mentality_penalties: Option<String>,
    mentality_composure: Option<String>,
    #[serde(alias = "defending_marking_awareness")]
    defending_marking: Option<String>,
    defending_standing_tackle: Option<String>,
    defending_sliding_tackle: Option<String>,
    goalkeeping_diving: Option<String>,
    goalkeeping_handling: Option<String>,
    goalkeeping_kicking: Option<String>,
    goalkeeping_positioning: Option<String>,
    goalkeeping_reflexes: Option<String>,
    goalkeeping_speed: Option<String>,
    player_traits: Option<String>,
}

/// Converts a raw value into text, blank and "null" values are missing
fn text(value: &Option<String>) -> Option<String> {
    let value = value.as_deref()?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(value.to_string())
}

/// Converts a raw value into a whole number. Values carrying a suffix
/// such as "65+2" keep their leading number, anything else that isn't
/// numeric is missing
fn number(value: &Option<String>) -> Option<i64> {
    let value = text(value)?;

    if let Ok(value) = value.parse::<i64>() {
        return Some(value);
    }

    if let Ok(value) = value.parse::<f64>() {
        return value.is_finite().then_some(value.trunc() as i64);
    }

    let end = value
        .char_indices()
        .find(|(index, char)| !(char.is_ascii_digit() || (*index == 0 && *char == '-')))
        .map(|(index, _)| index)
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// Converts a raw version or update into its canonical stored form
fn ordinal(value: &Option<String>) -> Option<String> {
    text(value).as_deref().and_then(canonical_ordinal)
}

fn stat(value: &Option<String>) -> Option<i32> {
    number(value).and_then(|value| i32::try_from(value).ok())
}

impl CsvRow {
    /// Converts the row into a card, rows missing any of the required
    /// values produce the name of the first missing column
    fn into_model(self, gender: &str) -> Result<players::ActiveModel, &'static str> {
        let game_version = ordinal(&self.fifa_version).ok_or("fifa_version")?;
        let game_update = ordinal(&self.fifa_update).ok_or("fifa_update")?;
        let long_name = text(&self.long_name).ok_or("long_name")?;
        let short_name = text(&self.short_name).ok_or("short_name")?;
        let player_positions = text(&self.player_positions).ok_or("player_positions")?;
        let overall = stat(&self.overall).ok_or("overall")?;
        let potential = stat(&self.potential).ok_or("potential")?;
        let age = stat(&self.age).ok_or("age")?;

        Ok(players::ActiveModel {
            game_version: Set(game_version),
            game_update: Set(game_update),
            gender: Set(gender.to_string()),
            player_face_url: Set(text(&self.player_face_url).unwrap_or_default()),
            long_name: Set(long_name),
            short_name: Set(short_name),
            player_positions: Set(player_positions),
            club_name: Set(text(&self.club_name)),
            nationality_name: Set(text(&self.nationality_name)),
            overall: Set(overall),
            potential: Set(potential),
            value_eur: Set(number(&self.value_eur)),
            wage_eur: Set(number(&self.wage_eur)),
            age: Set(age),
            height_cm: Set(stat(&self.height_cm)),
            weight_kg: Set(stat(&self.weight_kg)),
            preferred_foot: Set(text(&self.preferred_foot)),
            weak_foot: Set(stat(&self.weak_foot)),
            skill_moves: Set(stat(&self.skill_moves)),
            international_reputation: Set(stat(&self.international_reputation)),
            work_rate: Set(text(&self.work_rate)),
            body_type: Set(text(&self.body_type)),
            pace: Set(stat(&self.pace)),
            shooting: Set(stat(&self.shooting)),
            passing: Set(stat(&self.passing)),
            dribbling: Set(stat(&self.dribbling)),
            defending: Set(stat(&self.defending)),
            physic: Set(stat(&self.physic)),
            attacking_crossing: Set(stat(&self.attacking_crossing)),
            attacking_finishing: Set(stat(&self.attacking_finishing)),
            attacking_heading_accuracy: Set(stat(&self.attacking_heading_accuracy)),
            attacking_short_passing: Set(stat(&self.attacking_short_passing)),
            attacking_volleys: Set(stat(&self.attacking_volleys)),
            skill_dribbling: Set(stat(&self.skill_dribbling)),
            skill_curve: Set(stat(&self.skill_curve)),
            skill_fk_accuracy: Set(stat(&self.skill_fk_accuracy)),
            skill_long_passing: Set(stat(&self.skill_long_passing)),
            skill_ball_control: Set(stat(&self.skill_ball_control)),
            movement_acceleration: Set(stat(&self.movement_acceleration)),
            movement_sprint_speed: Set(stat(&self.movement_sprint_speed)),
            movement_agility: Set(stat(&self.movement_agility)),
            movement_reactions: Set(stat(&self.movement_reactions)),
            movement_balance: Set(stat(&self.movement_balance)),
            power_shot_power: Set(stat(&self.power_shot_power)),
            power_jumping: Set(stat(&self.power_jumping)),
            power_stamina: Set(stat(&self.power_stamina)),
            power_strength: Set(stat(&self.power_strength)),
            power_long_shots: Set(stat(&self.power_long_shots)),
            mentality_aggression: Set(stat(&self.mentality_aggression)),
            mentality_interceptions: Set(stat(&self.mentality_interceptions)),
            mentality_positioning: Set(stat(&self.mentality_positioning)),
            mentality_vision: Set(stat(&self.mentality_vision)),
            mentality_penalties: Set(stat(&self.mentality_penalties)),
            mentality_composure: Set(stat(&self.mentality_composure)),
            defending_marking: Set(stat(&self.defending_marking)),
            defending_standing_tackle: Set(stat(&self.defending_standing_tackle)),
            defending_sliding_tackle: Set(stat(&self.defending_sliding_tackle)),
            goalkeeping_diving: Set(stat(&self.goalkeeping_diving)),
            goalkeeping_handling: Set(stat(&self.goalkeeping_handling)),
            goalkeeping_kicking: Set(stat(&self.goalkeeping_kicking)),
            goalkeeping_positioning: Set(stat(&self.goalkeeping_positioning)),
            goalkeeping_reflexes: Set(stat(&self.goalkeeping_reflexes)),
            goalkeeping_speed: Set(stat(&self.goalkeeping_speed)),
            player_traits: Set(text(&self.player_traits)),
            ..Default::default()
        })
    }
}

/// Imports every card from the CSV file of the provided source,
/// returning the number of cards stored
///
/// `db`     The database connection
/// `source` The file and the gender of its cards
pub async fn import_file(db: &DatabaseConnection, source: &ImportSource) -> Result<usize, ImportError> {
    info!("Importing players from {}", source.path.display());
    let contents = tokio::fs::read(&source.path).await?;
    import_reader(db, contents.as_slice(), &source.gender).await
}

/// Imports every card from the provided CSV data
///
/// `db`     The database connection
/// `reader` The CSV data including its header row
/// `gender` The gender of every card in the data
pub async fn import_reader<R: Read>(
    db: &DatabaseConnection,
    reader: R,
    gender: &str,
) -> Result<usize, ImportError> {
    let gender = match gender.trim().to_ascii_uppercase().as_str() {
        "M" | "MALE" => "M",
        "F" | "FEMALE" => "F",
        _ => return Err(ImportError::InvalidGender(gender.to_string())),
    };

    let models = read_models(reader, gender)?;
    let total = models.len();

    let transaction = db.begin().await?;
    for (index, batch) in models.chunks(INSERT_BATCH_SIZE).enumerate() {
        players::Entity::insert_many(batch.iter().cloned())
            .exec(&transaction)
            .await?;
        debug!(
            "Imported player batch {} ({} / {})",
            index + 1,
            index * INSERT_BATCH_SIZE + batch.len(),
            total
        );
    }
    transaction.commit().await?;

    Ok(total)
}

/// Reads the cards from the CSV data skipping malformed or
/// incomplete rows
fn read_models<R: Read>(reader: R, gender: &str) -> Result<Vec<players::ActiveModel>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    // Fail early on unreadable headers rather than skipping every row
    reader.headers()?;

    let mut models = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Row numbers are reported one based after the header
        let line = index + 2;

        let row = match result {
            Ok(value) => value,
            Err(err) => {
                warn!("Skipping malformed player row {line}: {err}");
                skipped += 1;
                continue;
            }
        };

        match row.into_model(gender) {
            Ok(model) => models.push(model),
            Err(column) => {
                warn!("Skipping player row {line} with a missing or invalid {column}");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} player rows while importing");
    }

    Ok(models)
}

#[cfg(test)]
mod test {
    use super::{import_reader, number, ordinal, ImportError};
    use crate::database::{entities::players, seed::memory_database};
    use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};

    const SAMPLE: &str = "\
player_id,fifa_version,fifa_update,short_name,long_name,player_positions,overall,potential,value_eur,age,club_name,nationality_name,pace,defending_marking_awareness,player_traits,player_face_url
158023,023,01,L. Messi,Lionel Andrés Messi Cuccittini,\"RW, ST\",91,91,54000000,35,Paris Saint Germain,Argentina,81,20,\"Finesse Shot, Playmaker\",https://cdn.example/158023.png
20801,23,1,Cristiano Ronaldo,Cristiano Ronaldo dos Santos Aveiro,ST,90,90,null,37,,Portugal,,24,,
1,23,1,Broken,,ST,50,60,,20,,,,,,
190871,23,2,Neymar Jr,Neymar da Silva Santos Júnior,\"LW, CAM\",89+1,89,abc,30,Paris Saint Germain,Brazil,87,,,
";

    #[test]
    fn test_number_parsing() {
        assert_eq!(number(&Some("91".to_string())), Some(91));
        assert_eq!(number(&Some(" 65+2 ".to_string())), Some(65));
        assert_eq!(number(&Some("1.5e7".to_string())), Some(15_000_000));
        assert_eq!(number(&Some("NULL".to_string())), None);
        assert_eq!(number(&Some("abc".to_string())), None);
        assert_eq!(number(&None), None);
    }

    #[test]
    fn test_ordinal_parsing() {
        assert_eq!(ordinal(&Some(" 02 ".to_string())).as_deref(), Some("2"));
        assert_eq!(ordinal(&Some("23".to_string())).as_deref(), Some("23"));
        assert_eq!(ordinal(&Some("23.5".to_string())), None);
        assert_eq!(ordinal(&Some("null".to_string())), None);
    }

    #[tokio::test]
    async fn test_import_rows() {
        let db = memory_database().await;

        let imported = import_reader(&db, SAMPLE.as_bytes(), "m").await.unwrap();
        // The row without a long name is skipped
        assert_eq!(imported, 3);

        let cards = players::Entity::find()
            .order_by_asc(players::Column::Id)
            .all(&db)
            .await
            .unwrap();
        assert_eq!(cards.len(), 3);

        let messi = &cards[0];
        assert_eq!(messi.gender, "M");
        assert_eq!(messi.game_version, "23");
        assert_eq!(messi.game_update, "1");
        assert_eq!(messi.player_positions, "RW, ST");
        assert_eq!(messi.value_eur, Some(54_000_000));
        assert_eq!(messi.defending_marking, Some(20));
        assert_eq!(messi.player_traits.as_deref(), Some("Finesse Shot, Playmaker"));

        let ronaldo = &cards[1];
        assert_eq!(ronaldo.club_name, None);
        assert_eq!(ronaldo.value_eur, None);
        assert_eq!(ronaldo.pace, None);
        assert_eq!(ronaldo.player_face_url, "");

        let neymar = &cards[2];
        assert_eq!(neymar.overall, 89);
        assert_eq!(neymar.value_eur, None);
        assert_eq!(neymar.game_update, "2");
    }

    #[tokio::test]
    async fn test_import_batches() {
        let db = memory_database().await;

        let mut data = String::from(
            "fifa_version,fifa_update,short_name,long_name,player_positions,overall,potential,age\n",
        );
        for index in 0..600 {
            data.push_str(&format!("22,1,P. {index},Player {index},CB,70,75,24\n"));
        }

        let imported = import_reader(&db, data.as_bytes(), "F").await.unwrap();
        assert_eq!(imported, 600);
        assert_eq!(players::Entity::find().count(&db).await.unwrap(), 600);
    }

    #[tokio::test]
    async fn test_invalid_gender() {
        let db = memory_database().await;
        let result = import_reader(&db, SAMPLE.as_bytes(), "X").await;
        assert!(matches!(result, Err(ImportError::InvalidGender(_))));
    }
}
