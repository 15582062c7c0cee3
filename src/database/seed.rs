use super::{
    entities::players::{self, ActiveModel as PlayerActiveModel},
    migration::{Migrator, MigratorTrait},
    DatabaseConnection,
};
use rand::{distributions::Uniform, Rng};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ConnectOptions, Database, EntityTrait, TransactionTrait,
};

/// Creates a fresh in-memory database with the migrations applied.
///
/// The pool is limited to a single connection as every new sqlite
/// memory connection would otherwise get its own empty database
pub async fn memory_database() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to migrate memory database");
    db
}

/// Builder for a single player card with sensible defaults for
/// every required field
pub struct CardBuilder(PlayerActiveModel);

/// Starts building a card for the provided identity and version
pub fn card(
    long_name: &str,
    nationality_name: Option<&str>,
    game_version: &str,
    game_update: &str,
) -> CardBuilder {
    CardBuilder(PlayerActiveModel {
        id: NotSet,
        game_version: Set(game_version.to_string()),
        game_update: Set(game_update.to_string()),
        gender: Set("M".to_string()),
        player_face_url: Set(String::new()),
        long_name: Set(long_name.to_string()),
        short_name: Set(long_name.to_string()),
        player_positions: Set("CM".to_string()),
        club_name: Set(None),
        nationality_name: Set(nationality_name.map(str::to_string)),
        overall: Set(75),
        potential: Set(80),
        age: Set(25),
        ..Default::default()
    })
}

impl CardBuilder {
    pub fn overall(mut self, value: i32) -> Self {
        self.0.overall = Set(value);
        self
    }

    pub fn potential(mut self, value: i32) -> Self {
        self.0.potential = Set(value);
        self
    }

    pub fn age(mut self, value: i32) -> Self {
        self.0.age = Set(value);
        self
    }

    pub fn gender(mut self, value: &str) -> Self {
        self.0.gender = Set(value.to_string());
        self
    }

    pub fn short_name(mut self, value: &str) -> Self {
        self.0.short_name = Set(value.to_string());
        self
    }

    pub fn club(mut self, value: &str) -> Self {
        self.0.club_name = Set(Some(value.to_string()));
        self
    }

    pub fn positions(mut self, value: &str) -> Self {
        self.0.player_positions = Set(value.to_string());
        self
    }

    pub fn pace(mut self, value: i32) -> Self {
        self.0.pace = Set(Some(value));
        self
    }

    pub fn traits(mut self, value: &str) -> Self {
        self.0.player_traits = Set(Some(value.to_string()));
        self
    }

    /// Fills every face stat with a random value
    pub fn random_face_stats<R: Rng>(mut self, rng: &mut R) -> Self {
        let sample = Uniform::new_inclusive(30, 99);
        self.0.pace = Set(Some(rng.sample(sample)));
        self.0.shooting = Set(Some(rng.sample(sample)));
        self.0.passing = Set(Some(rng.sample(sample)));
        self.0.dribbling = Set(Some(rng.sample(sample)));
        self.0.defending = Set(Some(rng.sample(sample)));
        self.0.physic = Set(Some(rng.sample(sample)));
        self
    }
}

/// Inserts all the provided cards in order, the IDs of the cards
/// follow the iteration order
pub async fn insert_cards<I>(db: &DatabaseConnection, cards: I)
where
    I: IntoIterator<Item = CardBuilder>,
{
    let transaction = db.begin().await.expect("Failed to start seed transaction");
    for card in cards {
        players::Entity::insert(card.0)
            .exec(&transaction)
            .await
            .expect("Failed to insert seed card");
    }
    transaction
        .commit()
        .await
        .expect("Failed to commit seed cards");
}

/// Number of distinct players created by the database seed
const SEED_PLAYERS_COUNT: u32 = 2_000;

/// Seeds a database file with random players spread across several
/// game versions, useful for trying out the listing endpoints.
///
/// Run with `FSS_SEED_DATABASE=data/app.db cargo test seed -- --ignored`
#[tokio::test]
#[ignore]
pub async fn seed() {
    let path = std::env::var("FSS_SEED_DATABASE").unwrap_or_else(|_| "data/app.db".to_string());
    let db = super::connect_database(&path).await;

    let mut rng = rand::thread_rng();
    let overall_sample = Uniform::new_inclusive(45, 94);
    let age_sample = Uniform::new_inclusive(16, 40);
    let update_sample = Uniform::new_inclusive(1, 12);

    const POSITIONS: &[&str] = &["ST", "CF, ST", "LW, RW", "CAM", "CM, CDM", "CB", "LB", "GK"];
    const NATIONS: &[&str] = &["Argentina", "Brazil", "England", "France", "Germany", "Spain"];

    let mut cards = Vec::new();
    for index in 0..SEED_PLAYERS_COUNT {
        let name = format!("Seed Player {index}");
        let nation = NATIONS[index as usize % NATIONS.len()];
        let position = POSITIONS[index as usize % POSITIONS.len()];
        let gender = if index % 4 == 0 { "F" } else { "M" };
        let age: i32 = rng.sample(age_sample);

        for version in 20..=23 {
            let overall: i32 = rng.sample(overall_sample);
            let update: u32 = rng.sample(update_sample);
            cards.push(
                card(&name, Some(nation), &version.to_string(), &update.to_string())
                    .gender(gender)
                    .positions(position)
                    .overall(overall)
                    .potential(overall.max(rng.sample(overall_sample)))
                    .age(age + version - 23)
                    .random_face_stats(&mut rng),
            );
        }
    }

    println!("Seeding {} cards", cards.len());
    insert_cards(&db, cards).await;
}
