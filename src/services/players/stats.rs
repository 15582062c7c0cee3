//! Aggregate statistics over the stored cards, used to populate
//! version pickers and filter controls

use super::{version::numeric, PlayerQueryResult};
use crate::database::{entities::players, DatabaseConnection, DbResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ColumnTrait, Condition, EntityTrait, FromQueryResult, Order, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;

/// Number of primary positions included in the filter metadata
const TOP_POSITIONS: u64 = 15;
/// Number of clubs included in the filter metadata
const TOP_CLUBS: u64 = 20;
/// Number of nationalities included in the filter metadata
const TOP_NATIONALITIES: u64 = 25;

/// Width of a single overall rating bucket
const BUCKET_SIZE: i32 = 5;

/// Primary (first listed) position of a card
const PRIMARY_POSITION: &str =
    "TRIM(SUBSTR(player_positions || ',', 1, INSTR(player_positions || ',', ',') - 1))";

/// Condition restricting cards to an optional version and update
pub fn pinned_condition(game_version: Option<&str>, game_update: Option<&str>) -> Condition {
    let mut condition = Condition::all();
    if let Some(game_version) = game_version {
        condition = condition.add(players::Column::GameVersion.eq(game_version));
    }
    if let Some(game_update) = game_update {
        condition = condition.add(players::Column::GameUpdate.eq(game_update));
    }
    condition
}

fn count_distinct_names() -> SimpleExpr {
    Expr::cust_with_exprs(
        "COUNT(DISTINCT $1)",
        [Expr::col(players::Column::LongName).into()],
    )
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Statistics of the cards of a single version update
#[derive(Debug, Clone, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStats {
    pub game_version: String,
    pub game_update: String,
    pub player_count: i64,
    pub unique_players: i64,
    pub avg_overall: f64,
    pub max_overall: i32,
    pub min_overall: i32,
}

/// Lists the statistics of every version update, most recent first
///
/// `db` The database connection
pub async fn update_stats(db: &DatabaseConnection) -> PlayerQueryResult<Vec<UpdateStats>> {
    let stats = players::Entity::find()
        .select_only()
        .column(players::Column::GameVersion)
        .column(players::Column::GameUpdate)
        .column_as(Expr::col(players::Column::Id).count(), "player_count")
        .column_as(count_distinct_names(), "unique_players")
        .column_as(SimpleExpr::from(Func::avg(Expr::col(players::Column::Overall))), "avg_overall")
        .column_as(Expr::col(players::Column::Overall).max(), "max_overall")
        .column_as(Expr::col(players::Column::Overall).min(), "min_overall")
        .group_by(players::Column::GameVersion)
        .group_by(players::Column::GameUpdate)
        .order_by(numeric(Expr::col(players::Column::GameVersion)), Order::Desc)
        .order_by(numeric(Expr::col(players::Column::GameUpdate)), Order::Desc)
        .into_model::<UpdateStats>()
        .all(db)
        .await?;
    Ok(stats)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverallRange {
    pub min: i32,
    pub max: i32,
}

/// Single update within a [`VersionSummary`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub update: String,
    pub player_count: i64,
    pub unique_players: i64,
    pub avg_overall: f64,
    pub overall_range: OverallRange,
}

/// Statistics of a game version and each of its updates
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub version: String,
    pub updates: Vec<UpdateSummary>,
    pub total_players: i64,
    /// Largest number of unique players within a single update
    pub unique_players: i64,
    pub avg_overall: f64,
    pub overall_range: OverallRange,
}

/// Lists the available versions with their updates, both ordered
/// most recent first
///
/// `db` The database connection
pub async fn available_versions(db: &DatabaseConnection) -> PlayerQueryResult<Vec<VersionSummary>> {
    let stats = update_stats(db).await?;
    Ok(group_versions(stats))
}

/// Groups the update statistics by their version, the input ordering
/// is preserved
fn group_versions(stats: Vec<UpdateStats>) -> Vec<VersionSummary> {
    let mut versions: Vec<VersionSummary> = Vec::new();
    // Sum of the overall ratings of each version, used for the weighted average
    let mut overall_sums: Vec<f64> = Vec::new();

    for stat in stats {
        let range = OverallRange {
            min: stat.min_overall,
            max: stat.max_overall,
        };

        let index = match versions.last() {
            Some(last) if last.version == stat.game_version => versions.len() - 1,
            _ => {
                versions.push(VersionSummary {
                    version: stat.game_version.clone(),
                    updates: Vec::new(),
                    total_players: 0,
                    unique_players: 0,
                    avg_overall: 0.0,
                    overall_range: range,
                });
                overall_sums.push(0.0);
                versions.len() - 1
            }
        };

        let version = &mut versions[index];
        version.total_players += stat.player_count;
        version.unique_players = version.unique_players.max(stat.unique_players);
        version.overall_range.min = version.overall_range.min.min(range.min);
        version.overall_range.max = version.overall_range.max.max(range.max);
        overall_sums[index] += stat.avg_overall * stat.player_count as f64;

        version.updates.push(UpdateSummary {
            update: stat.game_update,
            player_count: stat.player_count,
            unique_players: stat.unique_players,
            avg_overall: round_tenth(stat.avg_overall),
            overall_range: range,
        });
    }

    for (version, sum) in versions.iter_mut().zip(overall_sums) {
        if version.total_players > 0 {
            version.avg_overall = round_tenth(sum / version.total_players as f64);
        }
    }

    versions
}

#[derive(FromQueryResult)]
struct BucketRow {
    rating_range: i32,
    count: i64,
}

/// Number of cards within a range of overall ratings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    /// Lowest rating of the bucket
    pub rating_range: i32,
    pub count: i64,
    /// Inclusive range label ("85-89")
    pub range_label: String,
}

/// Counts the cards within each bucket of overall ratings, highest
/// bucket first
///
/// `db`        The database connection
/// `condition` Condition restricting the counted cards
pub async fn overall_distribution(
    db: &DatabaseConnection,
    condition: Condition,
) -> PlayerQueryResult<Vec<RatingBucket>> {
    Ok(rating_buckets(db, condition).await?)
}

async fn rating_buckets(db: &DatabaseConnection, condition: Condition) -> DbResult<Vec<RatingBucket>> {
    let bucket = Expr::cust_with_exprs(
        format!("($1 / {BUCKET_SIZE}) * {BUCKET_SIZE}"),
        [Expr::col(players::Column::Overall).into()],
    );

    let rows = players::Entity::find()
        .select_only()
        .column_as(bucket.clone(), "rating_range")
        .column_as(Expr::col(players::Column::Id).count(), "count")
        .filter(condition)
        .group_by(bucket.clone())
        .order_by(bucket, Order::Desc)
        .into_model::<BucketRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| RatingBucket {
            rating_range: row.rating_range,
            count: row.count,
            range_label: format!("{}-{}", row.rating_range, row.rating_range + BUCKET_SIZE - 1),
        })
        .collect())
}

/// Summary statistics of a set of cards
#[derive(Debug, Clone, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_players: i64,
    pub unique_players: i64,
    pub avg_overall: Option<f64>,
    pub max_overall: Option<i32>,
    pub min_overall: Option<i32>,
    pub avg_age: Option<f64>,
    pub max_age: Option<i32>,
    pub min_age: Option<i32>,
    pub male_count: i64,
    pub female_count: i64,
}

/// Number of cards sharing a primary position
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct PositionCount {
    pub position: String,
    pub count: i64,
}

/// Number of cards sharing a club or nationality
#[derive(Debug, Clone, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub name: String,
    pub count: i64,
    pub avg_overall: f64,
}

/// The version pins the metadata was generated for
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPins {
    pub game_version: String,
    pub game_update: String,
}

/// Data used to populate the listing filter controls
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMetadata {
    pub version: MetadataPins,
    pub overall_distribution: Vec<RatingBucket>,
    pub positions: Vec<PositionCount>,
    pub clubs: Vec<GroupCount>,
    pub nationalities: Vec<GroupCount>,
    pub stats: Option<SummaryStats>,
    pub generated_at: DateTime<Utc>,
}

/// Collects the filter metadata for the cards within the optional pins
///
/// `db`           The database connection
/// `game_version` Optional version pin
/// `game_update`  Optional update pin
pub async fn filter_metadata(
    db: &DatabaseConnection,
    game_version: Option<&str>,
    game_update: Option<&str>,
) -> PlayerQueryResult<FilterMetadata> {
    let condition = pinned_condition(game_version, game_update);

    let stats = players::Entity::find()
        .select_only()
        .column_as(Expr::col(players::Column::Id).count(), "total_players")
        .column_as(count_distinct_names(), "unique_players")
        .column_as(SimpleExpr::from(Func::avg(Expr::col(players::Column::Overall))), "avg_overall")
        .column_as(Expr::col(players::Column::Overall).max(), "max_overall")
        .column_as(Expr::col(players::Column::Overall).min(), "min_overall")
        .column_as(SimpleExpr::from(Func::avg(Expr::col(players::Column::Age))), "avg_age")
        .column_as(Expr::col(players::Column::Age).max(), "max_age")
        .column_as(Expr::col(players::Column::Age).min(), "min_age")
        .column_as(
            Expr::cust("COUNT(CASE WHEN gender = 'M' THEN 1 END)"),
            "male_count",
        )
        .column_as(
            Expr::cust("COUNT(CASE WHEN gender = 'F' THEN 1 END)"),
            "female_count",
        )
        .filter(condition.clone())
        .into_model::<SummaryStats>()
        .one(db);

    let distribution = rating_buckets(db, condition.clone());

    let positions = players::Entity::find()
        .select_only()
        .column_as(Expr::cust(PRIMARY_POSITION), "position")
        .column_as(Expr::col(players::Column::Id).count(), "count")
        .filter(condition.clone())
        .filter(players::Column::PlayerPositions.ne(""))
        .group_by(Expr::cust(PRIMARY_POSITION))
        .order_by(Expr::cust("count"), Order::Desc)
        .order_by(Expr::cust("position"), Order::Asc)
        .limit(TOP_POSITIONS)
        .into_model::<PositionCount>()
        .all(db);

    let clubs = group_counts(db, players::Column::ClubName, condition.clone(), TOP_CLUBS);
    let nationalities = group_counts(
        db,
        players::Column::NationalityName,
        condition,
        TOP_NATIONALITIES,
    );

    let (stats, overall_distribution, positions, clubs, nationalities) =
        tokio::try_join!(stats, distribution, positions, clubs, nationalities)?;

    Ok(FilterMetadata {
        version: MetadataPins {
            game_version: game_version.unwrap_or("all").to_string(),
            game_update: game_update.unwrap_or("all").to_string(),
        },
        overall_distribution,
        positions,
        clubs,
        nationalities,
        stats,
        generated_at: Utc::now(),
    })
}

/// Counts the cards grouped by the provided text column, most
/// common values first
async fn group_counts(
    db: &DatabaseConnection,
    column: players::Column,
    condition: Condition,
    limit: u64,
) -> DbResult<Vec<GroupCount>> {
    players::Entity::find()
        .select_only()
        .column_as(column, "name")
        .column_as(Expr::col(players::Column::Id).count(), "count")
        .column_as(SimpleExpr::from(Func::avg(Expr::col(players::Column::Overall))), "avg_overall")
        .filter(condition)
        .filter(column.is_not_null())
        .filter(column.ne(""))
        .group_by(column)
        .order_by(Expr::cust("count"), Order::Desc)
        .order_by(column, Order::Asc)
        .limit(limit)
        .into_model::<GroupCount>()
        .all(db)
        .await
}
