use super::{
    filter::{non_empty, parse_gender},
    plan::latest_per_identity,
    stats::pinned_condition,
    version::match_ordinal,
    PlayerQueryError, PlayerQueryResult,
};
use crate::database::{entities::players, DatabaseConnection};
use sea_orm::{ColumnTrait, Condition, QueryOrder, QuerySelect};

/// Default number of top rated cards
pub const DEFAULT_TOP_RATED: u64 = 4;
/// Maximum number of top rated cards
pub const MAX_TOP_RATED: u64 = 200;
/// Default number of search results
pub const DEFAULT_SEARCH_LIMIT: u64 = 20;
/// Maximum number of search results
pub const MAX_SEARCH_LIMIT: u64 = 100;
/// Shortest accepted search term
pub const MIN_SEARCH_LENGTH: usize = 2;

/// Optional gender and version restrictions shared by the lookups
#[derive(Debug, Default, Clone)]
pub struct LookupPins {
    pub gender: Option<String>,
    pub game_version: Option<String>,
    pub game_update: Option<String>,
}

impl LookupPins {
    pub fn parse(
        gender: Option<&str>,
        game_version: Option<&str>,
        game_update: Option<&str>,
    ) -> PlayerQueryResult<Self> {
        Ok(Self {
            gender: non_empty(gender)
                .map(parse_gender)
                .transpose()?
                .map(str::to_string),
            game_version: non_empty(game_version).map(match_ordinal),
            game_update: non_empty(game_update).map(match_ordinal),
        })
    }

    fn condition(&self) -> Condition {
        let mut condition =
            pinned_condition(self.game_version.as_deref(), self.game_update.as_deref());
        if let Some(gender) = &self.gender {
            condition = condition.add(players::Column::Gender.eq(gender.as_str()));
        }
        condition
    }
}

/// Parses an optional result limit, values above the maximum are capped
pub fn parse_limit(value: Option<&str>, default: u64, max: u64) -> PlayerQueryResult<u64> {
    match non_empty(value) {
        Some(value) => match value.parse::<u64>() {
            Ok(limit) if limit >= 1 => Ok(limit.min(max)),
            _ => Err(PlayerQueryError::InvalidArgument(format!(
                "limit must be a number of at least 1, got '{value}'"
            ))),
        },
        None => Ok(default),
    }
}

/// Finds the highest rated players using the latest card of each
/// player within the pins
///
/// `db`    The database connection
/// `limit` The number of cards to return
/// `pins`  Gender and version restrictions
pub async fn top_rated(
    db: &DatabaseConnection,
    limit: u64,
    pins: &LookupPins,
) -> PlayerQueryResult<Vec<players::Model>> {
    let condition = pins.condition();
    let cards = latest_per_identity(condition.clone(), condition)
        .order_by_desc(players::Column::Overall)
        .order_by_desc(players::Column::Potential)
        .order_by_asc(players::Column::Id)
        .limit(limit.min(MAX_TOP_RATED))
        .all(db)
        .await?;
    Ok(cards)
}

/// Searches for players by their long name, only the latest card of
/// each matching player is returned
///
/// `db`    The database connection
/// `term`  The search term
/// `limit` The maximum number of cards to return
/// `pins`  Gender and version restrictions
pub async fn search(
    db: &DatabaseConnection,
    term: &str,
    limit: u64,
    pins: &LookupPins,
) -> PlayerQueryResult<Vec<players::Model>> {
    let term = term.trim();
    if term.chars().count() < MIN_SEARCH_LENGTH {
        return Err(PlayerQueryError::InvalidArgument(format!(
            "Search term must be at least {MIN_SEARCH_LENGTH} characters"
        )));
    }

    let condition = pins
        .condition()
        .add(players::Column::LongName.contains(term));

    let cards = latest_per_identity(condition.clone(), condition)
        .order_by_desc(players::Column::Overall)
        .order_by_asc(players::Column::Id)
        .limit(limit.min(MAX_SEARCH_LIMIT))
        .all(db)
        .await?;
    Ok(cards)
}

#[cfg(test)]
mod test {
    use super::{parse_limit, search, top_rated, LookupPins};
    use crate::{
        database::seed::{card, insert_cards, memory_database},
        services::players::PlayerQueryError,
    };

    #[tokio::test]
    async fn test_top_rated_latest_only() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                // An old peak must not count
                card("Wayne Rooney", Some("England"), "15", "1").overall(95),
                card("Wayne Rooney", Some("England"), "18", "1").overall(80),
                card("Kylian Mbappe", Some("France"), "23", "1").overall(91).potential(95),
                card("Karim Benzema", Some("France"), "23", "1").overall(91).potential(91),
                card("Alexia Putellas", Some("Spain"), "23", "1").gender("F").overall(92),
            ],
        )
        .await;

        let cards = top_rated(&db, 3, &LookupPins::default()).await.unwrap();
        let names: Vec<&str> = cards.iter().map(|card| card.long_name.as_str()).collect();
        assert_eq!(names, ["Alexia Putellas", "Kylian Mbappe", "Karim Benzema"]);

        let pins = LookupPins::parse(Some("male"), None, None).unwrap();
        let cards = top_rated(&db, 10, &pins).await.unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[2].long_name, "Wayne Rooney");
        assert_eq!(cards[2].overall, 80);
    }

    #[tokio::test]
    async fn test_search() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Lionel Messi", Some("Argentina"), "22", "1").overall(93),
                card("Lionel Messi", Some("Argentina"), "23", "1").overall(91),
                card("Lionel Scaloni", Some("Argentina"), "15", "1").overall(70),
                card("Mesut Ozil", Some("Germany"), "23", "1").overall(80),
            ],
        )
        .await;

        let cards = search(&db, "Lionel", 20, &LookupPins::default())
            .await
            .unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].long_name, "Lionel Messi");
        assert_eq!(cards[0].overall, 91);

        let result = search(&db, "L", 20, &LookupPins::default()).await;
        assert!(matches!(result, Err(PlayerQueryError::InvalidArgument(_))));
    }

    #[test]
    fn test_limit_parsing() {
        assert_eq!(parse_limit(None, 4, 200).unwrap(), 4);
        assert_eq!(parse_limit(Some("500"), 4, 200).unwrap(), 200);
        assert!(parse_limit(Some("0"), 4, 200).is_err());
    }
}
