//! Querying of player cards. The listing resolver in this module picks
//! the cards returned for a set of filters, collapsing the many cards of
//! a single player down to their most recent one

use crate::{
    database::{entities::players, DatabaseConnection, DbErr},
    utils::types::PlayerID,
};
use log::debug;
use sea_orm::{PaginatorTrait, QuerySelect};
use serde::Serialize;
use thiserror::Error;

pub mod filter;
pub mod payload;
pub mod plan;
pub mod profile;
pub mod search;
pub mod stats;
pub mod version;

use self::{filter::PlayerFilter, plan::QueryPlan};

/// Errors that can occur while querying player cards
#[derive(Debug, Error)]
pub enum PlayerQueryError {
    /// A request value was malformed or out of range
    #[error("{0}")]
    InvalidArgument(String),
    /// No card exists with the requested ID
    #[error("Player card {0} not found")]
    NotFound(PlayerID),
    /// The database connection could not be established or acquired
    #[error("Player store is unavailable")]
    StoreUnavailable(#[source] DbErr),
    /// Any other database failure
    #[error("Internal server error")]
    Internal(#[source] DbErr),
}

impl From<DbErr> for PlayerQueryError {
    fn from(value: DbErr) -> Self {
        match value {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(..) => Self::StoreUnavailable(value),
            value => Self::Internal(value),
        }
    }
}

pub type PlayerQueryResult<T> = Result<T, PlayerQueryError>;

/// Pagination details of a resolved listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// A single resolved page of player cards
#[derive(Debug)]
pub struct PlayerPage {
    pub records: Vec<players::Model>,
    pub pagination: Pagination,
    /// The plan used to resolve the page
    pub plan: QueryPlan,
    /// Human readable description of the plan
    pub mode: String,
    /// Number of filters that were applied
    pub filters_applied: usize,
}

/// Resolves the page of cards for the provided filters. The count of
/// all matching cards is queried alongside the page itself
///
/// `db`     The database connection
/// `filter` The listing filters
pub async fn resolve(
    db: &DatabaseConnection,
    filter: &PlayerFilter,
) -> PlayerQueryResult<PlayerPage> {
    let plan = QueryPlan::for_filter(filter);
    let page = filter.page;

    let records = plan
        .ordered_select(filter)
        .offset(page.offset())
        .limit(page.limit)
        .all(db);
    let total = plan.select(filter).count(db);

    let (records, total) = tokio::try_join!(records, total)?;

    debug!(
        "Resolved player listing (Plan: {}, Page: {}, Returned: {}, Total: {})",
        plan.label(),
        page.page,
        records.len(),
        total
    );

    Ok(PlayerPage {
        records,
        pagination: Pagination::new(page.page, page.limit, total),
        plan,
        mode: plan.mode(filter),
        filters_applied: filter.applied_count(),
    })
}

/// Finds a single card by ID
///
/// `db` The database connection
/// `id` The ID of the card
pub async fn find_player(db: &DatabaseConnection, id: PlayerID) -> PlayerQueryResult<players::Model> {
    players::Model::by_id(db, id)
        .await?
        .ok_or(PlayerQueryError::NotFound(id))
}

#[cfg(test)]
mod test {
    use super::{
        filter::{PageRequest, PlayerFilter, Range, SortSpec},
        plan::QueryPlan,
        resolve, Pagination, PlayerQueryError,
    };
    use crate::database::{
        seed::{card, insert_cards, memory_database},
        DbErr,
    };
    use sea_orm::RuntimeErr;

    /// The most recent card of a player must be picked
    #[tokio::test]
    async fn test_latest_card_picked() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Lionel Messi", Some("Argentina"), "23", "1").overall(91),
                card("Lionel Messi", Some("Argentina"), "23", "2").overall(90),
            ],
        )
        .await;

        let page = resolve(&db, &PlayerFilter::default()).await.unwrap();
        assert_eq!(page.plan, QueryPlan::Comprehensive);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].overall, 90);
        assert_eq!(page.records[0].game_update, "2");
        assert_eq!(page.pagination.total, 1);
    }

    /// Update "10" is more recent than update "9"
    #[tokio::test]
    async fn test_update_numeric_ordering() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Erling Haaland", Some("Norway"), "23", "9").overall(88),
                card("Erling Haaland", Some("Norway"), "23", "10").overall(91),
                card("Erling Haaland", Some("Norway"), "9", "99").overall(70),
            ],
        )
        .await;

        let page = resolve(&db, &PlayerFilter::default()).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].game_update, "10");
        assert_eq!(page.records[0].overall, 91);

        // Within a pinned version the same ordering applies
        let filter = PlayerFilter {
            game_version: Some("23".to_string()),
            ..Default::default()
        };
        let page = resolve(&db, &filter).await.unwrap();
        assert_eq!(page.plan, QueryPlan::PinnedLatestUpdate);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].game_update, "10");
    }

    /// Every distinct player appears once, and only once
    #[tokio::test]
    async fn test_one_card_per_identity() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Kevin De Bruyne", Some("Belgium"), "21", "1"),
                card("Kevin De Bruyne", Some("Belgium"), "22", "1"),
                card("Kevin De Bruyne", Some("Belgium"), "23", "3"),
                card("Luka Modric", Some("Croatia"), "22", "2"),
                card("Luka Modric", Some("Croatia"), "23", "1"),
                card("Pedri", Some("Spain"), "23", "1"),
            ],
        )
        .await;

        let page = resolve(&db, &PlayerFilter::default()).await.unwrap();
        let mut names: Vec<&str> = page
            .records
            .iter()
            .map(|record| record.long_name.as_str())
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["Kevin De Bruyne", "Luka Modric", "Pedri"]);

        for record in &page.records {
            assert_eq!(record.game_version, "23");
        }
    }

    /// Distinct players sharing an exact pin are all returned
    #[tokio::test]
    async fn test_pinned_exact_keeps_players() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Vinicius Junior", Some("Brazil"), "23", "1").club("Real Madrid"),
                card("Rodrygo", Some("Brazil"), "23", "1").club("Real Madrid"),
                card("Rodrygo", Some("Brazil"), "23", "2").club("Real Madrid"),
            ],
        )
        .await;

        let filter = PlayerFilter {
            club_name: Some("Real".to_string()),
            game_version: Some("23".to_string()),
            game_update: Some("1".to_string()),
            ..Default::default()
        };
        let page = resolve(&db, &filter).await.unwrap();
        assert_eq!(page.plan, QueryPlan::PinnedExact);
        assert_eq!(page.records.len(), 2);
        assert!(page.records.iter().all(|record| record.game_update == "1"));
    }

    /// Pinning only a version returns the latest update of each player
    /// within that version and ignores newer versions
    #[tokio::test]
    async fn test_pinned_latest_update() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Sam Kerr", Some("Australia"), "22", "1").gender("F").overall(88),
                card("Sam Kerr", Some("Australia"), "22", "3").gender("F").overall(89),
                card("Sam Kerr", Some("Australia"), "23", "1").gender("F").overall(90),
            ],
        )
        .await;

        let filter = PlayerFilter {
            game_version: Some("22".to_string()),
            ..Default::default()
        };
        let page = resolve(&db, &filter).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].game_update, "3");
        assert_eq!(page.records[0].overall, 89);
        assert_eq!(page.mode, "FIFA 22 Update Latest");
    }

    /// Rating bounds are checked against the latest card only
    #[tokio::test]
    async fn test_rating_checked_after_dedup() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Eden Hazard", Some("Belgium"), "19", "1").overall(92),
                card("Eden Hazard", Some("Belgium"), "23", "1").overall(85),
                card("Karim Benzema", Some("France"), "23", "1").overall(91),
            ],
        )
        .await;

        let filter = PlayerFilter {
            overall: Range::new(Some(90), Some(99)),
            ..Default::default()
        };
        let page = resolve(&db, &filter).await.unwrap();
        assert_eq!(page.plan, QueryPlan::RatingFocused);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].long_name, "Karim Benzema");
        assert_eq!(page.pagination.total, 1);
    }

    /// Cards without a nationality still collapse into a single player
    #[tokio::test]
    async fn test_missing_nationality_grouped() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Unknown Prospect", None, "22", "1").overall(60),
                card("Unknown Prospect", None, "23", "1").overall(64),
            ],
        )
        .await;

        let page = resolve(&db, &PlayerFilter::default()).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].overall, 64);
    }

    #[tokio::test]
    async fn test_empty_result() {
        let db = memory_database().await;
        insert_cards(&db, [card("Harry Kane", Some("England"), "23", "1")]).await;

        let filter = PlayerFilter {
            name: Some("Nobody".to_string()),
            ..Default::default()
        };
        let page = resolve(&db, &filter).await.unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(!page.pagination.has_next_page);
        assert!(!page.pagination.has_prev_page);
    }

    #[tokio::test]
    async fn test_far_page() {
        let db = memory_database().await;
        insert_cards(&db, [card("Harry Kane", Some("England"), "23", "1")]).await;

        let page = (i64::MAX as u64 / 20).to_string();
        let filter = PlayerFilter {
            page: PageRequest::parse(Some(&page), Some("20")).unwrap(),
            ..Default::default()
        };
        let page = resolve(&db, &filter).await.unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.pagination.total, 1);
        assert!(!page.pagination.has_next_page);

        let result = PageRequest::parse(Some("18446744073709551615"), Some("20"));
        assert!(matches!(result, Err(PlayerQueryError::InvalidArgument(_))));
    }

    /// Walking through every page visits every player exactly once
    #[tokio::test]
    async fn test_pages_cover_results() {
        let db = memory_database().await;
        let cards = (0..7).flat_map(|index| {
            let name = format!("Player {index}");
            [
                card(&name, Some("Italy"), "22", "1").overall(70),
                card(&name, Some("Italy"), "23", "1").overall(80),
            ]
        });
        insert_cards(&db, cards).await;

        let mut seen = Vec::new();
        for page in 1..=3 {
            let filter = PlayerFilter {
                page: PageRequest { page, limit: 3 },
                ..Default::default()
            };
            let result = resolve(&db, &filter).await.unwrap();
            assert_eq!(result.pagination.total, 7);
            assert_eq!(result.pagination.total_pages, 3);
            assert_eq!(result.pagination.has_next_page, page < 3);
            assert_eq!(result.pagination.has_prev_page, page > 1);
            seen.extend(result.records.into_iter().map(|record| record.long_name));
        }

        assert_eq!(seen.len(), 7);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 7);
    }

    /// Resolving the same filters twice gives the same page
    #[tokio::test]
    async fn test_idempotent() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Son Heung-min", Some("Korea Republic"), "23", "1").overall(89),
                card("Harry Kane", Some("England"), "23", "1").overall(89),
                card("Dejan Kulusevski", Some("Sweden"), "23", "1").overall(81),
            ],
        )
        .await;

        let filter = PlayerFilter {
            sort: SortSpec::parse(Some("overall"), Some("desc")).unwrap(),
            ..Default::default()
        };
        let first = resolve(&db, &filter).await.unwrap();
        let second = resolve(&db, &filter).await.unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.pagination, second.pagination);

        // Equal ratings are ordered by ID
        assert!(first.records[0].id < first.records[1].id);
    }

    #[tokio::test]
    async fn test_name_search_ignores_rating_plan() {
        let db = memory_database().await;
        insert_cards(
            &db,
            [
                card("Lionel Andrés Messi Cuccittini", Some("Argentina"), "23", "1")
                    .short_name("L. Messi"),
                card("Cristiano Ronaldo dos Santos Aveiro", Some("Portugal"), "23", "1")
                    .short_name("Cristiano Ronaldo"),
            ],
        )
        .await;

        let filter = PlayerFilter {
            name: Some("Messi".to_string()),
            overall: Range::new(Some(1), None),
            ..Default::default()
        };
        let page = resolve(&db, &filter).await.unwrap();
        assert_eq!(page.plan, QueryPlan::Comprehensive);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].short_name, "L. Messi");
        assert_eq!(page.filters_applied, 2);
    }

    #[test]
    fn test_pagination_math() {
        let pagination = Pagination::new(2, 20, 41);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next_page);
        assert!(pagination.has_prev_page);

        let pagination = Pagination::new(3, 20, 41);
        assert!(!pagination.has_next_page);
    }

    #[test]
    fn test_store_errors_classified() {
        let err = PlayerQueryError::from(DbErr::Conn(RuntimeErr::Internal(
            "connection refused".to_string(),
        )));
        assert!(matches!(err, PlayerQueryError::StoreUnavailable(_)));

        let err = PlayerQueryError::from(DbErr::Custom("bad query".to_string()));
        assert!(matches!(err, PlayerQueryError::Internal(_)));
    }
}
