//! Selection of the query shape used to answer a listing request.
//!
//! Cards of the same real player are identified by their long name and
//! nationality. Unless an exact update is pinned, only the most recent
//! card of each identity is returned; the shapes below only differ in
//! which filters take part in picking that card.

use super::{
    filter::PlayerFilter,
    version::{max_player_token, player_token, LATEST_VERSION},
};
use crate::database::entities::players;
use sea_orm::{
    sea_query::{Alias, Expr, IntoCondition, JoinType, Query, SelectStatement},
    Condition, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select,
};

/// Alias of the joined dedup subquery
const LATEST_ALIAS: &str = "latest";

/// The query shape chosen for a set of filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPlan {
    /// An exact update was requested, every matching card is
    /// returned without any de-duplication
    PinnedExact,
    /// Only a version was requested, the latest update of each
    /// player within that version is returned
    PinnedLatestUpdate,
    /// Browsing by rating, the latest card of each player is found
    /// first and the rating bounds are checked against that card only
    RatingFocused,
    /// The latest card of each player among the cards matching
    /// every filter
    Comprehensive,
}

impl QueryPlan {
    /// Chooses the plan for the provided filters
    pub fn for_filter(filter: &PlayerFilter) -> Self {
        if filter.game_update.is_some() {
            return Self::PinnedExact;
        }

        if filter.game_version.is_some() {
            return Self::PinnedLatestUpdate;
        }

        let rating_bounds = filter.overall.is_set() || filter.potential.is_set();
        let searching = filter.name.is_some() || filter.club_name.is_some();
        if rating_bounds && !searching {
            return Self::RatingFocused;
        }

        Self::Comprehensive
    }

    /// Short machine readable name of the plan
    pub fn label(&self) -> &'static str {
        match self {
            Self::PinnedExact => "pinned-exact",
            Self::PinnedLatestUpdate => "pinned-latest-update",
            Self::RatingFocused => "rating-focused",
            Self::Comprehensive => "comprehensive",
        }
    }

    /// Human readable description of what the plan returns
    pub fn mode(&self, filter: &PlayerFilter) -> String {
        match self {
            Self::PinnedExact | Self::PinnedLatestUpdate => format!(
                "FIFA {} Update {}",
                filter.game_version.as_deref().unwrap_or("All"),
                filter.game_update.as_deref().unwrap_or("Latest")
            ),
            Self::RatingFocused => "Rating-Optimized Latest Versions".to_string(),
            Self::Comprehensive => "Comprehensive Latest Versions".to_string(),
        }
    }

    /// Creates the filtered select for this plan, ordering and
    /// pagination are left to the caller
    pub fn select(&self, filter: &PlayerFilter) -> Select<players::Entity> {
        match self {
            Self::PinnedExact => players::Entity::find().filter(filter.full_condition()),
            Self::PinnedLatestUpdate | Self::Comprehensive => {
                latest_per_identity(filter.full_condition(), filter.full_condition())
            }
            Self::RatingFocused => {
                latest_per_identity(filter.identity_condition(), filter.rating_condition())
            }
        }
    }

    /// Creates the complete select including the requested ordering,
    /// ties are always broken by the card ID
    pub fn ordered_select(&self, filter: &PlayerFilter) -> Select<players::Entity> {
        let mut select = self
            .select(filter)
            .order_by(filter.sort.column, filter.sort.order());

        if !matches!(filter.sort.column, players::Column::Id) {
            select = select.order_by_asc(players::Column::Id);
        }

        select
    }
}

/// Creates a select over the most recent card of each player identity.
///
/// `inner` Filters the cards that are considered when finding the most recent one
/// `outer` Filters the most recent cards themselves
pub fn latest_per_identity(inner: Condition, outer: Condition) -> Select<players::Entity> {
    let mut select = players::Entity::find().filter(outer);
    let latest = Alias::new(LATEST_ALIAS);

    let join_condition = Condition::all()
        .add(
            Expr::col((players::Entity, players::Column::LongName))
                .equals((latest.clone(), players::Column::LongName)),
        )
        // Cards without a nationality are grouped together
        .add(
            Expr::col((players::Entity, players::Column::NationalityName))
                .is(Expr::col((latest.clone(), players::Column::NationalityName))),
        )
        .add(Expr::expr(player_token()).eq(Expr::col((latest.clone(), Alias::new(LATEST_VERSION)))));

    QueryTrait::query(&mut select).join_subquery(
        JoinType::InnerJoin,
        latest_subquery(inner),
        latest,
        join_condition.into_condition(),
    );

    select
}

/// Subquery finding the most recent version token of every identity
fn latest_subquery(condition: Condition) -> SelectStatement {
    Query::select()
        .column(players::Column::LongName)
        .column(players::Column::NationalityName)
        .expr_as(max_player_token(), Alias::new(LATEST_VERSION))
        .from(players::Entity)
        .cond_where(condition)
        .group_by_col(players::Column::LongName)
        .group_by_col(players::Column::NationalityName)
        .to_owned()
}
