//! Parsing and representation of the filters accepted when listing
//! player cards

use super::PlayerQueryError;
use crate::database::entities::players;
use sea_orm::{ColumnTrait, Condition, Order};
use std::str::FromStr;

/// Default number of cards per page
pub const DEFAULT_LIMIT: u64 = 20;
/// Largest page size that can be requested explicitly
pub const MAX_LIMIT: u64 = 1000;
/// Limit value requesting every matching card
pub const UNBOUNDED_LIMIT: i64 = -1;
/// Upper bound applied to unbounded requests
pub const UNBOUNDED_CAP: u64 = 999_999;

/// Inclusive numeric bounds, either side is optional
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl Range {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    /// Parses the bounds from raw query values
    pub fn parse(
        name: &str,
        min: Option<&str>,
        max: Option<&str>,
    ) -> Result<Self, PlayerQueryError> {
        Ok(Self {
            min: parse_bound(&format!("{name}-min"), min)?,
            max: parse_bound(&format!("{name}-max"), max)?,
        })
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Condition restricting the provided column to these bounds
    fn condition(&self, column: players::Column) -> Condition {
        let mut condition = Condition::all();
        if let Some(min) = self.min {
            condition = condition.add(column.gte(min));
        }
        if let Some(max) = self.max {
            condition = condition.add(column.lte(max));
        }
        condition
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<i32>, PlayerQueryError> {
    match non_empty(value) {
        Some(value) => value.parse().map(Some).map_err(|_| {
            PlayerQueryError::InvalidArgument(format!("{name} must be a whole number"))
        }),
        None => Ok(None),
    }
}

/// Treats blank query values the same as missing ones
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Normalizes the accepted gender spellings to the stored "M" / "F"
pub fn parse_gender(value: &str) -> Result<&'static str, PlayerQueryError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "m" | "male" => Ok("M"),
        "f" | "female" => Ok("F"),
        _ => Err(PlayerQueryError::InvalidArgument(format!(
            "Unknown gender '{value}', expected M or F"
        ))),
    }
}

/// Requested page of the result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// One based page number
    pub page: u64,
    /// Number of cards per page after the caps are applied
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, PlayerQueryError> {
        let page = match non_empty(page) {
            Some(value) => match value.parse::<u64>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    return Err(PlayerQueryError::InvalidArgument(format!(
                        "page must be a number of at least 1, got '{value}'"
                    )))
                }
            },
            None => 1,
        };

        let limit = match non_empty(limit) {
            Some(value) => match value.parse::<i64>() {
                Ok(UNBOUNDED_LIMIT) => UNBOUNDED_CAP,
                Ok(limit) if limit >= 1 => (limit as u64).min(MAX_LIMIT),
                _ => {
                    return Err(PlayerQueryError::InvalidArgument(format!(
                        "limit must be a number of at least 1 (or -1 for all), got '{value}'"
                    )))
                }
            },
            None => DEFAULT_LIMIT,
        };

        // The offset is bound as a signed 64 bit value by the store
        let within_store = (page - 1)
            .checked_mul(limit)
            .is_some_and(|offset| offset <= i64::MAX as u64);
        if !within_store {
            return Err(PlayerQueryError::InvalidArgument(format!(
                "page {page} is too large for a limit of {limit}"
            )));
        }

        Ok(Self { page, limit })
    }

    /// Number of cards skipped before this page
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Ordering of the result set, the column is always one of the
/// players table columns
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub column: players::Column,
    pub descending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: players::Column::Overall,
            descending: true,
        }
    }
}

impl SortSpec {
    pub fn parse(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Self, PlayerQueryError> {
        let mut spec = Self::default();

        if let Some(sort_by) = non_empty(sort_by) {
            let name = sort_by.replace('-', "_");
            spec.column = players::Column::from_str(&name).map_err(|_| {
                PlayerQueryError::InvalidArgument(format!("Cannot sort by unknown column '{sort_by}'"))
            })?;
        }

        if let Some(sort_order) = non_empty(sort_order) {
            spec.descending = if sort_order.eq_ignore_ascii_case("desc") {
                true
            } else if sort_order.eq_ignore_ascii_case("asc") {
                false
            } else {
                return Err(PlayerQueryError::InvalidArgument(format!(
                    "Unknown sort order '{sort_order}', expected ASC or DESC"
                )));
            };
        }

        Ok(spec)
    }

    pub fn order(&self) -> Order {
        if self.descending {
            Order::Desc
        } else {
            Order::Asc
        }
    }
}

/// The complete set of filters for a listing request
#[derive(Debug, Default, Clone)]
pub struct PlayerFilter {
    /// Substring of either the long or short name
    pub name: Option<String>,
    pub club_name: Option<String>,
    pub nationality_name: Option<String>,
    /// Substring of the comma separated positions list
    pub position: Option<String>,
    /// Normalized gender ("M" or "F")
    pub gender: Option<String>,
    pub overall: Range,
    pub potential: Range,
    pub age: Range,
    pub game_version: Option<String>,
    pub game_update: Option<String>,
    pub page: PageRequest,
    pub sort: SortSpec,
}

impl PlayerFilter {
    /// Condition for the filters that don't involve player ratings,
    /// these are safe to apply before picking the latest card of a player
    pub fn identity_condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(name) = &self.name {
            condition = condition.add(
                Condition::any()
                    .add(players::Column::LongName.contains(name))
                    .add(players::Column::ShortName.contains(name)),
            );
        }
        if let Some(club_name) = &self.club_name {
            condition = condition.add(players::Column::ClubName.contains(club_name));
        }
        if let Some(nationality_name) = &self.nationality_name {
            condition = condition.add(players::Column::NationalityName.contains(nationality_name));
        }
        if let Some(position) = &self.position {
            condition = condition.add(players::Column::PlayerPositions.contains(position));
        }
        if let Some(gender) = &self.gender {
            condition = condition.add(players::Column::Gender.eq(gender.as_str()));
        }
        if let Some(game_version) = &self.game_version {
            condition = condition.add(players::Column::GameVersion.eq(game_version.as_str()));
        }
        if let Some(game_update) = &self.game_update {
            condition = condition.add(players::Column::GameUpdate.eq(game_update.as_str()));
        }

        condition
    }

    /// Condition for the rating and age bounds
    pub fn rating_condition(&self) -> Condition {
        Condition::all()
            .add(self.overall.condition(players::Column::Overall))
            .add(self.potential.condition(players::Column::Potential))
            .add(self.age.condition(players::Column::Age))
    }

    /// Condition for every filter
    pub fn full_condition(&self) -> Condition {
        Condition::all()
            .add(self.identity_condition())
            .add(self.rating_condition())
    }

    /// Number of filters that were provided, pagination and sorting
    /// are not counted
    pub fn applied_count(&self) -> usize {
        let optional = [
            &self.name,
            &self.club_name,
            &self.nationality_name,
            &self.position,
            &self.gender,
            &self.game_version,
            &self.game_update,
        ];
        let bounds = [self.overall, self.potential, self.age];

        optional.iter().filter(|value| value.is_some()).count()
            + bounds
                .iter()
                .map(|range| range.min.is_some() as usize + range.max.is_some() as usize)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod test {
    use super::{parse_gender, PageRequest, PlayerFilter, Range, SortSpec, UNBOUNDED_CAP};
    use crate::{database::entities::players, services::players::PlayerQueryError};

    #[test]
    fn test_page_defaults() {
        let page = PageRequest::parse(None, None).unwrap();
        assert_eq!(page, PageRequest { page: 1, limit: 20 });
        assert_eq!(page.offset(), 0);

        // Blank values are treated as missing
        let page = PageRequest::parse(Some(""), Some(" ")).unwrap();
        assert_eq!(page, PageRequest { page: 1, limit: 20 });
    }

    #[test]
    fn test_page_limits() {
        let page = PageRequest::parse(Some("3"), Some("50")).unwrap();
        assert_eq!(page.offset(), 100);

        let capped = PageRequest::parse(None, Some("5000")).unwrap();
        assert_eq!(capped.limit, 1000);

        let unbounded = PageRequest::parse(None, Some("-1")).unwrap();
        assert_eq!(unbounded.limit, UNBOUNDED_CAP);
    }

    #[test]
    fn test_page_invalid() {
        for (page, limit) in [
            (Some("0"), None),
            (Some("-2"), None),
            (Some("first"), None),
            (None, Some("0")),
            (None, Some("-5")),
            (None, Some("many")),
            // Offsets beyond the store range
            (Some("18446744073709551615"), Some("20")),
            (Some("9223372036854775807"), Some("2")),
        ] {
            let result = PageRequest::parse(page, limit);
            assert!(
                matches!(result, Err(PlayerQueryError::InvalidArgument(_))),
                "Expected {page:?} / {limit:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_page_offset_bounds() {
        // Largest page whose offset still fits the store
        let last = i64::MAX as u64 / 20 + 1;
        let page = PageRequest::parse(Some(&last.to_string()), Some("20")).unwrap();
        assert!(page.offset() <= i64::MAX as u64);

        let beyond = (last + 1).to_string();
        assert!(PageRequest::parse(Some(&beyond), Some("20")).is_err());
    }

    #[test]
    fn test_sort_parsing() {
        let spec = SortSpec::parse(None, None).unwrap();
        assert!(matches!(spec.column, players::Column::Overall));
        assert!(spec.descending);

        let spec = SortSpec::parse(Some("value_eur"), Some("asc")).unwrap();
        assert!(matches!(spec.column, players::Column::ValueEur));
        assert!(!spec.descending);

        let spec = SortSpec::parse(Some("movement-sprint-speed"), Some("Desc")).unwrap();
        assert!(matches!(spec.column, players::Column::MovementSprintSpeed));

        let spec = SortSpec::parse(Some("shortName"), None).unwrap();
        assert!(matches!(spec.column, players::Column::ShortName));
    }

    #[test]
    fn test_sort_rejected() {
        assert!(matches!(
            SortSpec::parse(Some("overall; DROP TABLE players"), None),
            Err(PlayerQueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            SortSpec::parse(Some("salary"), None),
            Err(PlayerQueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            SortSpec::parse(None, Some("sideways")),
            Err(PlayerQueryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_gender() {
        assert_eq!(parse_gender("m").unwrap(), "M");
        assert_eq!(parse_gender("Female").unwrap(), "F");
        assert!(parse_gender("x").is_err());
    }

    #[test]
    fn test_range_parsing() {
        let range = Range::parse("overall", Some("80"), None).unwrap();
        assert_eq!(range, Range::new(Some(80), None));
        assert!(range.is_set());

        assert!(Range::parse("overall", Some("eighty"), None).is_err());
        assert!(!Range::parse("age", Some(""), None).unwrap().is_set());
    }

    #[test]
    fn test_applied_count() {
        let filter = PlayerFilter {
            name: Some("Messi".to_string()),
            gender: Some("M".to_string()),
            overall: Range::new(Some(80), Some(90)),
            ..Default::default()
        };
        assert_eq!(filter.applied_count(), 4);
        assert_eq!(PlayerFilter::default().applied_count(), 0);
    }
}
