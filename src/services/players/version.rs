//! Numeric ordering of game versions and updates.
//!
//! Versions and updates are stored as text ordinals so a plain string
//! comparison would place update "10" before update "9". Both values
//! are cast to integers and zero padded to a fixed width before being
//! compared, the same encoding is available on the Rust side through
//! [`VersionKey`]. Ordinals are limited to [`MAX_ORDINAL`] so the padded
//! width always holds the full number.

use crate::database::entities::players;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use std::fmt::Display;

/// Name of the aggregated version token column within the dedup subquery
pub const LATEST_VERSION: &str = "latest_version";

/// Largest accepted version or update ordinal, the tokens pad to
/// five digits
pub const MAX_ORDINAL: u32 = 99_999;

/// Canonical stored form of a version or update ordinal ("02" becomes
/// "2"), missing for values that aren't whole numbers within
/// [`MAX_ORDINAL`]
pub fn canonical_ordinal(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|char| char.is_ascii_digit()) {
        return None;
    }
    let ordinal: u32 = value.parse().ok()?;
    (ordinal <= MAX_ORDINAL).then(|| ordinal.to_string())
}

/// Ordinal used to match against stored values, anything that isn't
/// a valid ordinal is kept as given and matches no cards
pub fn match_ordinal(value: &str) -> String {
    canonical_ordinal(value).unwrap_or_else(|| value.trim().to_string())
}

/// Recency key of a single card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionKey {
    pub version: u32,
    pub update: u32,
}

impl VersionKey {
    /// Parses the key from the stored text ordinals, values that
    /// are not numeric are treated as zero matching the store cast
    pub fn parse(version: &str, update: &str) -> Self {
        Self {
            version: version.trim().parse().unwrap_or_default(),
            update: update.trim().parse().unwrap_or_default(),
        }
    }

    /// Sortable token for this key ("00023_00002")
    pub fn token(&self) -> String {
        format!("{:05}_{:05}", self.version, self.update)
    }
}

impl From<&players::Model> for VersionKey {
    fn from(value: &players::Model) -> Self {
        Self::parse(&value.game_version, &value.game_update)
    }
}

impl Display for VersionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.version, self.update)
    }
}

/// Expression casting a text ordinal to an integer
pub fn numeric<E>(expr: E) -> SimpleExpr
where
    E: Into<SimpleExpr>,
{
    Expr::cust_with_exprs("CAST($1 AS INTEGER)", [expr.into()])
}

/// Expression producing the [`VersionKey::token`] of a row from its
/// version and update columns
pub fn version_token<V, U>(version: V, update: U) -> SimpleExpr
where
    V: Into<SimpleExpr>,
    U: Into<SimpleExpr>,
{
    Expr::cust_with_exprs(
        "printf('%05d_%05d', CAST($1 AS INTEGER), CAST($2 AS INTEGER))",
        [version.into(), update.into()],
    )
}

/// Token of the current row of the players table, the version token
/// followed by the padded card ID. Cards sharing a version and update
/// resolve to the most recently inserted one
pub fn player_token() -> SimpleExpr {
    Expr::cust_with_exprs(
        "$1 || printf('_%010d', $2)",
        [
            version_token(
                Expr::col((players::Entity, players::Column::GameVersion)),
                Expr::col((players::Entity, players::Column::GameUpdate)),
            ),
            Expr::col((players::Entity, players::Column::Id)).into(),
        ],
    )
}

/// Aggregate selecting the most recent token of a group
pub fn max_player_token() -> SimpleExpr {
    Func::max(player_token()).into()
}
