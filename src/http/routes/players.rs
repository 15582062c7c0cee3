use crate::{
    database::{entities::players, DatabaseConnection},
    services::players::{
        filter::{non_empty, parse_gender, PageRequest, PlayerFilter, Range, SortSpec},
        payload::{self, PlayerPayload},
        profile::{self, PlayerRadar, PlayerStats, PlayerTimeline},
        resolve,
        search::{
            self, parse_limit, LookupPins, DEFAULT_SEARCH_LIMIT, DEFAULT_TOP_RATED,
            MAX_SEARCH_LIMIT, MAX_TOP_RATED,
        },
        stats::{self, pinned_condition, FilterMetadata, RatingBucket, UpdateStats, VersionSummary},
        version::match_ordinal,
        find_player, Pagination, PlayerQueryError, PlayerQueryResult,
    },
    utils::types::PlayerID,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/fifa-players
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_players).post(create_player))
        .route("/versions", get(get_versions))
        .route("/versions-stats", get(get_version_stats))
        .route("/overall-distribution", get(get_overall_distribution))
        .route("/filter-metadata", get(get_filter_metadata))
        .route("/top-rated", get(get_top_rated))
        .route("/search", get(search_players))
        .route("/stats/:id", get(get_player_stats))
        .route(
            "/:id",
            get(get_player).put(update_player).delete(delete_player),
        )
        .route("/:id/radar", get(get_player_radar))
        .route("/:id/timeline", get(get_player_timeline))
}

/// Whether database error details are included in error responses.
///
/// Error responses are rendered through [`IntoResponse`] which has no
/// access to the `Extension` layers, so this is copied from
/// `api.expose_errors` once when the server starts
static EXPOSE_ERRORS: AtomicBool = AtomicBool::new(false);

/// Sets whether internal error details are sent to clients
pub fn set_expose_errors(value: bool) {
    EXPOSE_ERRORS.store(value, Ordering::Relaxed);
}

type PlayersResult<T> = Result<T, PlayerQueryError>;
type PlayersJsonResult<T> = PlayersResult<Json<Success<T>>>;

/// Envelope wrapping successful responses
#[derive(Serialize)]
struct Success<T> {
    success: bool,
    data: T,
}

fn success<T>(data: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        data,
    })
}

/// Parses a card ID path segment
fn parse_id(value: &str) -> PlayerQueryResult<PlayerID> {
    value
        .parse()
        .map_err(|_| PlayerQueryError::InvalidArgument(format!("Invalid player ID '{value}'")))
}

fn owned(value: Option<String>) -> Option<String> {
    non_empty(value.as_deref()).map(str::to_string)
}

/// Version or update pin in the stored form ("023" matches "23")
fn ordinal(value: Option<String>) -> Option<String> {
    non_empty(value.as_deref()).map(match_ordinal)
}

/// Query parameters accepted by the listing endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ListPlayersQuery {
    name: Option<String>,
    club_name: Option<String>,
    nationality_name: Option<String>,
    position: Option<String>,
    gender: Option<String>,
    overall_min: Option<String>,
    overall_max: Option<String>,
    potential_min: Option<String>,
    potential_max: Option<String>,
    age_min: Option<String>,
    age_max: Option<String>,
    #[serde(alias = "fifa-version")]
    game_version: Option<String>,
    #[serde(alias = "fifa-update")]
    game_update: Option<String>,
    page: Option<String>,
    limit: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

impl TryFrom<ListPlayersQuery> for PlayerFilter {
    type Error = PlayerQueryError;

    fn try_from(query: ListPlayersQuery) -> Result<Self, Self::Error> {
        Ok(PlayerFilter {
            gender: non_empty(query.gender.as_deref())
                .map(parse_gender)
                .transpose()?
                .map(str::to_string),
            overall: Range::parse(
                "overall",
                query.overall_min.as_deref(),
                query.overall_max.as_deref(),
            )?,
            potential: Range::parse(
                "potential",
                query.potential_min.as_deref(),
                query.potential_max.as_deref(),
            )?,
            age: Range::parse("age", query.age_min.as_deref(), query.age_max.as_deref())?,
            page: PageRequest::parse(query.page.as_deref(), query.limit.as_deref())?,
            sort: SortSpec::parse(query.sort_by.as_deref(), query.sort_order.as_deref())?,
            name: owned(query.name),
            club_name: owned(query.club_name),
            nationality_name: owned(query.nationality_name),
            position: owned(query.position),
            game_version: ordinal(query.game_version),
            game_update: ordinal(query.game_update),
        })
    }
}

/// Details about how a listing was resolved
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingMeta {
    strategy: &'static str,
    mode: String,
    filters_applied: usize,
}

/// Response from the listing endpoint
#[derive(Serialize)]
struct ListingResponse {
    success: bool,
    data: Vec<players::Model>,
    pagination: Pagination,
    meta: ListingMeta,
}

/// GET /api/fifa-players
///
/// Lists player cards matching the query filters. Unless an exact
/// update is requested only the latest card of each player is listed
async fn list_players(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<ListPlayersQuery>,
) -> PlayersResult<Json<ListingResponse>> {
    let filter = PlayerFilter::try_from(query)?;
    let page = resolve(&db, &filter).await?;

    Ok(Json(ListingResponse {
        success: true,
        data: page.records,
        pagination: page.pagination,
        meta: ListingMeta {
            strategy: page.plan.label(),
            mode: page.mode,
            filters_applied: page.filters_applied,
        },
    }))
}

/// GET /api/fifa-players/:id
async fn get_player(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> PlayersJsonResult<players::Model> {
    let id = parse_id(&id)?;
    let card = find_player(&db, id).await?;
    Ok(success(card))
}

/// GET /api/fifa-players/versions
///
/// Lists the available game versions along with the statistics of
/// each of their updates
async fn get_versions(
    Extension(db): Extension<DatabaseConnection>,
) -> PlayersJsonResult<Vec<VersionSummary>> {
    let versions = stats::available_versions(&db).await?;
    Ok(success(versions))
}

/// GET /api/fifa-players/versions-stats
async fn get_version_stats(
    Extension(db): Extension<DatabaseConnection>,
) -> PlayersJsonResult<Vec<UpdateStats>> {
    let stats = stats::update_stats(&db).await?;
    Ok(success(stats))
}

/// Query parameters shared by the lookup and statistics endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct LookupQuery {
    q: Option<String>,
    limit: Option<String>,
    gender: Option<String>,
    #[serde(alias = "fifa-version")]
    game_version: Option<String>,
    #[serde(alias = "fifa-update")]
    game_update: Option<String>,
}

impl LookupQuery {
    fn pins(&self) -> PlayerQueryResult<LookupPins> {
        LookupPins::parse(
            self.gender.as_deref(),
            self.game_version.as_deref(),
            self.game_update.as_deref(),
        )
    }

    fn version_pins(&self) -> (Option<String>, Option<String>) {
        (
            ordinal(self.game_version.clone()),
            ordinal(self.game_update.clone()),
        )
    }
}

/// GET /api/fifa-players/overall-distribution
async fn get_overall_distribution(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<LookupQuery>,
) -> PlayersJsonResult<Vec<RatingBucket>> {
    let (game_version, game_update) = query.version_pins();
    let condition = pinned_condition(game_version.as_deref(), game_update.as_deref());
    let buckets = stats::overall_distribution(&db, condition).await?;
    Ok(success(buckets))
}

/// GET /api/fifa-players/filter-metadata
///
/// Provides the statistics used to populate listing filters
async fn get_filter_metadata(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<LookupQuery>,
) -> PlayersJsonResult<FilterMetadata> {
    let (game_version, game_update) = query.version_pins();
    let metadata =
        stats::filter_metadata(&db, game_version.as_deref(), game_update.as_deref()).await?;
    Ok(success(metadata))
}

/// GET /api/fifa-players/top-rated
async fn get_top_rated(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<LookupQuery>,
) -> PlayersJsonResult<Vec<players::Model>> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_TOP_RATED, MAX_TOP_RATED)?;
    let pins = query.pins()?;
    let cards = search::top_rated(&db, limit, &pins).await?;
    Ok(success(cards))
}

/// GET /api/fifa-players/search
async fn search_players(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<LookupQuery>,
) -> PlayersJsonResult<Vec<players::Model>> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT)?;
    let pins = query.pins()?;
    let term = query.q.as_deref().unwrap_or_default();
    let cards = search::search(&db, term, limit, &pins).await?;
    Ok(success(cards))
}

/// GET /api/fifa-players/stats/:id
async fn get_player_stats(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> PlayersJsonResult<PlayerStats> {
    let id = parse_id(&id)?;
    let stats = profile::player_stats(&db, id).await?;
    Ok(success(stats))
}

/// GET /api/fifa-players/:id/radar
async fn get_player_radar(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> PlayersJsonResult<PlayerRadar> {
    let id = parse_id(&id)?;
    let radar = profile::player_radar(&db, id).await?;
    Ok(success(radar))
}

#[derive(Debug, Default, Deserialize)]
struct TimelineQuery {
    skill: Option<String>,
}

/// GET /api/fifa-players/:id/timeline
///
/// Lists the progression of the player across game versions, either
/// of every stat or of a single skill
async fn get_player_timeline(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> PlayersJsonResult<PlayerTimeline> {
    let id = parse_id(&id)?;
    let skill = non_empty(query.skill.as_deref());
    let timeline = profile::player_timeline(&db, id, skill).await?;
    Ok(success(timeline))
}

fn json_payload(
    payload: Result<Json<PlayerPayload>, JsonRejection>,
) -> PlayerQueryResult<PlayerPayload> {
    payload
        .map(|Json(payload)| payload)
        .map_err(|err| PlayerQueryError::InvalidArgument(err.body_text()))
}

/// POST /api/fifa-players
async fn create_player(
    Extension(db): Extension<DatabaseConnection>,
    payload: Result<Json<PlayerPayload>, JsonRejection>,
) -> PlayersResult<(StatusCode, Json<Success<players::Model>>)> {
    let payload = json_payload(payload)?;
    let card = payload::create_player(&db, payload).await?;
    Ok((StatusCode::CREATED, success(card)))
}

/// PUT /api/fifa-players/:id
async fn update_player(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
    payload: Result<Json<PlayerPayload>, JsonRejection>,
) -> PlayersJsonResult<players::Model> {
    let id = parse_id(&id)?;
    let payload = json_payload(payload)?;
    let card = payload::update_player(&db, id, payload).await?;
    Ok(success(card))
}

#[derive(Serialize)]
struct DeletedResponse {
    deleted: bool,
    id: PlayerID,
}

/// DELETE /api/fifa-players/:id
async fn delete_player(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<String>,
) -> PlayersJsonResult<DeletedResponse> {
    let id = parse_id(&id)?;
    payload::delete_player(&db, id).await?;
    Ok(success(DeletedResponse { deleted: true, id }))
}

/// Envelope wrapping error responses
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetails,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetails {
    code: &'static str,
    message: String,
    status_code: u16,
}

/// IntoResponse implementation for PlayerQueryError to allow it to be
/// used within the result type as a error response
impl IntoResponse for PlayerQueryError {
    #[inline]
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match &self {
            Self::StoreUnavailable(err) | Self::Internal(err) => {
                error!("Failed to query player cards: {:?}", err);
                if EXPOSE_ERRORS.load(Ordering::Relaxed) {
                    err.to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorDetails {
                code,
                message,
                status_code: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}
