//! User directory handlers.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::SearchQuery;
use crate::dto::response::SearchResult;
use crate::state::AppState;

/// GET /api/users/search?query=
///
/// Case-insensitive substring search over username, display name, and
/// phone, each hit annotated with live presence from the relay.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let results = state
        .users
        .search(&params.query)
        .into_iter()
        .map(|user| SearchResult {
            online: state.relay.is_online(user.id),
            profile: user.profile(),
        })
        .collect();

    Json(results)
}
