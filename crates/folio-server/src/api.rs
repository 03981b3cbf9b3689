//! JSON query endpoints.

use axum::extract::State;
use axum::response::Json;
use folio_core::PortfolioSnapshot;

use crate::server::AppState;

/// GET /api/portfolio
///
/// Reads the shared balance without waiting on the generator; two calls
/// with no tick in between return the same value.
pub async fn portfolio(State(state): State<AppState>) -> Json<PortfolioSnapshot> {
    Json(state.value.snapshot())
}
