// HTTP handlers in two tiers: public (no auth) and protected (JWT).
pub mod protected;
pub mod public;
pub mod ws;

use serde::Deserialize;

/// Common pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PagingQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}
