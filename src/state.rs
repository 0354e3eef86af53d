use crate::db::{DbPool, OrmConn};

/// Shared handles cloned into every handler: the sqlx pool serves the
/// straight-line reads (listings, lookups, the cart aggregation join),
/// the SeaORM connection the transactional recipe writes.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}
