//! Schema Service

use super::EtlContext;
use crate::error::Result;
use tracing::info;

/// Table creation, run once at the head of every workflow
pub struct SchemaService;

impl SchemaService {
    pub async fn create_tables(ctx: &EtlContext) -> Result<()> {
        let db = ctx.db.clone();
        tokio::task::spawn_blocking(move || db.init_schema()).await??;
        info!("Tables ready at {}", ctx.db.path().display());
        Ok(())
    }
}
