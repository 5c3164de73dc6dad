use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

/// Forget shares whose files were deleted or moved by their owner
#[derive(Args, Debug, Clone)]
pub struct PruneShares;

#[derive(Debug, thiserror::Error)]
pub enum PruneSharesError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for PruneShares {
    type Error = PruneSharesError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;
        let dropped = service.prune_shares(user).await?;
        Ok(match dropped {
            0 => "No dangling shares".to_string(),
            1 => "Pruned 1 dangling share".to_string(),
            n => format!("Pruned {} dangling shares", n),
        })
    }
}
