use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Delete {
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountDeleteError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Delete {
    type Error = AccountDeleteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let service = ctx.service().await?;
        service.delete_account(&self.username).await?;
        Ok(format!(
            "Deleted account {}. Shares others received from it no longer resolve.",
            self.username
        ))
    }
}
