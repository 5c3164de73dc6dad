use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Username: 3-20 letters, digits or underscores, not all digits
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountCreateError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = AccountCreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let service = ctx.service().await?;
        service.create_account(&self.username).await?;
        Ok(format!("Created account {}", self.username))
    }
}
