use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// Path of the file or folder to remove, with everything below it
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = RmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;
        service.delete(user, &self.path).await?;
        Ok(format!("Removed /{}", self.path.trim_matches('/')))
    }
}
