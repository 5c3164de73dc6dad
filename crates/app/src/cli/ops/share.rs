use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Share {
    /// User to share with
    pub target: String,

    /// Path of the file or folder to share
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Share {
    type Error = ShareError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;
        service.share(user, &self.target, &self.path).await?;
        Ok(format!(
            "Shared /{} with {}",
            self.path.trim_matches('/'),
            self.target
        ))
    }
}
