use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Path of the folder to create; its parent must exist
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MkdirError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mkdir {
    type Error = MkdirError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;
        service.create_folder(user, &self.path).await?;
        Ok(format!("Created folder /{}", self.path.trim_matches('/')))
    }
}
