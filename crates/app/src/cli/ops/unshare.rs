use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

/// Drop a share someone gave you. The owner's files are untouched.
#[derive(Args, Debug, Clone)]
pub struct Unshare {
    /// Shared path as listed by `shared`: `<owner>/<path>`
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UnshareError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Unshare {
    type Error = UnshareError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;
        let view = service.revoke_share(user, &self.path).await?;
        Ok(format!(
            "Removed share {}\n{}",
            self.path.trim_matches('/'),
            super::shared::render(&view)
        ))
    }
}
