use clap::Args;
use common::prelude::{ServiceError, SharedView};

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Shared;

#[derive(Debug, thiserror::Error)]
pub enum SharedError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Shared {
    type Error = SharedError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;
        let view = service.shared_items(user).await?;
        Ok(render(&view))
    }
}

/// Shared items grouped by owner, addressed the way `--shared`
///  commands expect them
pub fn render(view: &SharedView) -> String {
    if view.is_empty() {
        return "Nothing shared with you".to_string();
    }

    view.iter()
        .flat_map(|(owner, items)| {
            items.iter().map(move |item| {
                let kind = if item.is_folder { "folder" } else { "file" };
                format!("{}/{} ({})", owner, item.path, kind)
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
