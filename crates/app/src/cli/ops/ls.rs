use clap::Args;
use common::prelude::{Node, Scope, ServiceError};

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Path to list (defaults to root). With --shared, paths start
    /// with the owner: `alice/docs`
    #[arg(default_value = "")]
    pub path: String,

    /// List what other users shared with you
    #[arg(long)]
    pub shared: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;

        if self.shared && self.path.trim_matches('/').is_empty() {
            let view = service.shared_items(user).await?;
            return Ok(super::shared::render(&view));
        }

        let scope = if self.shared {
            Scope::Shared
        } else {
            Scope::Owned
        };
        let node = service.node(user, &self.path, scope).await?;

        match node.children() {
            Some(children) if children.is_empty() => Ok("No items found".to_string()),
            Some(children) => Ok(children
                .values()
                .map(describe)
                .collect::<Vec<_>>()
                .join("\n")),
            None => Ok(describe(&node)),
        }
    }
}

/// One line per node: folders end in `/`, files show size and content id
pub fn describe(node: &Node) -> String {
    match node.file_ref() {
        Some(file_ref) => format!(
            "{} ({} bytes) [{}]",
            node.name(),
            file_ref.size,
            file_ref.content_id
        ),
        None => format!("{}/", node.name()),
    }
}

#[cfg(test)]
mod test {
    use common::prelude::{ContentId, FileRef};

    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&Node::folder("docs")), "docs/");

        let file = Node::file(
            "report.pdf",
            FileRef::new(ContentId::from("Qm1"), 10, "report.pdf"),
        );
        assert_eq!(describe(&file), "report.pdf (10 bytes) [Qm1]");
    }
}
