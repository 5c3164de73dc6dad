use std::error::Error;
use std::path::PathBuf;

use common::prelude::TreeService;

use crate::state::{AppState, StateError};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("no user given. Pass --user or set RESSHARE_USER")]
    NoUser,
}

#[derive(Clone, Debug)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.resshare)
    pub config_path: Option<PathBuf>,
    /// The user commands act as
    pub user: Option<String>,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>, user: Option<String>) -> Self {
        Self { config_path, user }
    }

    pub fn state(&self) -> Result<AppState, ContextError> {
        Ok(AppState::load(self.config_path.clone())?)
    }

    /// A tree service over the initialized state directory
    pub async fn service(&self) -> Result<TreeService, ContextError> {
        Ok(self.state()?.service().await?)
    }

    /// The acting user, required by every command that touches a tree
    pub fn user(&self) -> Result<&str, ContextError> {
        self.user.as_deref().ok_or(ContextError::NoUser)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
