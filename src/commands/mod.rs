pub mod branch;
pub mod commit;
pub mod complete;
pub mod dump_md;
pub mod repo;
pub mod trunk;

use crate::cli::{BranchCommand, Commands, CommitCommand, RepoCommand, ShorthandTable};
use crate::core::{Repository, SystemExecer};
use crate::utils::cancel::CancelToken;
use std::sync::Arc;

/// State shared by every command of one invocation.
pub struct Context<'a> {
    pub cancel: CancelToken,
    pub shorthands: &'a ShorthandTable,
    pub prompt: bool,
}

impl Context<'_> {
    /// Open the repository containing the current directory.
    pub async fn repository(&self) -> anyhow::Result<Repository> {
        Ok(Repository::open(".", Arc::new(SystemExecer), &self.cancel).await?)
    }
}

pub async fn run(command: Commands, ctx: &Context<'_>) -> anyhow::Result<()> {
    match command {
        Commands::Repo(RepoCommand::Init { trunk, remote }) => repo::init(ctx, trunk, remote).await,
        Commands::Branch(BranchCommand::Create { name, message }) => {
            branch::create(ctx, &name, message.as_deref()).await
        }
        Commands::Branch(BranchCommand::Checkout { branch }) => branch::checkout(ctx, &branch).await,
        Commands::Branch(BranchCommand::Delete { branch, force }) => {
            branch::delete(ctx, &branch, force).await
        }
        Commands::Commit(CommitCommand::Create { all, message }) => {
            commit::create(ctx, all, message.as_deref()).await
        }
        Commands::Commit(CommitCommand::Amend {
            all,
            message,
            no_edit,
        }) => commit::amend(ctx, all, message.as_deref(), no_edit).await,
        Commands::Trunk => trunk::run(ctx).await,
        Commands::Complete { shell } => complete::run(shell),
        Commands::DumpMd => dump_md::run(ctx),
    }
}
