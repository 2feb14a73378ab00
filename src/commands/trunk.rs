use crate::commands::Context;
use crate::core::RepoState;
use colored::*;

pub async fn run(ctx: &Context<'_>) -> anyhow::Result<()> {
    let repo = ctx.repository().await?;
    let state = RepoState::load(&repo, &ctx.cancel).await?;

    repo.checkout_branch(&ctx.cancel, &state.trunk).await?;
    println!("{} {}", "Switched to trunk:".green(), state.trunk.bright_cyan());
    Ok(())
}
