use crate::commands::Context;
use crate::core::{CommitRequest, RepoState, StoreError};
use colored::*;

pub async fn create(ctx: &Context<'_>, name: &str, message: Option<&str>) -> anyhow::Result<()> {
    validate_branch_name(name)?;
    let repo = ctx.repository().await?;

    repo.create_branch(&ctx.cancel, name).await?;
    if let Some(message) = message {
        repo.commit(
            &ctx.cancel,
            CommitRequest {
                message: Some(message),
                ..Default::default()
            },
        )
        .await?;
    }

    println!("{} {}", "Created branch:".green(), name.bright_cyan());
    Ok(())
}

pub async fn checkout(ctx: &Context<'_>, name: &str) -> anyhow::Result<()> {
    let repo = ctx.repository().await?;
    repo.checkout_branch(&ctx.cancel, name).await?;
    println!("{} {}", "Switched to branch:".green(), name.bright_cyan());
    Ok(())
}

pub async fn delete(ctx: &Context<'_>, name: &str, force: bool) -> anyhow::Result<()> {
    let repo = ctx.repository().await?;

    match RepoState::load(&repo, &ctx.cancel).await {
        Ok(state) if state.trunk == name => {
            anyhow::bail!("refusing to delete trunk branch {:?}", name)
        }
        Ok(_) | Err(StoreError::NotInitialized) => {}
        Err(err) => return Err(err.into()),
    }

    repo.delete_branch(&ctx.cancel, name, force).await?;
    println!("{} {}", "Deleted branch:".green(), name.bright_red());
    Ok(())
}

fn validate_branch_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() {
        anyhow::bail!("branch name cannot be empty");
    }

    let invalid_chars = ['~', '^', ':', '?', '*', '[', '\\', ' ', '\t', '\n'];
    if name.chars().any(|c| invalid_chars.contains(&c)) {
        anyhow::bail!("branch name {:?} contains invalid characters", name);
    }

    if name.starts_with('-') || name.ends_with('.') || name.ends_with('/') || name.contains("..") {
        anyhow::bail!("invalid branch name {:?}", name);
    }

    if name == "HEAD" {
        anyhow::bail!("branch name {:?} is reserved", name);
    }

    Ok(())
}
