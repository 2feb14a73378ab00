use crate::commands::Context;
use crate::core::RepoState;
use anyhow::Context as _;
use colored::*;
use log::debug;
use std::io::Write;

pub async fn init(
    ctx: &Context<'_>,
    trunk: Option<String>,
    remote: Option<String>,
) -> anyhow::Result<()> {
    let repo = ctx.repository().await?;

    let trunk = match trunk {
        Some(trunk) => trunk,
        None => {
            let current = repo
                .current_branch(&ctx.cancel)
                .await
                .context("could not guess trunk; use --trunk")?;
            if ctx.prompt {
                ask("Trunk branch", &current)?
            } else {
                current
            }
        }
    };

    let branches = repo.local_branches(&ctx.cancel).await?;
    if !branches.is_empty() && !branches.contains(&trunk) {
        anyhow::bail!("trunk branch {:?} does not exist", trunk);
    }

    if let Some(remote) = &remote {
        let remotes = repo.remotes(&ctx.cancel).await?;
        if !remotes.contains(remote) {
            anyhow::bail!("remote {:?} does not exist", remote);
        }
    }

    let state = RepoState { trunk, remote };
    let hash = state.save(&repo, &ctx.cancel).await?;
    debug!("stored repository state at {}", hash);

    println!(
        "{} {} {}",
        "Initialized repository".green(),
        "with trunk".bright_black(),
        state.trunk.bright_cyan()
    );
    Ok(())
}

/// Ask for a value on stdin, falling back to `default` on an empty answer.
fn ask(question: &str, default: &str) -> anyhow::Result<String> {
    print!("{} {}: ", question.yellow(), format!("[{}]", default).bright_black());
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}
