use crate::commands::Context;
use crate::core::CommitRequest;

pub async fn create(ctx: &Context<'_>, all: bool, message: Option<&str>) -> anyhow::Result<()> {
    let repo = ctx.repository().await?;
    repo.commit(
        &ctx.cancel,
        CommitRequest {
            message,
            all,
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

pub async fn amend(
    ctx: &Context<'_>,
    all: bool,
    message: Option<&str>,
    no_edit: bool,
) -> anyhow::Result<()> {
    if no_edit && message.is_some() {
        anyhow::bail!("--message and --no-edit cannot be used together");
    }

    let repo = ctx.repository().await?;
    repo.commit(
        &ctx.cancel,
        CommitRequest {
            message,
            all,
            amend: true,
            no_edit,
        },
    )
    .await?;
    Ok(())
}
