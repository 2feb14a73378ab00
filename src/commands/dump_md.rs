use crate::cli::{self, ShorthandTable, PROGRAM};
use crate::commands::Context;
use clap::Command;
use std::fmt::Write;

pub fn run(ctx: &Context<'_>) -> anyhow::Result<()> {
    print!("{}", render(&cli::command(ctx.shorthands), ctx.shorthands));
    Ok(())
}

/// Markdown reference of every visible command, followed by the shorthands.
pub fn render(root: &Command, shorthands: &ShorthandTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {PROGRAM}\n");
    if let Some(about) = root.get_about() {
        let _ = writeln!(out, "{about}\n");
    }

    let _ = writeln!(out, "## Commands\n");
    render_commands(&mut out, root, &mut vec![PROGRAM.to_string()]);

    let _ = writeln!(out, "## Shorthands\n");
    let _ = writeln!(out, "| Shorthand | Expands to |");
    let _ = writeln!(out, "| --- | --- |");
    for (key, path) in shorthands.iter() {
        let _ = writeln!(out, "| `{PROGRAM} {key}` | `{PROGRAM} {}` |", path.join(" "));
    }
    out
}

fn render_commands(out: &mut String, cmd: &Command, path: &mut Vec<String>) {
    for sub in cmd.get_subcommands().filter(|sub| !sub.is_hide_set()) {
        path.push(sub.get_name().to_string());
        if sub.has_subcommands() {
            render_commands(out, sub, path);
        } else {
            let _ = writeln!(out, "### {}\n", path.join(" "));
            let aliases: Vec<_> = sub.get_visible_aliases().collect();
            if !aliases.is_empty() {
                let _ = writeln!(out, "Aliases: `{}`\n", aliases.join("`, `"));
            }
            if let Some(about) = sub.get_about() {
                let _ = writeln!(out, "{about}\n");
            }
        }
        path.pop();
    }
}
