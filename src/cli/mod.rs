pub mod complete;
pub mod shorthand;
pub mod tree;

use clap::builder::BoolishValueParser;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

pub use shorthand::{ShorthandError, ShorthandTable};
pub use tree::{CommandNode, CommandTree};

pub const PROGRAM: &str = "gs";

#[derive(Parser, Debug)]
#[command(name = "gs", version)]
#[command(about = "gs (git-spice) is a command line tool for stacking Git branches.")]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(flatten)]
    pub globals: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Enable verbose output
    #[arg(
        short,
        long,
        global = true,
        env = "GIT_SPICE_VERBOSE",
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: bool,

    /// Change to DIR before doing anything
    #[arg(short = 'C', long = "dir", value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Whether to prompt for missing information
    #[arg(long, global = true, overrides_with = "no_prompt")]
    prompt: bool,

    #[arg(long, global = true, hide = true, overrides_with = "prompt")]
    no_prompt: bool,
}

impl GlobalOptions {
    /// Prompting defaults to on only when stdin is a terminal.
    pub fn prompt(&self) -> bool {
        if self.prompt {
            true
        } else if self.no_prompt {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the repository
    #[command(visible_alias = "r", subcommand)]
    Repo(RepoCommand),

    /// Manage branches
    #[command(visible_alias = "b", subcommand)]
    Branch(BranchCommand),

    /// Make commits
    #[command(visible_alias = "c", subcommand)]
    Commit(CommitCommand),

    /// Move to the trunk branch
    Trunk,

    /// Generate shell completion script
    Complete {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Dump a Markdown reference to stdout and quit
    #[command(name = "dump-md", hide = true)]
    DumpMd,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// Initialize a repository for stacking
    #[command(visible_alias = "i")]
    Init {
        /// Name of the trunk branch
        #[arg(long, value_name = "BRANCH")]
        trunk: Option<String>,

        /// Name of the remote to push changes to
        #[arg(long, value_name = "REMOTE")]
        remote: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BranchCommand {
    /// Create a new branch on top of the current one
    #[command(visible_alias = "c")]
    Create {
        /// Name of the new branch
        #[arg(value_name = "NAME")]
        name: String,

        /// Commit staged changes with this message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Switch to a branch
    #[command(visible_alias = "co")]
    Checkout {
        #[arg(value_name = "BRANCH")]
        branch: String,
    },

    /// Delete a branch
    #[command(visible_alias = "d")]
    Delete {
        #[arg(value_name = "BRANCH")]
        branch: String,

        /// Delete even if the branch is not merged
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CommitCommand {
    /// Create a new commit
    #[command(visible_alias = "c")]
    Create {
        /// Stage all changes before committing
        #[arg(short, long)]
        all: bool,

        /// Use the given message as the commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Amend the current commit
    #[command(visible_alias = "a")]
    Amend {
        /// Stage all changes before committing
        #[arg(short, long)]
        all: bool,

        /// Use the given message as the commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Don't edit the commit message
        #[arg(long)]
        no_edit: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

/// Hand-written shorthands, checked alongside the derived ones.
pub fn seeded_shorthands() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![("can", vec!["commit", "amend", "--no-edit"])]
}

/// The clap command with the shorthand note attached to the top-level help.
pub fn command(shorthands: &ShorthandTable) -> clap::Command {
    Cli::command().after_help(shorthands.help_note(PROGRAM))
}

/// Derive the shorthand table for the declared commands.
pub fn shorthands() -> Result<ShorthandTable, ShorthandError> {
    let tree = CommandTree::from_clap(&Cli::command());
    ShorthandTable::derive(&tree, seeded_shorthands())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_are_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn declared_shorthands() {
        let table = shorthands().unwrap();
        let keys: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["bc", "bco", "bd", "ca", "can", "cc", "ri"]);
        assert_eq!(
            table.get("can").unwrap(),
            &["commit", "amend", "--no-edit"]
        );
    }

    #[test]
    fn shorthand_parses_like_full_path() {
        let table = shorthands().unwrap();
        let args = table.expand(vec![
            String::from("bc"),
            String::from("feat"),
            String::from("-m"),
            String::from("x"),
        ]);
        let cli = Cli::try_parse_from(std::iter::once(PROGRAM.to_string()).chain(args)).unwrap();
        match cli.command {
            Commands::Branch(BranchCommand::Create { name, message }) => {
                assert_eq!(name, "feat");
                assert_eq!(message.as_deref(), Some("x"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn top_level_help_mentions_shorthands() {
        let table = shorthands().unwrap();
        let help = command(&table).render_help().to_string();
        assert!(help.contains("Aliases can be combined to form shorthands for commands."));
        assert!(help.contains("gs bc => gs branch create"));
        assert!(help.contains("gs cc => gs commit create"));
    }

    #[test]
    fn explicit_prompt_flags_win() {
        let cli = Cli::try_parse_from(["gs", "--no-prompt", "trunk"]).unwrap();
        assert!(!cli.globals.prompt());
        let cli = Cli::try_parse_from(["gs", "trunk", "--prompt"]).unwrap();
        assert!(cli.globals.prompt());
    }
}
