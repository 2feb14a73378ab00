//! Multi-letter shortcuts built from command aliases.
//!
//! For a command path like `branch (b) > create (c)`, the shorthand `bc`
//! expands to `branch create`. Only the first alias of each command is used.

use crate::cli::tree::CommandTree;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt::Write;
use thiserror::Error;

/// A defect in the command declarations. Never caused by user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShorthandError {
    #[error("expected an alias for {name:?} ({path})")]
    MissingAlias { name: String, path: String },
    #[error("shorthand {shorthand:?} for {path} is already in use by {other}")]
    Duplicate {
        shorthand: String,
        path: String,
        other: String,
    },
    #[error("shorthand {shorthand:?} for {path} shadows top-level command {command:?}")]
    ShadowsCommand {
        shorthand: String,
        path: String,
        command: String,
    },
}

/// Shorthand token to the arguments it stands for.
#[derive(Debug, Clone, Default)]
pub struct ShorthandTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl ShorthandTable {
    /// Derive shorthands for every aliased leaf of `tree`, on top of the
    /// hand-written `seeded` entries.
    pub fn derive<I, K, V>(tree: &CommandTree, seeded: I) -> Result<Self, ShorthandError>
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: BTreeMap<String, Vec<String>> = seeded
            .into_iter()
            .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
            .collect();

        for leaf in tree.leaves() {
            if tree.node(leaf).aliases.is_empty() {
                continue;
            }

            let mut fragments = Vec::new();
            let mut names = Vec::new();
            let mut cur = Some(leaf);
            while let Some(id) = cur {
                let node = tree.node(id);
                let alias = node
                    .aliases
                    .first()
                    .ok_or_else(|| ShorthandError::MissingAlias {
                        name: node.name.clone(),
                        path: tree.path(id).join(" "),
                    })?;
                fragments.push(alias.as_str());
                names.push(node.name.clone());
                cur = node.parent();
            }
            if fragments.len() < 2 {
                // Single-word commands are already as short as they get.
                continue;
            }

            fragments.reverse();
            names.reverse();
            let shorthand = fragments.concat();
            if let Some(other) = entries.get(&shorthand) {
                return Err(ShorthandError::Duplicate {
                    shorthand,
                    path: names.join(" "),
                    other: other.join(" "),
                });
            }
            entries.insert(shorthand, names);
        }

        check_top_level(tree, &entries)?;
        Ok(Self { entries })
    }

    pub fn get(&self, shorthand: &str) -> Option<&[String]> {
        self.entries.get(shorthand).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by shorthand.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Replace a leading shorthand with the arguments it stands for.
    ///
    /// Anything else passes through untouched, including arguments that
    /// are not valid Unicode.
    pub fn expand<S>(&self, mut args: Vec<S>) -> Vec<S>
    where
        S: AsRef<OsStr> + From<String>,
    {
        let path = args
            .first()
            .and_then(|first| first.as_ref().to_str())
            .and_then(|first| self.entries.get(first));
        if let Some(path) = path {
            args.splice(0..1, path.iter().cloned().map(S::from));
        }
        args
    }

    /// Note appended to the top-level help.
    pub fn help_note(&self, program: &str) -> String {
        let mut note = String::from("Aliases can be combined to form shorthands for commands. For example:\n");
        for example in ["bc", "cc"] {
            if let Some(path) = self.get(example) {
                let _ = writeln!(note, "  {program} {example} => {program} {}", path.join(" "));
            }
        }
        note
    }
}

/// A shorthand equal to a top-level name or alias would make that command unreachable.
fn check_top_level(
    tree: &CommandTree,
    entries: &BTreeMap<String, Vec<String>>,
) -> Result<(), ShorthandError> {
    for &root in tree.roots() {
        let node = tree.node(root);
        for word in std::iter::once(&node.name).chain(&node.aliases) {
            if let Some(path) = entries.get(word) {
                return Err(ShorthandError::ShadowsCommand {
                    shorthand: word.clone(),
                    path: path.join(" "),
                    command: node.name.clone(),
                });
            }
        }
    }
    Ok(())
}
