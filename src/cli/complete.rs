//! Shell completion.
//!
//! The generated scripts ask the shell to run `gs` itself with the line being
//! edited in `COMP_LINE` (and the cursor in `COMP_POINT`); `gs` then prints one
//! candidate per line. Shorthands are expanded before predicting, so
//! `gs bc <TAB>` completes like `gs branch create <TAB>`.

use crate::cli::{Shell, ShorthandTable};
use crate::core::{Repository, SystemExecer};
use crate::utils::cancel::CancelToken;
use clap::{Arg, Command};
use log::debug;
use std::path::Path;
use std::sync::Arc;

pub fn script(shell: Shell, program: &str) -> String {
    match shell {
        Shell::Bash => format!("complete -o default -C {program} {program}\n"),
        Shell::Zsh => format!(
            "autoload -U +X bashcompinit && bashcompinit\ncomplete -o nospace -C {program} {program}\n"
        ),
        Shell::Fish => format!(
            "complete -c {program} -f -a '(env COMP_LINE=(commandline -cp) {program})'\n"
        ),
    }
}

/// The line to complete, if the shell asked for completions.
pub fn requested() -> Option<(String, Option<usize>)> {
    let line = std::env::var("COMP_LINE").ok()?;
    let point = std::env::var("COMP_POINT").ok().and_then(|p| p.parse().ok());
    Some((line, point))
}

/// The words before the cursor, split into finished words and the one being typed.
#[derive(Debug, PartialEq, Eq)]
pub struct Request {
    pub completed: Vec<String>,
    pub last: String,
}

impl Request {
    /// Words are split on whitespace; shell quoting is not interpreted, so a
    /// quoted argument containing spaces counts as several words.
    pub fn parse(line: &str, point: Option<usize>) -> Self {
        let line = match point {
            Some(p) if p <= line.len() && line.is_char_boundary(p) => &line[..p],
            _ => line,
        };

        let mut words: Vec<String> = line.split_whitespace().skip(1).map(String::from).collect();
        let last = if line.ends_with(char::is_whitespace) || words.is_empty() {
            String::new()
        } else {
            words.pop().unwrap_or_default()
        };
        Request {
            completed: words,
            last,
        }
    }
}

/// What to offer for the word being typed.
#[derive(Debug, PartialEq, Eq)]
pub enum Suggestion {
    Words(Vec<String>),
    Branches,
    Remotes,
    Dirs,
}

/// Decide what can follow `req.completed` in `root`.
pub fn suggest(root: &Command, shorthands: &ShorthandTable, req: &Request) -> Suggestion {
    let words = shorthands.expand(req.completed.clone());

    let mut path: Vec<&Command> = vec![root];
    let mut positionals = 0;
    let mut pending: Option<&Arg> = None;
    for word in &words {
        if pending.take().is_some() {
            continue;
        }
        if word.starts_with('-') {
            if !word.contains('=') {
                pending = find_flag(&path, word).filter(|arg| arg.get_action().takes_values());
            }
            continue;
        }
        let cur = path[path.len() - 1];
        match cur.find_subcommand(word) {
            Some(sub) => {
                path.push(sub);
                positionals = 0;
            }
            None => positionals += 1,
        }
    }

    if let Some(arg) = pending {
        return suggest_value(arg);
    }

    let cur = path[path.len() - 1];
    if req.last.starts_with('-') {
        return Suggestion::Words(flags(&path));
    }

    if cur.has_subcommands() {
        let mut names = Vec::new();
        for sub in cur.get_subcommands().filter(|sub| !sub.is_hide_set()) {
            names.push(sub.get_name().to_string());
            names.extend(sub.get_visible_aliases().map(String::from));
        }
        if path.len() == 1 {
            names.extend(shorthands.iter().map(|(k, _)| k.to_string()));
        }
        return Suggestion::Words(names);
    }

    match cur.get_positionals().nth(positionals) {
        Some(arg) => suggest_value(arg),
        None => Suggestion::Words(Vec::new()),
    }
}

fn find_flag<'a>(path: &[&'a Command], word: &str) -> Option<&'a Arg> {
    let mut args = path.iter().copied().flat_map(Command::get_arguments);
    if let Some(long) = word.strip_prefix("--") {
        return args.find(|arg| arg.get_long() == Some(long));
    }
    let mut chars = word.chars().skip(1);
    match (chars.next(), chars.next()) {
        (Some(short), None) => args.find(|arg| arg.get_short() == Some(short)),
        _ => None,
    }
}

fn flags(path: &[&Command]) -> Vec<String> {
    let last = path.len() - 1;
    let mut flags = Vec::new();
    for (i, cmd) in path.iter().enumerate() {
        for arg in cmd.get_arguments() {
            if arg.is_positional() || arg.is_hide_set() || (i != last && !arg.is_global_set()) {
                continue;
            }
            if let Some(long) = arg.get_long() {
                flags.push(format!("--{long}"));
            }
        }
    }
    flags.push("--help".to_string());
    flags
}

fn suggest_value(arg: &Arg) -> Suggestion {
    let values = arg.get_possible_values();
    if !values.is_empty() {
        return Suggestion::Words(values.iter().map(|v| v.get_name().to_string()).collect());
    }

    let value_name = arg
        .get_value_names()
        .and_then(|names| names.first())
        .map(|name| name.as_str());
    match value_name {
        Some("BRANCH") => Suggestion::Branches,
        Some("REMOTE") => Suggestion::Remotes,
        Some("DIR") => Suggestion::Dirs,
        _ => Suggestion::Words(Vec::new()),
    }
}

/// Candidates for the completion request `line`, filtered by the word being typed.
pub async fn respond(
    root: &Command,
    shorthands: &ShorthandTable,
    line: &str,
    point: Option<usize>,
    cancel: &CancelToken,
) -> Vec<String> {
    let req = Request::parse(line, point);
    let candidates = match suggest(root, shorthands, &req) {
        Suggestion::Words(words) => words,
        Suggestion::Dirs => directories(&req.last),
        Suggestion::Branches => git_names(true, cancel).await,
        Suggestion::Remotes => git_names(false, cancel).await,
    };

    candidates
        .into_iter()
        .filter(|c| c.starts_with(&req.last))
        .collect()
}

/// Local branch or remote names of the repository in the current directory.
async fn git_names(branches: bool, cancel: &CancelToken) -> Vec<String> {
    let listed = match Repository::open(".", Arc::new(SystemExecer), cancel).await {
        Ok(repo) if branches => repo.local_branches(cancel).await,
        Ok(repo) => repo.remotes(cancel).await,
        Err(err) => Err(err),
    };
    listed.unwrap_or_else(|err| {
        debug!("completion: {}", err);
        Vec::new()
    })
}

fn directories(prefix: &str) -> Vec<String> {
    let (dir, shown) = match prefix.rfind('/') {
        Some(i) => (&prefix[..=i], &prefix[..=i]),
        None => (".", ""),
    };
    let Ok(entries) = std::fs::read_dir(Path::new(dir)) else {
        return Vec::new();
    };

    let mut dirs: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .map(|name| format!("{shown}{name}/"))
        .collect();
    dirs.sort();
    dirs
}
