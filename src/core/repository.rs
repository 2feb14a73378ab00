use crate::core::exec::{ExecError, Execer, GitCmd};
use crate::core::hash::Hash;
use crate::utils::cancel::CancelToken;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// A failed git operation, named after what we were trying to do.
#[derive(Error, Debug)]
#[error("{op}: {source}")]
pub struct GitError {
    op: &'static str,
    #[source]
    source: ExecError,
}

impl GitError {
    pub fn new(op: &'static str, source: ExecError) -> Self {
        Self { op, source }
    }

    /// Adapter for `map_err`.
    pub fn during(op: &'static str) -> impl FnOnce(ExecError) -> GitError {
        move |source| GitError::new(op, source)
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}

/// Options for [`Repository::commit`].
#[derive(Debug, Default, Clone)]
pub struct CommitRequest<'a> {
    pub message: Option<&'a str>,
    pub all: bool,
    pub amend: bool,
    pub no_edit: bool,
}

/// A git work tree, operated on by running the git executable.
///
/// Holds no mutable state; concurrent callers that need consistency
/// across several operations must coordinate among themselves.
pub struct Repository {
    root: PathBuf,
    git: OsString,
    exec: Arc<dyn Execer>,
}

impl Repository {
    /// Open the repository containing `dir`, using the `git` on `PATH`.
    pub async fn open(
        dir: impl AsRef<Path>,
        exec: Arc<dyn Execer>,
        cancel: &CancelToken,
    ) -> Result<Self, GitError> {
        Self::open_with_git(dir, "git", exec, cancel).await
    }

    /// Open the repository containing `dir` with the given git executable,
    /// which is used for every later operation as well.
    pub async fn open_with_git(
        dir: impl AsRef<Path>,
        git: impl Into<OsString>,
        exec: Arc<dyn Execer>,
        cancel: &CancelToken,
    ) -> Result<Self, GitError> {
        let git = git.into();
        let root = GitCmd::new(git.clone())
            .args(["rev-parse", "--show-toplevel"])
            .dir(dir.as_ref())
            .output_string(exec.as_ref(), cancel)
            .await
            .map_err(GitError::during("opening repository"))?;

        Ok(Self::at(root, exec).with_git(git))
    }

    /// Use `root` as the work tree without checking it.
    pub fn at(root: impl Into<PathBuf>, exec: Arc<dyn Execer>) -> Self {
        Self {
            root: root.into(),
            git: OsString::from("git"),
            exec,
        }
    }

    /// Use a different git executable.
    pub fn with_git(mut self, git: impl Into<OsString>) -> Self {
        self.git = git.into();
        self
    }

    pub fn execer(&self) -> &dyn Execer {
        self.exec.as_ref()
    }

    pub(crate) fn git_cmd<I, S>(&self, args: I) -> GitCmd
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GitCmd::new(self.git.clone()).args(args).dir(&self.root)
    }

    pub async fn current_branch(&self, cancel: &CancelToken) -> Result<String, GitError> {
        self.git_cmd(["symbolic-ref", "--short", "HEAD"])
            .output_string(self.execer(), cancel)
            .await
            .map_err(GitError::during("looking up current branch"))
    }

    pub async fn local_branches(&self, cancel: &CancelToken) -> Result<Vec<String>, GitError> {
        let out = self
            .git_cmd(["for-each-ref", "--format=%(refname:short)", "refs/heads/"])
            .output_string(self.execer(), cancel)
            .await
            .map_err(GitError::during("listing branches"))?;
        Ok(non_empty_lines(&out))
    }

    pub async fn remotes(&self, cancel: &CancelToken) -> Result<Vec<String>, GitError> {
        let out = self
            .git_cmd(["remote"])
            .output_string(self.execer(), cancel)
            .await
            .map_err(GitError::during("listing remotes"))?;
        Ok(non_empty_lines(&out))
    }

    /// Create `name` at HEAD and switch to it.
    pub async fn create_branch(&self, cancel: &CancelToken, name: &str) -> Result<(), GitError> {
        self.git_cmd(["checkout", "-b", name])
            .run(self.execer(), cancel)
            .await
            .map_err(GitError::during("creating branch"))
    }

    pub async fn checkout_branch(&self, cancel: &CancelToken, name: &str) -> Result<(), GitError> {
        self.git_cmd(["checkout", name])
            .run(self.execer(), cancel)
            .await
            .map_err(GitError::during("checking out branch"))
    }

    pub async fn delete_branch(
        &self,
        cancel: &CancelToken,
        name: &str,
        force: bool,
    ) -> Result<(), GitError> {
        let flag = if force { "-D" } else { "-d" };
        self.git_cmd(["branch", flag, name])
            .run(self.execer(), cancel)
            .await
            .map_err(GitError::during("deleting branch"))
    }

    /// Commit staged changes. Without a message, git opens the editor.
    pub async fn commit(
        &self,
        cancel: &CancelToken,
        req: CommitRequest<'_>,
    ) -> Result<(), GitError> {
        let mut cmd = self.git_cmd(["commit"]);
        if req.all {
            cmd = cmd.arg("-a");
        }
        if req.amend {
            cmd = cmd.arg("--amend");
        }
        if req.no_edit {
            cmd = cmd.arg("--no-edit");
        }
        match req.message {
            Some(message) => cmd = cmd.arg("-m").arg(message),
            None if !req.no_edit => cmd = cmd.interactive(),
            None => {}
        }

        cmd.run(self.execer(), cancel)
            .await
            .map_err(GitError::during("committing"))
    }

    /// Resolve a ref to the object it points at, or `None` if it does not exist.
    pub async fn peel_ref(
        &self,
        cancel: &CancelToken,
        refname: &str,
    ) -> Result<Option<Hash>, GitError> {
        let res = self
            .git_cmd(["rev-parse", "--verify", "--quiet", refname])
            .output_string(self.execer(), cancel)
            .await;
        match res {
            Ok(out) if out.is_empty() => Ok(None),
            Ok(out) => Ok(Some(Hash::from(out))),
            Err(err) if err.exit_code() == Some(1) => Ok(None),
            Err(err) => Err(GitError::new("resolving ref", err)),
        }
    }

    pub async fn set_ref(
        &self,
        cancel: &CancelToken,
        refname: &str,
        hash: &Hash,
    ) -> Result<(), GitError> {
        self.git_cmd(["update-ref", refname, hash.as_str()])
            .run(self.execer(), cancel)
            .await
            .map_err(GitError::during("updating ref"))
    }
}

fn non_empty_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
