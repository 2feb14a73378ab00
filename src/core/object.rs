use crate::core::exec::{CmdIo, ExecError};
use crate::core::hash::Hash;
use crate::core::repository::{GitError, Repository};
use crate::utils::cancel::CancelToken;
use std::fmt;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncWrite};

/// Kind of a Git object, spelled the way git spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Blob,
    Commit,
    Tree,
}

impl Type {
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Blob => "blob",
            Type::Commit => "commit",
            Type::Tree => "tree",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Type::Blob),
            "commit" => Ok(Type::Commit),
            "tree" => Ok(Type::Tree),
            _ => Err(format!("unknown object type: {}", s)),
        }
    }
}

impl Repository {
    /// Stream the contents of object `hash` into `dst`.
    pub async fn read_object<W>(
        &self,
        cancel: &CancelToken,
        typ: Type,
        hash: &Hash,
        dst: &mut W,
    ) -> Result<(), GitError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let cmd = self.git_cmd(["cat-file", typ.as_str(), hash.as_str()]);
        self.execer()
            .run(
                &cmd,
                CmdIo {
                    stdin: None,
                    stdout: Some(dst),
                },
                cancel,
            )
            .await
            .map_err(GitError::during("reading object"))
    }

    /// Read object `hash` fully into memory.
    pub async fn read_object_bytes(
        &self,
        cancel: &CancelToken,
        typ: Type,
        hash: &Hash,
    ) -> Result<Vec<u8>, GitError> {
        let mut buf = Vec::new();
        self.read_object(cancel, typ, hash, &mut buf).await?;
        Ok(buf)
    }

    /// Store the bytes read from `src` as an object of type `typ`
    /// and return its hash.
    pub async fn write_object<R>(
        &self,
        cancel: &CancelToken,
        typ: Type,
        src: &mut R,
    ) -> Result<Hash, GitError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let cmd = self.git_cmd(["hash-object", "-w", "--stdin", "-t", typ.as_str()]);
        let mut out: Vec<u8> = Vec::new();
        self.execer()
            .run(
                &cmd,
                CmdIo {
                    stdin: Some(src),
                    stdout: Some(&mut out),
                },
                cancel,
            )
            .await
            .map_err(GitError::during("writing object"))?;

        let hash = String::from_utf8_lossy(&out).trim().to_string();
        if hash.is_empty() {
            return Err(GitError::new(
                "writing object",
                ExecError::NoOutput {
                    command: cmd.to_string(),
                },
            ));
        }
        Ok(Hash::from(hash))
    }
}
