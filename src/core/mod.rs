pub mod exec;
pub mod hash;
pub mod object;
pub mod repository;
pub mod store;

pub use exec::{CmdIo, ExecError, Execer, GitCmd, SystemExecer};
pub use hash::Hash;
pub use object::Type;
pub use repository::{CommitRequest, GitError, Repository};
pub use store::{RepoState, StoreError};
