use crate::cli::{complete, Shell, PROGRAM};

pub fn run(shell: Shell) -> anyhow::Result<()> {
    print!("{}", complete::script(shell, PROGRAM));
    Ok(())
}
