//! External process execution.

pub mod runner;
pub mod stream;

pub use runner::{
    CapturedOutput, CommandSpec, ProcessRunner, SystemRunner, check_git_installed, get_timeout,
};
pub use stream::{ChildLineStream, LineStream};
