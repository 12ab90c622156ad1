pub type CmdResult<T> = switchman::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod agent;
pub mod nodes;
pub mod route;
pub mod trigger;
