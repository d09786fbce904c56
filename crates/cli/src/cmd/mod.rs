mod run;
mod tasks;

pub use run::cmd_run;
pub use tasks::cmd_tasks;
