//! CLI command implementations.

mod config;
mod doctor;
mod init;
mod list;
mod rpc;
mod serve;
mod show;

pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use list::run_list;
pub use rpc::run_rpc;
pub use serve::{app, run_serve};
pub use show::run_show;
