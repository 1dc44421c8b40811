//! 应用生命周期：装配、HTTP 服务与优雅关闭

pub mod server;
pub mod shutdown;
pub mod startup;

pub use server::run_server;
pub use startup::{StartupContext, prepare_server_startup};
