use crate::cli::run;

pub mod cli;
mod config;
pub mod domain;
pub mod feedback;
pub mod form;
pub mod http;
pub mod provider;
pub mod reconcile;
pub mod widget;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}
