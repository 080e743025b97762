pub mod accounts;
pub mod cli;
pub mod collectors;
pub mod hosts;
pub mod provider;
pub mod record;
pub mod regions;
pub mod runner;
pub mod sink;
pub mod summary;
