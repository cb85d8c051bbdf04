#[path = "../common/mod.rs"]
mod common;

mod concurrent_reload;
mod scenario_validation;
