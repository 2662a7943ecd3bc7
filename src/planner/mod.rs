pub mod calculator;
pub mod plan;
pub mod resolver;

pub use calculator::{plan_for, plan_to};
pub use plan::{Plan, PlanItem};
pub use resolver::{Alias, current_version, resolve};
