pub mod plan_file;

pub use plan_file::{load_plan, read_plan, PlanFileError, PlanFormat};
