//! Catalog use cases: plan create, update, delete.

mod create_plan;
mod delete_plan;
mod update_plan;

pub use create_plan::CreatePlanHandler;
pub use delete_plan::DeletePlanHandler;
pub use update_plan::UpdatePlanHandler;
