pub mod contract;
pub mod intake;

pub use contract::{CompletionResult, ContractPlan};
pub use intake::IntakeForm;
