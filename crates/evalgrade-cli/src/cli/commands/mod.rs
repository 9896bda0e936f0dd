pub mod agreement;
pub mod dispatch;
pub mod evaluate;
pub mod evaluate_all;
pub mod expert;
pub(crate) mod runner_builder;

pub use dispatch::dispatch;
