//! The dispatch core: adapter resolution with meta-routing, the per-run
//! token relay, the run executor, the batch coordinator with per-record
//! failure isolation, and the failure notifier.

pub mod batch;
pub mod executor;
pub mod notify;
pub mod relay;
pub mod resolver;

pub use batch::{BatchCoordinator, BatchOutcome, BatchReport, RecordDisposition, RecordResult};
pub use executor::RunExecutor;
pub use notify::FailureNotifier;
pub use relay::TokenRelay;
pub use resolver::AdapterResolver;
