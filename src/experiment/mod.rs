pub mod arm;
pub mod config;
pub mod manager;
pub mod policy;
pub mod store;

pub use arm::{ArmOrigin, ArmState, ExperimentArm, PruneReason};
pub use config::ExperimentConfig;
pub use manager::{CycleReport, Transition, WindowExperimentManager};
pub use policy::{PoolEntry, WindowPool};
pub use store::ArmStore;
