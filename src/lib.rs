// Modules, leaf first, and re-exports of the types most callers need
pub mod vec4;
pub mod error;
pub mod mass_table;
pub mod nucleus;
pub mod kinematics;
pub mod eloss;
pub mod detectors;
pub mod system;
pub mod config;
pub mod output;
pub mod simulation;

pub use config::Config;
pub use detectors::{ArrayGeometry, ArraySettings, DeadChannelMap, DetectorArray, SmearMode};
pub use eloss::{EnergyLoss, Target, TargetElement};
pub use error::{Result, SimError};
pub use kinematics::{StepSlots, TwoBodyReaction};
pub use mass_table::{MassTable, MASS_TABLE};
pub use nucleus::{Detection, DetectorStage, Nucleus, ReactionRole};
pub use output::EventWriter;
pub use simulation::{RunSummary, Simulation};
pub use system::{Event, ReactionSystem, RxnType, StepParameters, SystemParameters, Topology};
pub use vec4::FourMomentum;
