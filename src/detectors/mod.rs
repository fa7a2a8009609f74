pub mod array;
pub mod dead_channel;
pub mod pc;
pub mod qqq;
pub mod sx3;

use serde::{Deserialize, Serialize};

pub use array::{
    ArrayGeometry, ArraySettings, Barrel, DetectorArray, ForwardCap, SiliconHit, SiliconStage,
};
pub use dead_channel::{ArrayComponent, ChannelSide, DeadChannelMap};
pub use pc::{WireChamber, WireHit};
pub use qqq::{AnnularDetector, RingWedgeHit};
pub use sx3::{StripDetector, StripHit};

/// How hit coordinates are reported for a channel.
///
/// `Fixed` returns the channel centre and is used for geometry checks.
/// `Smeared` draws the position uniformly within the channel pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmearMode {
    Fixed,
    #[default]
    Smeared,
}

/// Tolerance used when comparing geometric coordinates.
pub(crate) const GEOMETRY_EPSILON: f64 = 1.0e-6;
