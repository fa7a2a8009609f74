// Mask of inoperative channels, read from a plain text file:
//
//   <header line>
//   <detector id> <barrel1|barrel2|qqq|pc> <front|back|wire> <channel>
//   ...
//
// For QQQ sensors the rings are the front side and the wedges the back.
// Wire records ignore the detector id.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Detector id under which every wire of the proportional counter is stored.
pub const PC_DETECTOR_ID: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayComponent {
    Barrel1,
    Barrel2,
    Qqq,
    Pc,
}

impl FromStr for ArrayComponent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "barrel1" => Ok(ArrayComponent::Barrel1),
            "barrel2" => Ok(ArrayComponent::Barrel2),
            "qqq" => Ok(ArrayComponent::Qqq),
            "pc" => Ok(ArrayComponent::Pc),
            other => Err(format!("unknown detector type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelSide {
    Front,
    Back,
    Wire,
}

impl FromStr for ChannelSide {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "front" => Ok(ChannelSide::Front),
            "back" => Ok(ChannelSide::Back),
            "wire" => Ok(ChannelSide::Wire),
            other => Err(format!("unknown channel type '{}'", other)),
        }
    }
}

type ChannelKey = (ArrayComponent, u32, ChannelSide, u32);

/// Set of dead channels. The default map is empty: every channel alive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeadChannelMap {
    dead: HashSet<ChannelKey>,
}

impl DeadChannelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut map = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            if line_number == 1 || line.trim().is_empty() {
                continue;
            }
            let err = |message: String| SimError::DeadChannelMap {
                line: line_number,
                message,
            };
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 4 {
                return Err(err(format!("expected 4 fields, found {}", fields.len())));
            }
            let detector: u32 = fields[0]
                .parse()
                .map_err(|_| err(format!("bad detector id '{}'", fields[0])))?;
            let component: ArrayComponent = fields[1].parse().map_err(err)?;
            let side: ChannelSide = fields[2].parse().map_err(err)?;
            let channel: u32 = fields[3]
                .parse()
                .map_err(|_| err(format!("bad channel '{}'", fields[3])))?;

            match (component, side) {
                (ArrayComponent::Pc, ChannelSide::Wire) => map.mark_wire_dead(channel),
                (ArrayComponent::Pc, _) | (_, ChannelSide::Wire) => {
                    return Err(err(format!(
                        "channel type {:?} does not belong to {:?}",
                        side, component
                    )))
                }
                _ => map.mark_dead(component, detector, channel, side),
            }
        }
        Ok(map)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn mark_dead(&mut self, component: ArrayComponent, detector: u32, channel: u32, side: ChannelSide) {
        self.dead.insert((component, detector, side, channel));
    }

    pub fn mark_wire_dead(&mut self, wire: u32) {
        self.dead
            .insert((ArrayComponent::Pc, PC_DETECTOR_ID, ChannelSide::Wire, wire));
    }

    pub fn is_empty(&self) -> bool {
        self.dead.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dead.len()
    }

    pub fn is_channel_dead(
        &self,
        component: ArrayComponent,
        detector: u32,
        channel: u32,
        side: ChannelSide,
    ) -> bool {
        self.dead.contains(&(component, detector, side, channel))
    }

    /// True if either the front or the back channel is dead.
    pub fn is_channel_pair_dead(
        &self,
        component: ArrayComponent,
        detector: u32,
        front: u32,
        back: u32,
    ) -> bool {
        self.is_channel_dead(component, detector, front, ChannelSide::Front)
            || self.is_channel_dead(component, detector, back, ChannelSide::Back)
    }

    pub fn is_wire_dead(&self, wire: u32) -> bool {
        self.is_channel_dead(ArrayComponent::Pc, PC_DETECTOR_ID, wire, ChannelSide::Wire)
    }
}
