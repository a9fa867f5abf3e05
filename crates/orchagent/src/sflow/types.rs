//! SflowOrch types.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::oid::RawSaiObjectId;

/// Sflow sampling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleDirection {
    /// Sample received (ingress) packets.
    #[default]
    Rx,
    /// Sample transmitted (egress) packets.
    Tx,
    /// Sample both ingress and egress packets.
    Both,
}

impl SampleDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rx => "rx",
            Self::Tx => "tx",
            Self::Both => "both",
        }
    }

    /// Returns true if this direction includes ingress sampling.
    pub fn has_ingress(&self) -> bool {
        matches!(self, Self::Rx | Self::Both)
    }

    /// Returns true if this direction includes egress sampling.
    pub fn has_egress(&self) -> bool {
        matches!(self, Self::Tx | Self::Both)
    }
}

impl FromStr for SampleDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rx" => Ok(Self::Rx),
            "tx" => Ok(Self::Tx),
            "both" => Ok(Self::Both),
            _ => Err(format!("Invalid sample_direction: {}", s)),
        }
    }
}

impl fmt::Display for SampleDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling state of one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSflowInfo {
    /// Whether sampling is administratively enabled on this port.
    pub admin_state: bool,
    pub direction: SampleDirection,
    /// Samplepacket session the port is attached to.
    pub session_id: RawSaiObjectId,
}

impl PortSflowInfo {
    pub fn new(admin_state: bool, direction: SampleDirection, session_id: RawSaiObjectId) -> Self {
        Self {
            admin_state,
            direction,
            session_id,
        }
    }
}

/// Samplepacket session shared by every port sampling at the same rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SflowSession {
    /// SAI samplepacket object ID.
    pub session_id: RawSaiObjectId,
    /// Sample rate (1 in N packets).
    pub rate: NonZeroU32,
    /// Number of ports currently using this session.
    pub ref_count: u32,
}

impl SflowSession {
    pub fn new(session_id: RawSaiObjectId, rate: NonZeroU32) -> Self {
        Self {
            session_id,
            rate,
            ref_count: 0,
        }
    }

    pub fn add_ref(&mut self) {
        self.ref_count += 1;
    }

    /// Drops one reference and returns the remaining count.
    pub fn remove_ref(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_sub(1);
        self.ref_count
    }
}

/// Sample rate to shared session.
pub type SflowRateSampleMap = BTreeMap<NonZeroU32, SflowSession>;

/// Port OID to sampling state.
pub type SflowPortInfoMap = BTreeMap<RawSaiObjectId, PortSflowInfo>;

/// Per-port configuration parsed from APPL_DB `SFLOW_SESSION_TABLE`.
#[derive(Debug, Clone, Default)]
pub struct SflowConfig {
    pub admin_state: bool,
    /// Sample rate. `None` when unset, zero or reported as "error".
    pub rate: Option<NonZeroU32>,
    pub direction: SampleDirection,
}

impl SflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one field-value pair into the config. Unknown fields are ignored.
    pub fn parse_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        match field {
            "admin_state" => {
                self.admin_state = parse_admin_state(value)?;
            }
            "sample_rate" => {
                self.rate = if value == "error" {
                    None
                } else {
                    let rate = value
                        .parse::<u32>()
                        .map_err(|e| format!("Invalid sample_rate '{}': {}", value, e))?;
                    NonZeroU32::new(rate)
                };
            }
            "sample_direction" => {
                self.direction = value.parse()?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Builds a config from a list of field-value tuples.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::new();
        for (field, value) in fields {
            config.parse_field(field, value)?;
        }
        Ok(config)
    }
}

/// Parses an `up`/`down` admin state.
pub(crate) fn parse_admin_state(value: &str) -> Result<bool, String> {
    match value {
        "up" => Ok(true),
        "down" => Ok(false),
        _ => Err(format!("Invalid admin_state: {}", value)),
    }
}
