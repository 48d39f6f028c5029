use std::fmt;
use std::net::IpAddr;

/// A single MX answer: preference plus the normalised exchange host name.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxCandidate {
    pub preference: u16,
    pub exchange: String,
}

impl MxCandidate {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxStatus {
    Records(Vec<MxCandidate>),
    NoRecords,
}

impl MxStatus {
    pub fn records(&self) -> &[MxCandidate] {
        match self {
            Self::Records(records) => records.as_slice(),
            Self::NoRecords => &[],
        }
    }
}

/// Which address families may be used when picking the probe target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressFamily {
    /// AAAA first, then A.
    #[default]
    Any,
    Ipv4Only,
}

impl AddressFamily {
    pub fn allows_ipv6(self) -> bool {
        matches!(self, Self::Any)
    }
}

/// The address the SMTP probe will connect to, and the MX it came from.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub exchange: String,
    pub preference: u16,
    pub address: IpAddr,
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.exchange, self.address)
    }
}
