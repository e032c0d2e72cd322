//! Nominal wrappers around the API's numeric identifiers and measures.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

macro_rules! tiny_type {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

tiny_type!(
    /// Identifier of a managed domain.
    DomainId(u64)
);
tiny_type!(
    /// Identifier of a DNS record.
    DnsRecordId(u64)
);
tiny_type!(FolderId(u64));
tiny_type!(SoaId(u64));
tiny_type!(TemplateId(u64));
tiny_type!(VanityId(u64));
tiny_type!(TransferAclId(u64));
tiny_type!(
    /// MX/SRV preference, lower wins.
    Priority(u16)
);
tiny_type!(Weight(u16));
tiny_type!(Port(u16));
tiny_type!(MxLevel(u16));
tiny_type!(
    /// Record time-to-live in whole seconds.
    TimeToLive(u32)
);

impl TimeToLive {
    pub const ZERO: Self = Self(0);

    pub const fn from_secs(secs: u32) -> Self {
        Self(secs)
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl TryFrom<Duration> for TimeToLive {
    type Error = std::num::TryFromIntError;

    /// Truncates to whole seconds.
    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        u32::try_from(value.as_secs()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&DomainId(42)).unwrap(), "42");
        let id: DnsRecordId = serde_json::from_str("7").unwrap();
        assert_eq!(id, DnsRecordId(7));
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn ttl_converts_to_and_from_duration() {
        let ttl = TimeToLive::try_from(Duration::from_millis(1_800_900)).unwrap();
        assert_eq!(ttl, TimeToLive(1800));
        assert_eq!(ttl.as_duration(), Duration::from_secs(1800));
        assert!(TimeToLive::try_from(Duration::from_secs(u64::MAX)).is_err());
    }
}
