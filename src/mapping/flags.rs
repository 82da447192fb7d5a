use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// One request facet a parameter value can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    /// Path arguments matched by the route
    Args,
    /// Query-string parameters
    Query,
    /// Body parameters
    Body,
}

impl Facet {
    /// Facets in merge precedence order, most trusted first.
    pub const ALL: [Facet; 3] = [Facet::Args, Facet::Query, Facet::Body];

    #[must_use]
    pub const fn flag(self) -> MapFlags {
        match self {
            Facet::Args => MapFlags::ARGS,
            Facet::Query => MapFlags::QUERY,
            Facet::Body => MapFlags::BODY,
        }
    }
}

/// Set of request facets merged into a multi-value parameter.
///
/// ```
/// use paramroute::mapping::{Facet, MapFlags};
///
/// let flags = MapFlags::ARGS | MapFlags::QUERY;
/// assert!(flags.contains(MapFlags::QUERY));
/// assert!(!flags.contains(MapFlags::BODY));
/// assert_eq!(flags.facets().collect::<Vec<_>>(), vec![Facet::Args, Facet::Query]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MapFlags(u8);

impl MapFlags {
    pub const NONE: MapFlags = MapFlags(0);
    pub const ARGS: MapFlags = MapFlags(0x1);
    pub const QUERY: MapFlags = MapFlags(0x2);
    pub const BODY: MapFlags = MapFlags(0x4);
    /// Every facet
    pub const DATA: MapFlags = MapFlags(0x1 | 0x2 | 0x4);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping any that do not name a facet.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        MapFlags(bits & Self::DATA.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: MapFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Facets present in this set, in merge precedence order.
    pub fn facets(self) -> impl Iterator<Item = Facet> {
        Facet::ALL
            .into_iter()
            .filter(move |f| self.contains(f.flag()))
    }
}

impl BitOr for MapFlags {
    type Output = MapFlags;

    fn bitor(self, rhs: MapFlags) -> MapFlags {
        MapFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for MapFlags {
    fn bitor_assign(&mut self, rhs: MapFlags) {
        self.0 |= rhs.0;
    }
}

impl From<Facet> for MapFlags {
    fn from(facet: Facet) -> Self {
        facet.flag()
    }
}

impl FromIterator<Facet> for MapFlags {
    fn from_iter<I: IntoIterator<Item = Facet>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MapFlags::NONE, |acc, facet| acc | facet.flag())
    }
}

impl fmt::Debug for MapFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("MapFlags(NONE)");
        }
        let names: Vec<&str> = self
            .facets()
            .map(|facet| match facet {
                Facet::Args => "ARGS",
                Facet::Query => "QUERY",
                Facet::Body => "BODY",
            })
            .collect();
        write!(f, "MapFlags({})", names.join(" | "))
    }
}

impl Serialize for MapFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.facets())
    }
}

impl<'de> Deserialize<'de> for MapFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let facets = Vec::<Facet>::deserialize(deserializer)?;
        Ok(facets.into_iter().collect())
    }
}
