use super::{AddressBlock, AddressFamily, IndexOutOfRangeError, InvalidCidrError, IpBlock};
use ipnet::IpNet;
use iprot_utils::U256;
use serde::{Deserialize, Serialize};
use std::{fmt, net::IpAddr};

/// An ordered list of [`IpBlock`]s of one [`AddressFamily`],
/// viewed as a single concatenated address space.
///
/// Global index `g` maps to child `j` and local index `g - offset(j)`,
/// where `offset(j)` is the sum of the counts of the children before `j`.
/// Blocks are neither merged nor de-duplicated: overlapping children
/// contribute their addresses more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiIpBlock {
    blocks: Vec<IpBlock>,
    /// exclusive end offset of each child in the global index space
    ends: Vec<U256>,
    family: AddressFamily,
}

impl MultiIpBlock {
    /// Create a [`MultiIpBlock`] from the given blocks, in order.
    pub fn try_from_blocks(
        blocks: impl IntoIterator<Item = IpBlock>,
    ) -> Result<Self, MultiIpBlockError> {
        let blocks: Vec<IpBlock> = blocks.into_iter().collect();
        let family = blocks
            .first()
            .ok_or(MultiIpBlockError::EmptyInput)?
            .address_family();

        let mut ends = Vec::with_capacity(blocks.len());
        let mut total = U256::zero();
        for block in &blocks {
            let found = block.address_family();
            if found != family {
                return Err(MultiIpBlockError::MixedAddressFamily {
                    expected: family,
                    found,
                });
            }
            total = total
                .checked_add(block.count())
                .ok_or(MultiIpBlockError::Overflow)?;
            ends.push(total);
        }

        Ok(Self {
            blocks,
            ends,
            family,
        })
    }

    /// Create a [`MultiIpBlock`] from the given networks, in order.
    pub fn try_from_nets(
        nets: impl IntoIterator<Item = impl Into<IpNet>>,
    ) -> Result<Self, MultiIpBlockError> {
        Self::try_from_blocks(nets.into_iter().map(IpBlock::new))
    }

    /// Parse each CIDR literal and create a [`MultiIpBlock`] from the result.
    pub fn try_from_cidrs<S: AsRef<str>>(
        cidrs: impl IntoIterator<Item = S>,
    ) -> Result<Self, MultiIpBlockError> {
        let blocks = cidrs
            .into_iter()
            .map(|cidr| IpBlock::try_from(cidr.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from_blocks(blocks)
    }

    /// The child blocks, in index order.
    #[must_use]
    pub fn blocks(&self) -> &[IpBlock] {
        &self.blocks
    }

    /// Total number of addresses, the sum of all child counts.
    #[must_use]
    pub fn count(&self) -> U256 {
        self.ends.last().copied().unwrap_or_default()
    }

    /// The [`AddressFamily`] shared by all children.
    #[must_use]
    pub const fn address_family(&self) -> AddressFamily {
        self.family
    }

    /// Address at the given global index.
    pub fn get(&self, index: U256) -> Result<IpAddr, IndexOutOfRangeError> {
        let count = self.count();
        // first child whose end lies past the index
        let child = self.ends.partition_point(|end| *end <= index);
        let block = self
            .blocks
            .get(child)
            .ok_or(IndexOutOfRangeError::new(index, count))?;
        let offset = match child.checked_sub(1) {
            Some(prev) => self.ends.get(prev).copied().unwrap_or_default(),
            None => U256::zero(),
        };
        block
            .get(index - offset)
            .map_err(|_| IndexOutOfRangeError::new(index, count))
    }

    /// Iterate over all addresses, child after child.
    pub fn iter(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.blocks.iter().flat_map(IpBlock::iter)
    }
}

impl AddressBlock for MultiIpBlock {
    #[inline]
    fn count(&self) -> U256 {
        Self::count(self)
    }

    #[inline]
    fn get(&self, index: U256) -> Result<IpAddr, IndexOutOfRangeError> {
        Self::get(self, index)
    }

    #[inline]
    fn address_family(&self) -> AddressFamily {
        self.family
    }
}

impl From<IpBlock> for MultiIpBlock {
    fn from(block: IpBlock) -> Self {
        Self {
            ends: vec![block.count()],
            family: block.address_family(),
            blocks: vec![block],
        }
    }
}

impl TryFrom<Vec<IpBlock>> for MultiIpBlock {
    type Error = MultiIpBlockError;

    fn try_from(blocks: Vec<IpBlock>) -> Result<Self, Self::Error> {
        Self::try_from_blocks(blocks)
    }
}

impl fmt::Display for MultiIpBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(block, f)?;
        }
        Ok(())
    }
}

impl Serialize for MultiIpBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.blocks.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MultiIpBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let blocks = Vec::<IpBlock>::deserialize(deserializer)?;
        Self::try_from_blocks(blocks).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a [`MultiIpBlock`] cannot be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiIpBlockError {
    /// No blocks were given.
    EmptyInput,
    /// A block's family differs from the family of the first block.
    MixedAddressFamily {
        expected: AddressFamily,
        found: AddressFamily,
    },
    /// A CIDR literal could not be parsed.
    InvalidFormat(InvalidCidrError),
    /// The total address count does not fit the index type.
    Overflow,
}

impl From<InvalidCidrError> for MultiIpBlockError {
    fn from(err: InvalidCidrError) -> Self {
        Self::InvalidFormat(err)
    }
}

impl fmt::Display for MultiIpBlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => f.write_str("at least one IP block is required"),
            Self::MixedAddressFamily { expected, found } => write!(
                f,
                "all IP blocks must share one address family: expected {expected}, found {found}"
            ),
            Self::InvalidFormat(err) => write!(f, "invalid IP block: {err}"),
            Self::Overflow => f.write_str("total address count overflows"),
        }
    }
}

impl std::error::Error for MultiIpBlockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidFormat(err) => Some(err),
            _ => None,
        }
    }
}
