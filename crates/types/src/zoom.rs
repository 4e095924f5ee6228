//! Zoom level bitsets.

use crate::value::Comparison;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of zoom levels encoded as a bitmask: bit `z` is set when a rule is
/// active at zoom `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoomMask(u32);

impl ZoomMask {
    /// Highest zoom level representable in a mask.
    pub const MAX_ZOOM: u32 = 22;

    /// Every zoom level from 0 to [`ZoomMask::MAX_ZOOM`].
    pub const ALL: ZoomMask = ZoomMask((1 << (Self::MAX_ZOOM + 1)) - 1);

    pub const NONE: ZoomMask = ZoomMask(0);

    pub fn from_bits(bits: u32) -> Self {
        ZoomMask(bits & Self::ALL.0)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// The set of zoom levels satisfying `zoom <op> value`.
    pub fn from_comparison(op: Comparison, value: u32) -> Self {
        let bits = (0..=Self::MAX_ZOOM)
            .filter(|z| op.holds(z.cmp(&value)))
            .fold(0u32, |acc, z| acc | (1 << z));
        ZoomMask(bits)
    }

    pub fn contains(&self, zoom: u32) -> bool {
        zoom <= Self::MAX_ZOOM && self.0 & (1 << zoom) != 0
    }

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Zoom levels present in the mask, ascending.
    pub fn levels(&self) -> impl Iterator<Item = u32> + '_ {
        (0..=Self::MAX_ZOOM).filter(move |z| self.contains(*z))
    }
}

impl Default for ZoomMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitAnd for ZoomMask {
    type Output = ZoomMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        ZoomMask(self.0 & rhs.0)
    }
}

impl BitOr for ZoomMask {
    type Output = ZoomMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        ZoomMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ZoomMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ZoomMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return write!(f, "all");
        }
        let levels: Vec<String> = self.levels().map(|z| z.to_string()).collect();
        write!(f, "[{}]", levels.join(","))
    }
}
