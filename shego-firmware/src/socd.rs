//! Simultaneous opposite cardinal direction cleaning with last input priority.
//!
//! When both keys of the pair are held only the one pressed most recently is reported. The other
//! key's debounced state is left alone, so it reappears as soon as the winner is released.

use shego_common::board::PairMember;

/// Whether any channel of each member is debounced pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PairFlags {
    pub a: bool,
    pub b: bool,
}
impl PairFlags {
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    pub fn get(&self, member: PairMember) -> bool {
        match member {
            PairMember::A => self.a,
            PairMember::B => self.b,
        }
    }

    pub fn set(&mut self, member: PairMember) {
        match member {
            PairMember::A => self.a = true,
            PairMember::B => self.b = true,
        }
    }
}

#[derive(Debug)]
pub struct ConflictResolver {
    /// Raw flags as they stood at the end of the previous scan.
    last: PairFlags,
    favored: PairMember,
}
impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}
impl ConflictResolver {
    pub const fn new() -> Self {
        Self {
            last: PairFlags::new(false, false),
            favored: PairMember::B,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn favored(&self) -> PairMember {
        self.favored
    }

    pub fn last_raw(&self) -> PairFlags {
        self.last
    }

    /// May `member` appear in the matrix this scan? Uses the favoured member as of the end of the
    /// previous scan.
    pub fn is_visible(&self, member: PairMember, raw: PairFlags) -> bool {
        raw.get(member) && (!raw.get(member.other()) || self.favored == member)
    }

    /// Record this scan's raw flags. A member that went from released to pressed becomes the
    /// favoured one; A is checked before B, so B wins when both are pressed in the same scan.
    /// Returns true if the favoured member changed.
    pub fn end_scan(&mut self, raw: PairFlags) -> bool {
        let prev = self.favored;
        if raw.a && !self.last.a {
            self.favored = PairMember::A;
        }
        if raw.b && !self.last.b {
            self.favored = PairMember::B;
        }
        self.last = raw;
        prev != self.favored
    }
}

#[cfg(test)]
#[path = "socd_test.rs"]
mod test;
