use std::ops::{Add, AddAssign, Sub, SubAssign};

/// How many more items a consumer is willing to accept.
///
/// Arithmetic never produces a negative bounded value: bounded subtraction
/// saturates at zero and bounded addition saturates at [`usize::MAX`].
/// [`Demand::Unbounded`] absorbs both addition and subtraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demand {
    /// A finite number of additional items.
    Bounded(usize),
    /// No limit on additional items.
    Unbounded,
}

impl Demand {
    /// The "no further items" sentinel, `Bounded(0)`.
    pub const NONE: Self = Demand::Bounded(0);
    /// Exactly one item, `Bounded(1)`.
    pub const ONE: Self = Demand::Bounded(1);

    /// Whether at least one more item may be emitted.
    pub const fn is_positive(&self) -> bool {
        !self.is_none()
    }

    /// Whether emission must hold until demand increases.
    pub const fn is_none(&self) -> bool {
        matches!(self, Demand::Bounded(0))
    }
}

impl Default for Demand {
    fn default() -> Self {
        Demand::NONE
    }
}

impl Add for Demand {
    type Output = Demand;

    fn add(self, rhs: Demand) -> Demand {
        match (self, rhs) {
            (Demand::Bounded(lhs), Demand::Bounded(rhs)) => Demand::Bounded(lhs.saturating_add(rhs)),
            _ => Demand::Unbounded,
        }
    }
}

impl AddAssign for Demand {
    fn add_assign(&mut self, rhs: Demand) {
        *self = *self + rhs;
    }
}

impl Sub for Demand {
    type Output = Demand;

    fn sub(self, rhs: Demand) -> Demand {
        match (self, rhs) {
            (Demand::Unbounded, _) => Demand::Unbounded,
            // A finite consumer asked to give back more than it has left.
            (Demand::Bounded(_), Demand::Unbounded) => Demand::NONE,
            (Demand::Bounded(lhs), Demand::Bounded(rhs)) => Demand::Bounded(lhs.saturating_sub(rhs)),
        }
    }
}

impl SubAssign for Demand {
    fn sub_assign(&mut self, rhs: Demand) {
        *self = *self - rhs;
    }
}
