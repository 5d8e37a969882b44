//! Extended-real intervals and interval unions, the domain representation for the non-linear
//! engine. Unlike the kernel's exact `Rational`, `ExtReal` is a floating type with signed
//! infinities, since ICP domains routinely start out unbounded.

use std::fmt;

use crate::kernel::rational::Rational;

/// A real number extended with `-inf`/`+inf`. Never holds NaN; arithmetic that would produce one
/// (e.g. `0 * inf`) is special-cased to `0`, the interval-arithmetic convention for "an unbounded
/// quantity multiplied by something known to be exactly zero".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtReal(f64);

impl ExtReal {
    pub const NEG_INFINITY: ExtReal = ExtReal(f64::NEG_INFINITY);
    pub const POS_INFINITY: ExtReal = ExtReal(f64::INFINITY);

    pub fn finite(v: f64) -> Self {
        ExtReal(v)
    }

    pub fn from_rational(r: Rational) -> Self {
        ExtReal(r.to_f64())
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    pub fn neg(self) -> ExtReal {
        ExtReal(-self.0)
    }

    pub fn min(self, other: ExtReal) -> ExtReal {
        ExtReal(self.0.min(other.0))
    }

    pub fn max(self, other: ExtReal) -> ExtReal {
        ExtReal(self.0.max(other.0))
    }

    fn mul(self, other: ExtReal) -> ExtReal {
        if (self.is_zero() && other.is_infinite()) || (other.is_zero() && self.is_infinite()) {
            ExtReal(0.0)
        } else {
            ExtReal(self.0 * other.0)
        }
    }
}

impl PartialOrd for ExtReal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl std::ops::Add for ExtReal {
    type Output = ExtReal;
    fn add(self, rhs: ExtReal) -> ExtReal {
        ExtReal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for ExtReal {
    type Output = ExtReal;
    fn sub(self, rhs: ExtReal) -> ExtReal {
        self + rhs.neg()
    }
}

impl fmt::Display for ExtReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == f64::INFINITY {
            write!(f, "+inf")
        } else if self.0 == f64::NEG_INFINITY {
            write!(f, "-inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A closed interval `[lo, hi]`. `lo <= hi` for every non-empty interval; [`Interval::empty`]
/// returns the canonical empty representation (`lo > hi`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    lo: ExtReal,
    hi: ExtReal,
}

impl Interval {
    pub fn new(lo: ExtReal, hi: ExtReal) -> Self {
        Interval { lo, hi }
    }

    pub fn point(v: ExtReal) -> Self {
        Interval { lo: v, hi: v }
    }

    pub fn unbounded() -> Self {
        Interval { lo: ExtReal::NEG_INFINITY, hi: ExtReal::POS_INFINITY }
    }

    pub fn empty() -> Self {
        Interval { lo: ExtReal::POS_INFINITY, hi: ExtReal::NEG_INFINITY }
    }

    pub fn lo(&self) -> ExtReal {
        self.lo
    }

    pub fn hi(&self) -> ExtReal {
        self.hi
    }

    pub fn is_empty(&self) -> bool {
        !(self.lo <= self.hi)
    }

    pub fn diameter(&self) -> ExtReal {
        if self.is_empty() {
            ExtReal::finite(0.0)
        } else {
            self.hi - self.lo
        }
    }

    pub fn contains(&self, v: ExtReal) -> bool {
        !self.is_empty() && self.lo <= v && v <= self.hi
    }

    /// Contains `0` strictly between its endpoints (not merely at one of them).
    pub fn straddles_zero(&self) -> bool {
        !self.is_empty() && self.lo < ExtReal::finite(0.0) && ExtReal::finite(0.0) < self.hi
    }

    pub fn intersect(&self, other: &Interval) -> Interval {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        if lo <= hi {
            Interval { lo, hi }
        } else {
            Interval::empty()
        }
    }

    pub fn neg(&self) -> Interval {
        if self.is_empty() {
            *self
        } else {
            Interval { lo: self.hi.neg(), hi: self.lo.neg() }
        }
    }

    pub fn add(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::empty();
        }
        Interval { lo: self.lo + other.lo, hi: self.hi + other.hi }
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: Rational) -> Interval {
        if self.is_empty() {
            return Interval::empty();
        }
        let f = ExtReal::from_rational(factor);
        let a = self.lo.mul(f);
        let b = self.hi.mul(f);
        if factor.is_negative() {
            Interval { lo: b, hi: a }
        } else {
            Interval { lo: a, hi: b }
        }
    }

    pub fn mul(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::empty();
        }
        let candidates = [
            self.lo.mul(other.lo),
            self.lo.mul(other.hi),
            self.hi.mul(other.lo),
            self.hi.mul(other.hi),
        ];
        let lo = candidates.into_iter().fold(ExtReal::POS_INFINITY, ExtReal::min);
        let hi = candidates.into_iter().fold(ExtReal::NEG_INFINITY, ExtReal::max);
        Interval { lo, hi }
    }

    /// Divides by `other`, returning `None` when `other` straddles zero — per the crate's
    /// convention, that case is resolved by the caller according to the constraint's relation
    /// rather than by this general-purpose operation.
    pub fn div(&self, other: &Interval) -> Option<Interval> {
        if self.is_empty() || other.is_empty() {
            return Some(Interval::empty());
        }
        if other.straddles_zero() {
            return None;
        }
        if other.contains(ExtReal::finite(0.0)) {
            // touches zero at exactly one endpoint: treat as division by an open interval
            // approaching zero from one side, i.e. an unbounded quotient on that side.
            return Some(Interval::unbounded());
        }
        let recip_lo = ExtReal::finite(1.0 / other.hi.value());
        let recip_hi = ExtReal::finite(1.0 / other.lo.value());
        Some(self.mul(&Interval { lo: recip_lo, hi: recip_hi }))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "[{}, {}]", self.lo, self.hi)
        }
    }
}

/// An ordered sequence of pairwise disjoint, non-empty intervals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntervalUnion {
    components: Vec<Interval>,
}

impl IntervalUnion {
    pub fn empty() -> Self {
        IntervalUnion::default()
    }

    pub fn single(interval: Interval) -> Self {
        if interval.is_empty() {
            IntervalUnion::empty()
        } else {
            IntervalUnion { components: vec![interval] }
        }
    }

    pub fn from_components(components: Vec<Interval>) -> Self {
        let mut union = IntervalUnion { components };
        union.reduce();
        union
    }

    pub fn components(&self) -> &[Interval] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn diameter(&self) -> ExtReal {
        self.components.iter().fold(ExtReal::finite(0.0), |acc, i| acc + i.diameter())
    }

    /// Sorts components and merges overlapping or touching neighbors, dropping empties.
    pub fn reduce(&mut self) {
        self.components.retain(|i| !i.is_empty());
        self.components.sort_by(|a, b| a.lo().partial_cmp(&b.lo()).expect("no NaN endpoints"));

        let mut merged: Vec<Interval> = Vec::with_capacity(self.components.len());
        for interval in self.components.drain(..) {
            match merged.last_mut() {
                Some(last) if interval.lo() <= last.hi() => {
                    *last = Interval::new(last.lo(), last.hi().max(interval.hi()));
                }
                _ => merged.push(interval),
            }
        }
        self.components = merged;
    }

    pub fn intersect_interval(&self, other: &Interval) -> IntervalUnion {
        let components = self.components.iter().map(|i| i.intersect(other)).collect();
        IntervalUnion::from_components(components)
    }

    pub fn intersect(&self, other: &IntervalUnion) -> IntervalUnion {
        let mut components = Vec::new();
        for a in &self.components {
            for b in &other.components {
                components.push(a.intersect(b));
            }
        }
        IntervalUnion::from_components(components)
    }

    /// The tightest single interval containing every component, i.e. the convex hull.
    pub fn hull(&self) -> Interval {
        self.components
            .iter()
            .fold(Interval::empty(), |acc, i| if acc.is_empty() { *i } else { Interval::new(acc.lo().min(i.lo()), acc.hi().max(i.hi())) })
    }
}

impl fmt::Display for IntervalUnion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "{{}}");
        }
        let body = self
            .components
            .iter()
            .map(Interval::to_string)
            .collect::<Vec<_>>()
            .join(" U ");
        write!(f, "{body}")
    }
}

/// Applies the `k`-th root to every point of `target`, producing the (possibly two-component)
/// set of values whose `k`-th power lies in `target`.
pub fn kth_root(target: &Interval, k: u32) -> IntervalUnion {
    if target.is_empty() || k == 0 {
        return IntervalUnion::empty();
    }
    if k == 1 {
        return IntervalUnion::single(*target);
    }
    if k % 2 == 1 {
        let lo = signed_root(target.lo().value(), k);
        let hi = signed_root(target.hi().value(), k);
        return IntervalUnion::single(Interval::new(ExtReal::finite(lo), ExtReal::finite(hi)));
    }

    let non_negative = target.intersect(&Interval::new(ExtReal::finite(0.0), ExtReal::POS_INFINITY));
    if non_negative.is_empty() {
        return IntervalUnion::empty();
    }
    let pos_lo = non_negative.lo().value().powf(1.0 / f64::from(k));
    let pos_hi = non_negative.hi().value().powf(1.0 / f64::from(k));
    let positive = Interval::new(ExtReal::finite(pos_lo), ExtReal::finite(pos_hi));
    let negative = Interval::new(ExtReal::finite(-pos_hi), ExtReal::finite(-pos_lo));
    IntervalUnion::from_components(vec![negative, positive])
}

fn signed_root(x: f64, k: u32) -> f64 {
    if x == f64::INFINITY {
        f64::INFINITY
    } else if x == f64::NEG_INFINITY {
        f64::NEG_INFINITY
    } else {
        x.signum() * x.abs().powf(1.0 / f64::from(k))
    }
}
