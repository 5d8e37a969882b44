//! Monomials, terms and polynomials over [`Rational`] coefficients.
//!
//! All three are built exclusively through smart constructors
//! ([`mk_monomial`], [`mk_polynomial`]) so the invariants in the data model — no zero exponents,
//! no zero coefficients, no duplicate monomials within a polynomial — hold for every value that
//! exists, not just the ones produced by "well-behaved" call sites.

use std::collections::BTreeMap;

use crate::error::{SolverError, SolverResult};
use crate::kernel::rational::Rational;
use crate::sat::types::Var;

/// A product of variables with strictly positive integer exponents. The empty monomial denotes
/// the constant `1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Monomial {
    exponents: BTreeMap<Var, u32>,
}

impl Monomial {
    pub fn constant() -> Self {
        Monomial::default()
    }

    /// Builds a monomial from (variable, exponent) pairs, silently dropping zero exponents —
    /// a zero exponent contributes nothing to the product, so this is a normalization, not a
    /// validation failure.
    pub fn from_exponents(exponents: impl IntoIterator<Item = (Var, u32)>) -> Self {
        let exponents = exponents.into_iter().filter(|(_, e)| *e != 0).collect();
        Monomial { exponents }
    }

    pub fn single(var: Var, exponent: u32) -> Self {
        Monomial::from_exponents([(var, exponent)])
    }

    pub fn is_constant(&self) -> bool {
        self.exponents.is_empty()
    }

    pub fn degree(&self) -> u32 {
        self.exponents.values().sum()
    }

    pub fn exponent(&self, var: Var) -> u32 {
        self.exponents.get(&var).copied().unwrap_or(0)
    }

    pub fn variables(&self) -> impl Iterator<Item = Var> + '_ {
        self.exponents.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, u32)> + '_ {
        self.exponents.iter().map(|(&v, &e)| (v, e))
    }

    /// Multiplies two monomials by adding exponents.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut exponents = self.exponents.clone();
        for (&v, &e) in &other.exponents {
            *exponents.entry(v).or_insert(0) += e;
        }
        Monomial { exponents }
    }

    /// Evaluates the monomial under a variable assignment, panicking if a variable it mentions
    /// is absent from `values` — this mirrors the crate-wide convention that evaluation is only
    /// ever called once every variable in a constraint is known to have a value (`Rational` for
    /// Simplex, `Interval` at a point for a root-covering check).
    pub fn eval(&self, values: &BTreeMap<Var, Rational>) -> Rational {
        self.exponents.iter().fold(Rational::one(), |acc, (v, &e)| {
            let base = *values.get(v).expect("monomial variable missing from assignment");
            acc * pow_rational(base, e)
        })
    }
}

fn pow_rational(base: Rational, exp: u32) -> Rational {
    let mut acc = Rational::one();
    for _ in 0..exp {
        acc = acc * base;
    }
    acc
}

/// A single `(coefficient, monomial)` term with a non-zero coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub coefficient: Rational,
    pub monomial: Monomial,
}

/// A sum of terms with pairwise-distinct monomials and non-zero coefficients.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, Rational>,
}

/// Builds a monomial from exponents, rejecting a zero exponent passed directly rather than
/// silently normalizing it away — call sites that want normalization should use
/// [`Monomial::from_exponents`]; this constructor exists for the invariant check described in the
/// data model ("Invariant: no zero exponent ever stored") to be enforceable at a boundary.
pub fn mk_monomial(exponents: impl IntoIterator<Item = (Var, u32)>) -> SolverResult<Monomial> {
    let exponents: Vec<(Var, u32)> = exponents.into_iter().collect();
    if exponents.iter().any(|(_, e)| *e == 0) {
        return Err(SolverError::InvalidInput(
            "monomial exponent must be non-zero".to_string(),
        ));
    }
    Ok(Monomial::from_exponents(exponents))
}

/// Builds a polynomial from terms, combining like monomials and dropping any whose combined
/// coefficient is zero. Rejects an empty result: a polynomial value must denote at least the
/// constant `0`-term-free polynomial being meaningfully distinct from "no polynomial at all" is
/// up to the caller, but an empty *input* list is rejected here since `mk_polynomial` is meant to
/// build a polynomial *from* terms, and zero terms is not a constraint any caller should be
/// constructing deliberately.
pub fn mk_polynomial(terms: impl IntoIterator<Item = Term>) -> SolverResult<Polynomial> {
    let terms: Vec<Term> = terms.into_iter().collect();
    if terms.is_empty() {
        return Err(SolverError::InvalidInput(
            "polynomial must be built from at least one term".to_string(),
        ));
    }
    let mut combined: BTreeMap<Monomial, Rational> = BTreeMap::new();
    for term in terms {
        if term.coefficient.is_zero() {
            continue;
        }
        let entry = combined.entry(term.monomial).or_insert(Rational::zero());
        *entry = *entry + term.coefficient;
    }
    combined.retain(|_, c| !c.is_zero());
    Ok(Polynomial { terms: combined })
}

impl Polynomial {
    pub fn zero() -> Self {
        Polynomial { terms: BTreeMap::new() }
    }

    pub fn constant(c: Rational) -> Self {
        if c.is_zero() {
            Polynomial::zero()
        } else {
            let mut terms = BTreeMap::new();
            terms.insert(Monomial::constant(), c);
            Polynomial { terms }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The highest total degree among the polynomial's monomials (0 for the zero polynomial).
    pub fn degree(&self) -> u32 {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, Rational)> {
        self.terms.iter().map(|(m, &c)| (m, c))
    }

    pub fn variables(&self) -> impl Iterator<Item = Var> + '_ {
        self.terms.keys().flat_map(Monomial::variables).collect::<std::collections::BTreeSet<_>>().into_iter()
    }

    pub fn eval(&self, values: &BTreeMap<Var, Rational>) -> Rational {
        self.terms
            .iter()
            .fold(Rational::zero(), |acc, (m, &c)| acc + c * m.eval(values))
    }

    /// True iff every monomial has total degree <= 1, i.e. the polynomial is already a linear
    /// term plus a constant.
    pub fn is_linear(&self) -> bool {
        self.terms.keys().all(|m| m.degree() <= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> Var { i }

    #[test]
    fn mk_polynomial_combines_like_monomials() {
        let x = Monomial::single(v(0), 1);
        let terms = vec![
            Term { coefficient: Rational::from_int(2), monomial: x.clone() },
            Term { coefficient: Rational::from_int(-2), monomial: x.clone() },
            Term { coefficient: Rational::from_int(3), monomial: Monomial::constant() },
        ];
        let p = mk_polynomial(terms).unwrap();
        // the x term cancels to zero and is dropped
        assert_eq!(p.terms().count(), 1);
        assert_eq!(p.eval(&BTreeMap::new()), Rational::from_int(3));
    }

    #[test]
    fn mk_polynomial_rejects_empty() {
        assert!(mk_polynomial(vec![]).is_err());
    }

    #[test]
    fn mk_monomial_rejects_zero_exponent() {
        assert!(mk_monomial([(v(0), 0)]).is_err());
        assert!(mk_monomial([(v(0), 2)]).is_ok());
    }

    #[test]
    fn degree_and_linearity() {
        let mut values = BTreeMap::new();
        values.insert(v(0), Rational::from_int(3));
        values.insert(v(1), Rational::from_int(5));

        let xy = Monomial::from_exponents([(v(0), 1), (v(1), 1)]);
        let p = mk_polynomial(vec![Term { coefficient: Rational::one(), monomial: xy }]).unwrap();
        assert_eq!(p.degree(), 2);
        assert!(!p.is_linear());
        assert_eq!(p.eval(&values), Rational::from_int(15));
    }
}
