use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Employee, EmployeePair, MatchPolicy, MatchResult, PairingError};

/// Pairing engine for the secret coffee program
///
/// Partitions a roster into disjoint pairs under one of three policies.
/// Every operation is a single pass over the input roster; the random
/// source is always supplied by the caller so a fixed seed reproduces the
/// exact pairing order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairingEngine;

impl PairingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Uniformly random pairing over the active roster
    ///
    /// Fewer than 2 active employees yields zero pairs with the remaining
    /// active employees as unmatched; an odd active count leaves the final
    /// element of the shuffled permutation unmatched.
    pub fn random_pairing<R: Rng + ?Sized>(
        &self,
        roster: &[Employee],
        rng: &mut R,
    ) -> Result<MatchResult, PairingError> {
        let active: Vec<Employee> = roster.iter().filter(|emp| emp.is_active).cloned().collect();

        tracing::debug!("Random pairing over {} active employees", active.len());

        if active.len() < 2 {
            return Ok(MatchResult::new(
                vec![],
                active,
                MatchPolicy::Simple.wire_name(),
            ));
        }

        let mut shuffled = active;
        shuffled.shuffle(rng);

        let mut pairs = Vec::with_capacity(shuffled.len() / 2);
        let mut unmatched = Vec::new();

        for couple in shuffled.chunks(2) {
            if let [first, second] = couple {
                pairs.push(EmployeePair::try_new(first.clone(), second.clone())?);
            } else {
                unmatched.push(couple[0].clone());
            }
        }

        Ok(MatchResult::new(
            pairs,
            unmatched,
            MatchPolicy::Simple.wire_name(),
        ))
    }

    /// Random pairing restricted to active employees sharing an interest tag
    ///
    /// The match is case-sensitive and exact. Employees that fail the filter
    /// are dropped from the result entirely, not listed as unmatched. With 2+
    /// matching employees the run delegates to the random policy, so the
    /// result carries that policy's name.
    pub fn interest_pairing<R: Rng + ?Sized>(
        &self,
        roster: &[Employee],
        interest: &str,
        rng: &mut R,
    ) -> Result<MatchResult, PairingError> {
        let interested: Vec<Employee> = roster
            .iter()
            .filter(|emp| emp.is_active && emp.has_interest(interest))
            .cloned()
            .collect();

        tracing::debug!(
            "Interest pairing: {} employees share interest '{}'",
            interested.len(),
            interest
        );

        if interested.len() < 2 {
            return Ok(MatchResult::new(
                vec![],
                interested,
                MatchPolicy::InterestBased.wire_name(),
            ));
        }

        self.random_pairing(&interested, rng)
    }

    /// Greedy pairing across department boundaries
    ///
    /// Groups active employees by department in first-observed order, then
    /// walks all unordered group combinations in that order, pairing members
    /// position-by-position up to the smaller group size. An employee already
    /// consumed by an earlier combination is skipped, not re-slotted, which
    /// can leave pairable employees unmatched; the exact greedy output is
    /// part of the service contract.
    pub fn cross_department_pairing(&self, roster: &[Employee]) -> Result<MatchResult, PairingError> {
        let active: Vec<Employee> = roster.iter().filter(|emp| emp.is_active).cloned().collect();

        tracing::debug!("Cross-department pairing over {} active employees", active.len());

        if active.len() < 2 {
            return Ok(MatchResult::new(
                vec![],
                active,
                MatchPolicy::CrossDepartment.wire_name(),
            ));
        }

        // Group by department, preserving the order groups were first observed
        let mut department_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&Employee>> = HashMap::new();
        for emp in &active {
            let key = emp.department_key().to_string();
            if !groups.contains_key(&key) {
                department_order.push(key.clone());
            }
            groups.entry(key).or_default().push(emp);
        }

        let mut pairs = Vec::new();
        let mut consumed: HashSet<i64> = HashSet::new();

        for i in 0..department_order.len() {
            for j in (i + 1)..department_order.len() {
                let dept1 = &groups[&department_order[i]];
                let dept2 = &groups[&department_order[j]];

                let quota = dept1.len().min(dept2.len());
                for k in 0..quota {
                    let emp1 = dept1[k];
                    let emp2 = dept2[k];
                    if consumed.contains(&emp1.id) || consumed.contains(&emp2.id) {
                        continue;
                    }
                    pairs.push(EmployeePair::try_new(emp1.clone(), emp2.clone())?);
                    consumed.insert(emp1.id);
                    consumed.insert(emp2.id);
                }
            }
        }

        let unmatched: Vec<Employee> = active
            .iter()
            .filter(|emp| !consumed.contains(&emp.id))
            .cloned()
            .collect();

        Ok(MatchResult::new(
            pairs,
            unmatched,
            MatchPolicy::CrossDepartment.wire_name(),
        ))
    }
}
