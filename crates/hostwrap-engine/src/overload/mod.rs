//! Overload resolution
//!
//! Picks the single best member of a [`CallableGroup`] for a list of dynamic
//! arguments:
//!
//! 1. Keep candidates whose arity fits (varargs candidates accept one less
//!    than their declared count, or more).
//! 2. Direct phase: score every candidate called with one argument per
//!    declared parameter (a varargs candidate takes its last argument as the
//!    array itself) using [`conversion_cost`], and keep the candidates no
//!    other candidate beats on every position. One survivor is the answer.
//! 3. Varargs phase, only when the direct phase found no single answer:
//!    score the varargs candidates with their trailing arguments packed into
//!    an array, or passed whole when that is cheaper, and take the front
//!    again. Several survivors in either phase are ambiguous.
//!
//! A fixed-arity overload that accepts the arguments therefore always wins
//! over packing them into a varargs array.
//!
//! The result depends only on the group's contents and the arguments, not on
//! declaration order.

pub mod cost;
pub mod unwrap;

pub use cost::conversion_cost;
pub use unwrap::unwrap;

use std::sync::Arc;

use hostwrap_sdk::{DynamicValue, HostType, HostValue, MemberDescriptor};

use crate::error::{BridgeError, BridgeResult};
use crate::introspect::CallableGroup;
use cost::VARARGS_PACK;

/// Outcome of overload resolution. Never cached.
#[derive(Debug, Clone)]
pub enum ResolvedCall {
    /// Exactly one best candidate, with its arguments converted
    Found {
        /// Selected member
        member: Arc<MemberDescriptor>,
        /// Arguments in host representation, varargs already packed
        args: Vec<HostValue>,
    },
    /// No candidate accepts this many arguments
    WrongArity,
    /// Arity fits but some argument converts for no candidate
    NoCompatibleOverload {
        /// Index of the first failing argument, when every candidate failed
        /// at the same position
        failing_argument: Option<usize>,
    },
    /// Several candidates are equally good
    Ambiguous {
        /// Tied candidates
        candidates: Vec<Arc<MemberDescriptor>>,
    },
}

impl ResolvedCall {
    /// Turn a failed resolution into the matching [`BridgeError`]
    pub fn into_result(
        self,
        name: &str,
        args: &[DynamicValue],
    ) -> BridgeResult<(Arc<MemberDescriptor>, Vec<HostValue>)> {
        match self {
            ResolvedCall::Found { member, args } => Ok((member, args)),
            ResolvedCall::WrongArity => Err(BridgeError::WrongArity {
                member: name.to_string(),
                argc: args.len(),
            }),
            ResolvedCall::NoCompatibleOverload { failing_argument } => {
                Err(BridgeError::NoCompatibleOverload {
                    member: name.to_string(),
                    args: args
                        .iter()
                        .map(DynamicValue::type_name)
                        .collect::<Vec<_>>()
                        .join(", "),
                    failing_argument,
                })
            }
            ResolvedCall::Ambiguous { candidates } => Err(BridgeError::AmbiguousOverload {
                member: name.to_string(),
                candidates: candidates.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// One argument per declared parameter
    Direct,
    /// Trailing arguments packed into the varargs array
    Spread,
}

struct Scored<'g> {
    member: &'g Arc<MemberDescriptor>,
    /// One cost per argument plus the packing cost
    costs: Vec<u32>,
    shape: Shape,
}

/// Result of running one phase over its candidates
enum Phase<'g> {
    /// Nothing in this phase accepted the arguments
    Empty,
    Found(&'g Arc<MemberDescriptor>, Vec<HostValue>),
    Ambiguous(Vec<Arc<MemberDescriptor>>),
}

/// Resolve `args` against `group`
pub fn resolve(group: &CallableGroup, args: &[DynamicValue]) -> ResolvedCall {
    let argc = args.len();
    let applicable: Vec<&Arc<MemberDescriptor>> = group
        .members()
        .iter()
        .filter(|m| arity_fits(m, argc))
        .collect();
    if applicable.is_empty() {
        tracing::trace!(member = group.name(), argc, "no overload with matching arity");
        return ResolvedCall::WrongArity;
    }

    // Every candidate called with one argument per declared parameter,
    // varargs ones taking their last argument as the array itself.
    let mut direct = Vec::with_capacity(applicable.len());
    let mut failures = Vec::new();
    for &member in &applicable {
        if member.params().len() != argc {
            continue;
        }
        match direct_costs(member.params(), args) {
            Ok(mut costs) => {
                costs.push(0);
                direct.push(Scored {
                    member,
                    costs,
                    shape: Shape::Direct,
                });
            }
            Err(index) if !is_spreadable(member) => failures.push(index),
            Err(_) => {}
        }
    }
    let fixed = select(&direct, args);
    if let Phase::Found(member, converted) = fixed {
        tracing::trace!(member = %member, "overload selected");
        return found_call(member, converted);
    }

    // Varargs candidates are only tried once no direct call matched.
    let mut spread = Vec::new();
    for &member in applicable.iter().filter(|m| is_spreadable(m)) {
        match score_varargs(member, args) {
            Ok(s) => spread.push(s),
            Err(index) => failures.push(index),
        }
    }
    match (select(&spread, args), fixed) {
        (Phase::Found(member, converted), _) => {
            tracing::trace!(member = %member, "varargs overload selected");
            found_call(member, converted)
        }
        (Phase::Ambiguous(candidates), _) | (Phase::Empty, Phase::Ambiguous(candidates)) => {
            tracing::trace!(member = group.name(), candidates = candidates.len(), "ambiguous overload");
            ResolvedCall::Ambiguous { candidates }
        }
        (Phase::Empty, _) => {
            let failing_argument = failures
                .first()
                .copied()
                .filter(|first| failures.iter().all(|i| i == first));
            tracing::trace!(member = group.name(), ?failing_argument, "no compatible overload");
            ResolvedCall::NoCompatibleOverload { failing_argument }
        }
    }
}

fn found_call(member: &Arc<MemberDescriptor>, args: Vec<HostValue>) -> ResolvedCall {
    ResolvedCall::Found {
        member: member.clone(),
        args,
    }
}

/// Pareto front of `scored`: one survivor is converted, several are tied
fn select<'g>(scored: &[Scored<'g>], args: &[DynamicValue]) -> Phase<'g> {
    let front: Vec<&Scored<'g>> = scored
        .iter()
        .filter(|s| !scored.iter().any(|other| dominates(&other.costs, &s.costs)))
        .collect();
    match front.as_slice() {
        [] => Phase::Empty,
        [best] => match convert_args(best, args) {
            Some(converted) => Phase::Found(best.member, converted),
            None => Phase::Empty,
        },
        tied => Phase::Ambiguous(tied.iter().map(|s| s.member.clone()).collect()),
    }
}

fn is_spreadable(member: &MemberDescriptor) -> bool {
    member.is_varargs() && !member.params().is_empty()
}

fn arity_fits(member: &MemberDescriptor, argc: usize) -> bool {
    let declared = member.params().len();
    if member.is_varargs() && declared > 0 {
        argc + 1 >= declared
    } else {
        argc == declared
    }
}

/// `a` is at least as good everywhere and strictly better somewhere
fn dominates(a: &[u32], b: &[u32]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
}

/// Element type collected by a varargs parameter
fn varargs_element(param: &HostType) -> &HostType {
    match param {
        HostType::Array(elem) => elem,
        other => other,
    }
}

fn score_varargs<'g>(
    member: &'g Arc<MemberDescriptor>,
    args: &[DynamicValue],
) -> Result<Scored<'g>, usize> {
    let params = member.params();
    let spread = spread_costs(params, args);
    let whole = if args.len() == params.len() {
        direct_costs(params, args).map(|mut costs| {
            costs.push(0);
            costs
        })
    } else {
        Err(args.len())
    };

    let (costs, shape) = match (spread, whole) {
        (Ok(s), Ok(w)) if total(&w) <= total(&s) => (w, Shape::Direct),
        (Ok(s), _) => (s, Shape::Spread),
        (Err(_), Ok(w)) => (w, Shape::Direct),
        (Err(index), Err(_)) => return Err(index),
    };
    Ok(Scored { member, costs, shape })
}

fn direct_costs(params: &[HostType], args: &[DynamicValue]) -> Result<Vec<u32>, usize> {
    let mut costs = Vec::with_capacity(args.len() + 1);
    for (i, (arg, param)) in args.iter().zip(params).enumerate() {
        costs.push(conversion_cost(arg, param).ok_or(i)?);
    }
    Ok(costs)
}

fn spread_costs(params: &[HostType], args: &[DynamicValue]) -> Result<Vec<u32>, usize> {
    let fixed = params.len() - 1;
    let elem = varargs_element(&params[fixed]);
    let mut costs = Vec::with_capacity(args.len() + 1);
    for (i, arg) in args.iter().enumerate() {
        let param = if i < fixed { &params[i] } else { elem };
        costs.push(conversion_cost(arg, param).ok_or(i)?);
    }
    costs.push(VARARGS_PACK);
    Ok(costs)
}

fn total(costs: &[u32]) -> u64 {
    costs.iter().map(|&c| c as u64).sum()
}

fn convert_args(best: &Scored<'_>, args: &[DynamicValue]) -> Option<Vec<HostValue>> {
    let params = best.member.params();
    match best.shape {
        Shape::Direct => args
            .iter()
            .zip(params)
            .map(|(arg, param)| unwrap::convert(arg, param))
            .collect(),
        Shape::Spread => {
            let fixed = params.len() - 1;
            let elem = varargs_element(&params[fixed]);
            let mut converted = args[..fixed]
                .iter()
                .zip(params)
                .map(|(arg, param)| unwrap::convert(arg, param))
                .collect::<Option<Vec<_>>>()?;
            let packed = args[fixed..]
                .iter()
                .map(|arg| unwrap::convert(arg, elem))
                .collect::<Option<Vec<_>>>()?;
            converted.push(HostValue::Array(packed));
            Some(converted)
        }
    }
}
