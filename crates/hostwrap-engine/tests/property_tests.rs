//! Property-based tests for overload resolution and the introspection cache.
//!
//! Generates random overload sets and argument lists and checks:
//! 1. Determinism: the outcome does not depend on declaration order
//! 2. Soundness: a selected member accepts every supplied argument
//! 3. Numeric cost ordering: exact < widening < reference, and narrowing only
//!    when the value fits
//! 4. Cache idempotence: repeated lookups without invalidation share one entry

use std::sync::Arc;

use hostwrap_engine::{
    conversion_cost, resolve, unwrap, AccessPolicy, CallableGroup, ClassIntrospector,
    IntrospectionConfig, ResolvedCall,
};
use hostwrap_sdk::{
    DynamicValue, HostType, HostValue, MemberDescriptor, NumericKind, RuntimeType, TypeCategory,
    TypeRegistry,
};
use proptest::prelude::*;

// -- Strategies --

fn num(kind: NumericKind) -> HostType {
    HostType::Num(kind)
}

/// Fixed pool of overloads a group is drawn from
fn overload_pool() -> Vec<Arc<MemberDescriptor>> {
    let sigs: Vec<(Vec<HostType>, bool)> = vec![
        (vec![], false),
        (vec![num(NumericKind::Int)], false),
        (vec![num(NumericKind::Long)], false),
        (vec![num(NumericKind::Double)], false),
        (vec![HostType::Str], false),
        (vec![HostType::Any], false),
        (vec![HostType::Number], false),
        (vec![HostType::Bool], false),
        (vec![num(NumericKind::Int), num(NumericKind::Long)], false),
        (vec![num(NumericKind::Long), num(NumericKind::Int)], false),
        (vec![HostType::Str, HostType::Any], false),
        (vec![HostType::list(HostType::Any)], false),
        (vec![HostType::array(HostType::Any)], true),
        (vec![HostType::Str, HostType::array(HostType::Str)], true),
        (vec![HostType::array(num(NumericKind::Int))], true),
    ];
    sigs.into_iter()
        .map(|(params, varargs)| {
            let m = MemberDescriptor::method("gen.T", "m", params, |_, _| Ok(HostValue::Null));
            Arc::new(if varargs { m.varargs() } else { m })
        })
        .collect()
}

fn value_strategy() -> impl Strategy<Value = DynamicValue> {
    let leaf = prop_oneof![
        Just(DynamicValue::Null),
        any::<bool>().prop_map(DynamicValue::from),
        any::<i8>().prop_map(DynamicValue::from),
        any::<i32>().prop_map(DynamicValue::from),
        any::<i64>().prop_map(DynamicValue::from),
        (-1.0e6f64..1.0e6).prop_map(DynamicValue::from),
        "[a-z]{0,3}".prop_map(|s| DynamicValue::from(s.as_str())),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop::collection::vec(inner, 0..3).prop_map(DynamicValue::Sequence)
    })
}

fn args_strategy() -> impl Strategy<Value = Vec<DynamicValue>> {
    prop::collection::vec(value_strategy(), 0..4)
}

fn group_strategy() -> impl Strategy<Value = Vec<usize>> {
    let len = overload_pool().len();
    prop::collection::vec(0..len, 1..6)
}

fn group_of(indices: &[usize]) -> CallableGroup {
    let pool = overload_pool();
    CallableGroup::from_members(indices.iter().map(|&i| pool[i].clone()))
        .expect("at least one member")
}

/// Order-independent summary of a resolution outcome
fn outcome(call: ResolvedCall) -> String {
    match call {
        ResolvedCall::Found { member, .. } => format!("found {}", member),
        ResolvedCall::WrongArity => "wrong arity".to_string(),
        ResolvedCall::NoCompatibleOverload { failing_argument } => {
            format!("incompatible {:?}", failing_argument)
        }
        ResolvedCall::Ambiguous { candidates } => {
            let mut names: Vec<String> = candidates.iter().map(|m| m.to_string()).collect();
            names.sort();
            format!("ambiguous {}", names.join(" | "))
        }
    }
}

// -- Properties --

proptest! {
    #[test]
    fn resolution_ignores_declaration_order(indices in group_strategy(), args in args_strategy()) {
        let forward = group_of(&indices);
        let mut reversed_indices = indices.clone();
        reversed_indices.reverse();
        let reversed = group_of(&reversed_indices);

        prop_assert_eq!(outcome(resolve(&forward, &args)), outcome(resolve(&reversed, &args)));
    }

    #[test]
    fn selected_member_accepts_its_arguments(indices in group_strategy(), args in args_strategy()) {
        let group = group_of(&indices);
        if let ResolvedCall::Found { member, args: converted } = resolve(&group, &args) {
            let params = member.params();
            prop_assert_eq!(converted.len(), params.len());
            if !member.is_varargs() {
                for (arg, param) in args.iter().zip(params) {
                    prop_assert!(unwrap(arg, param).is_ok());
                }
            }
        }
    }

    #[test]
    fn integer_costs_are_ordered(v in any::<i32>()) {
        let value = DynamicValue::from(v);
        let exact = conversion_cost(&value, &num(NumericKind::Int));
        let long = conversion_cost(&value, &num(NumericKind::Long));
        let double = conversion_cost(&value, &num(NumericKind::Double));
        let boxed = conversion_cost(&value, &HostType::Number);
        prop_assert_eq!(exact, Some(0));
        prop_assert!(exact < long && long < double && double < boxed);

        let byte = conversion_cost(&value, &num(NumericKind::Byte));
        prop_assert_eq!(byte.is_some(), i8::try_from(v).is_ok());
        if let Some(byte) = byte {
            prop_assert!(double.map_or(false, |d| d < byte));
        }
    }

    #[test]
    fn repeated_lookup_shares_entry(ops in prop::collection::vec((0usize..3, any::<bool>()), 1..20)) {
        let registry = Arc::new(TypeRegistry::new());
        let types: Vec<RuntimeType> = (0..3)
            .map(|i| {
                registry
                    .define(format!("gen.T{}", i))
                    .method("m", vec![], |_, _| Ok(HostValue::Null))
                    .register()
            })
            .collect();
        let introspector = ClassIntrospector::new(
            registry.clone(),
            AccessPolicy::AllowAll,
            &IntrospectionConfig::default(),
        );

        for (index, invalidate) in ops {
            let ty = &types[index];
            if invalidate {
                introspector.invalidate(ty);
                prop_assert!(introspector.len() < 3);
            } else {
                let first = introspector.get(ty);
                let second = introspector.get(ty);
                prop_assert!(Arc::ptr_eq(&first, &second));
                prop_assert_eq!(first.runtime_type(), ty);
            }
        }
    }
}

#[test]
fn test_category_does_not_affect_resolution() {
    let group = group_of(&[1, 2, 5]);
    let plain = RuntimeType::new("gen.A", vec![], TypeCategory::Bean);
    let numeric = RuntimeType::new("gen.B", vec![], TypeCategory::Number);
    let a = DynamicValue::Object(hostwrap_sdk::HostObject::new(plain, ()));
    let b = DynamicValue::Object(hostwrap_sdk::HostObject::new(numeric, ()));
    assert_eq!(
        outcome(resolve(&group, &[a])),
        outcome(resolve(&group, &[b]))
    );
}
