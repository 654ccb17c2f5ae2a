//! Argument conversion costs
//!
//! Lower is better. Classes never overlap, so an exact match always beats a
//! widening, which always beats a narrowing that keeps the value, and so on:
//!
//! | Cost            | Conversion                                          |
//! |-----------------|-----------------------------------------------------|
//! | 0               | exact type                                          |
//! | 1..=9           | numeric widening that can never lose information    |
//! | 10..=19         | numeric narrowing where this value fits exactly     |
//! | 20..=39         | numeric conversion that may round                   |
//! | 50 + distance   | assignable reference (supertype, `Number`, `Object`) |
//! | 1000            | adaptation (1-char text to char, sequence to list)  |
//! | 100_000         | packing trailing arguments into a varargs array     |

use hostwrap_sdk::{DynamicValue, HostType, Number, NumericKind, ROOT_TYPE};

/// Same type
pub const EXACT: u32 = 0;
/// Start of the value-preserving narrowing class
pub const NARROWING_FIT: u32 = 10;
/// Start of the lossy numeric class
pub const LOSSY: u32 = 20;
/// Start of the reference assignment class
pub const REFERENCE: u32 = 50;
/// Representation change of the value
pub const ADAPTATION: u32 = 1000;
/// Charged once when trailing arguments are packed into a varargs array
pub const VARARGS_PACK: u32 = 100_000;

/// Cost of passing `value` where `target` is declared; `None` when
/// the value cannot be converted at all
pub fn conversion_cost(value: &DynamicValue, target: &HostType) -> Option<u32> {
    match (value, target) {
        (DynamicValue::Null, t) if t.is_primitive() => None,
        (DynamicValue::Null, _) => Some(REFERENCE),

        (DynamicValue::Bool(_), HostType::Bool) => Some(EXACT),
        (DynamicValue::Bool(_), HostType::Any) => Some(REFERENCE + 1),

        (DynamicValue::Number(n), HostType::Num(kind)) => numeric_cost(n, *kind),
        (DynamicValue::Number(_), HostType::Number) => Some(REFERENCE + 1),
        (DynamicValue::Number(_), HostType::Any) => Some(REFERENCE + 2),

        (DynamicValue::Text(_), HostType::Str) => Some(EXACT),
        (DynamicValue::Text(_), HostType::Any) => Some(REFERENCE + 1),
        (DynamicValue::Text(s), HostType::Char) if s.chars().count() == 1 => Some(ADAPTATION),

        (DynamicValue::Sequence(items), HostType::List(elem) | HostType::Array(elem)) => {
            all_convertible(items.iter(), elem).then_some(ADAPTATION)
        }
        (DynamicValue::Sequence(items), HostType::Any) => {
            all_convertible(items.iter(), &HostType::Any).then_some(REFERENCE + 1)
        }

        (DynamicValue::Mapping(entries), HostType::Map(value_type)) => {
            all_convertible(entries.values(), value_type).then_some(ADAPTATION)
        }
        (DynamicValue::Mapping(entries), HostType::Any) => {
            all_convertible(entries.values(), &HostType::Any).then_some(REFERENCE + 1)
        }

        (DynamicValue::Object(obj), HostType::Object(name)) => match obj.runtime_type().distance_to(name)? {
            0 => Some(EXACT),
            d => Some(REFERENCE + d),
        },
        (DynamicValue::Object(obj), HostType::Any) => {
            obj.runtime_type().distance_to(ROOT_TYPE).map(|d| REFERENCE + d)
        }

        _ => None,
    }
}

fn all_convertible<'a>(mut values: impl Iterator<Item = &'a DynamicValue>, target: &HostType) -> bool {
    values.all(|v| conversion_cost(v, target).is_some())
}

/// Cost of converting number `n` to `to`
pub fn numeric_cost(n: &Number, to: NumericKind) -> Option<u32> {
    let from = n.kind();
    if from == to {
        return Some(EXACT);
    }
    if let Some(cost) = widening_cost(from, to) {
        return Some(cost);
    }
    let distance = rank(from).abs_diff(rank(to));
    if n.to_exact(to).is_some() {
        return Some(NARROWING_FIT + distance.min(9));
    }
    if !to.is_integral() && lossy_fits(n, to) {
        return Some(LOSSY + distance.min(19));
    }
    None
}

/// Conversions between kinds that never lose information
fn widening_cost(from: NumericKind, to: NumericKind) -> Option<u32> {
    use NumericKind::*;
    match (from, to) {
        (f, t) if f.is_integral() && t.is_integral() && rank(t) > rank(f) => Some(rank(t) - rank(f)),
        (Float, Double) => Some(1),
        (Byte | Short, Float) => Some(5),
        (Byte | Short | Int, Double) => Some(6),
        _ => None,
    }
}

/// Whether a rounding conversion to a floating kind stays finite
fn lossy_fits(n: &Number, to: NumericKind) -> bool {
    let wide = n.as_f64();
    match to {
        NumericKind::Float => !wide.is_finite() || (wide as f32).is_finite(),
        _ => true,
    }
}

fn rank(kind: NumericKind) -> u32 {
    match kind {
        NumericKind::Byte => 0,
        NumericKind::Short => 1,
        NumericKind::Int => 2,
        NumericKind::Long => 3,
        NumericKind::BigInteger => 4,
        NumericKind::Float => 5,
        NumericKind::Double => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwrap_sdk::{HostObject, RuntimeType, TypeCategory};

    fn num(kind: NumericKind) -> HostType {
        HostType::Num(kind)
    }

    #[test]
    fn test_numeric_classes_are_ordered() {
        let five = DynamicValue::from(5);
        let exact = conversion_cost(&five, &num(NumericKind::Int)).unwrap();
        let widen = conversion_cost(&five, &num(NumericKind::Long)).unwrap();
        let to_double = conversion_cost(&five, &num(NumericKind::Double)).unwrap();
        let narrow = conversion_cost(&five, &num(NumericKind::Byte)).unwrap();
        let boxed = conversion_cost(&five, &HostType::Number).unwrap();
        let any = conversion_cost(&five, &HostType::Any).unwrap();
        assert!(exact < widen && widen < to_double && to_double < narrow && narrow < boxed && boxed < any);
    }

    #[test]
    fn test_narrowing_requires_fit() {
        assert_eq!(conversion_cost(&DynamicValue::from(300), &num(NumericKind::Byte)), None);
        assert_eq!(conversion_cost(&DynamicValue::from(2.5), &num(NumericKind::Int)), None);
        let fits = conversion_cost(&DynamicValue::from(2.0), &num(NumericKind::Int)).unwrap();
        assert!((NARROWING_FIT..LOSSY).contains(&fits));
    }

    #[test]
    fn test_huge_float_does_not_fit_big_integer() {
        let big = num(NumericKind::BigInteger);
        assert_eq!(conversion_cost(&DynamicValue::from(1e300), &big), None);
        assert!(crate::overload::unwrap(&DynamicValue::from(1e300), &big).is_err());
        assert!(conversion_cost(&DynamicValue::from(1e30), &big).is_some());
    }

    #[test]
    fn test_lossy_only_toward_floating() {
        let big = DynamicValue::from(i64::MAX);
        let cost = conversion_cost(&big, &num(NumericKind::Double)).unwrap();
        assert!((LOSSY..REFERENCE).contains(&cost));
        assert_eq!(conversion_cost(&DynamicValue::from(1e300), &num(NumericKind::Float)), None);
    }

    #[test]
    fn test_null_only_into_references() {
        assert_eq!(conversion_cost(&DynamicValue::Null, &num(NumericKind::Int)), None);
        assert_eq!(conversion_cost(&DynamicValue::Null, &HostType::Bool), None);
        assert_eq!(conversion_cost(&DynamicValue::Null, &HostType::Str), Some(REFERENCE));
    }

    #[test]
    fn test_adaptations() {
        assert_eq!(conversion_cost(&DynamicValue::from("x"), &HostType::Char), Some(ADAPTATION));
        assert_eq!(conversion_cost(&DynamicValue::from("xy"), &HostType::Char), None);
        let seq = DynamicValue::from(vec![1, 2]);
        assert_eq!(conversion_cost(&seq, &HostType::list(num(NumericKind::Long))), Some(ADAPTATION));
        assert_eq!(conversion_cost(&seq, &HostType::array(HostType::Str)), None);
        assert_eq!(conversion_cost(&DynamicValue::from(1), &HostType::Str), None);
    }

    #[test]
    fn test_object_distance() {
        let sub = RuntimeType::new("Sub", vec!["Base".into()], TypeCategory::Bean);
        let obj = DynamicValue::Object(HostObject::new(sub, ()));
        assert_eq!(conversion_cost(&obj, &HostType::object("Sub")), Some(EXACT));
        assert_eq!(conversion_cost(&obj, &HostType::object("Base")), Some(REFERENCE + 1));
        assert_eq!(conversion_cost(&obj, &HostType::Any), Some(REFERENCE + 2));
        assert_eq!(conversion_cost(&obj, &HostType::object("Other")), None);
    }
}
