//! Converting dynamic values into host values of a declared type

use hostwrap_sdk::{DynamicValue, HostType, HostValue};

use super::cost::conversion_cost;
use crate::error::{BridgeError, BridgeResult};

/// Convert `value` for a parameter declared as `target`.
///
/// Succeeds exactly when [`conversion_cost`] is `Some`.
pub fn unwrap(value: &DynamicValue, target: &HostType) -> BridgeResult<HostValue> {
    conversion_cost(value, target)
        .and_then(|_| convert(value, target))
        .ok_or_else(|| BridgeError::UnwrapFailed {
            expected: target.to_string(),
            got: value.type_name(),
        })
}

pub(crate) fn convert(value: &DynamicValue, target: &HostType) -> Option<HostValue> {
    let host = match (value, target) {
        (DynamicValue::Null, _) => HostValue::Null,
        (DynamicValue::Bool(b), _) => HostValue::Bool(*b),
        (DynamicValue::Number(n), HostType::Num(kind)) => {
            HostValue::Num(n.to_exact(*kind).unwrap_or_else(|| n.to_lossy(*kind)))
        }
        (DynamicValue::Number(n), _) => HostValue::Num(*n),
        (DynamicValue::Text(s), HostType::Char) => HostValue::Char(s.chars().next()?),
        (DynamicValue::Text(s), _) => HostValue::Str(s.clone()),
        (DynamicValue::Sequence(items), HostType::Array(elem)) => HostValue::Array(convert_all(items, elem)?),
        (DynamicValue::Sequence(items), HostType::List(elem)) => HostValue::List(convert_all(items, elem)?),
        (DynamicValue::Sequence(items), _) => HostValue::List(convert_all(items, &HostType::Any)?),
        (DynamicValue::Mapping(entries), target) => {
            let value_type = match target {
                HostType::Map(value_type) => value_type.as_ref(),
                _ => &HostType::Any,
            };
            HostValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| Some((k.clone(), convert(v, value_type)?)))
                    .collect::<Option<_>>()?,
            )
        }
        (DynamicValue::Object(obj), _) => HostValue::Object(obj.clone()),
    };
    Some(host)
}

fn convert_all(items: &[DynamicValue], elem: &HostType) -> Option<Vec<HostValue>> {
    items.iter().map(|v| convert(v, elem)).collect()
}
