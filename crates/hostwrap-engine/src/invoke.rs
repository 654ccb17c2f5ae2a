//! Executing resolved members
//!
//! Host failures, whether returned as errors or raised as panics, come back
//! as [`BridgeError::InvocationFailure`] naming the member's signature.

use std::panic::{catch_unwind, AssertUnwindSafe};

use hostwrap_sdk::{HostError, HostObject, HostValue, MemberBody, MemberDescriptor};

use crate::error::{BridgeError, BridgeResult};

/// Call a method or constructor with already converted arguments.
///
/// Static members and constructors ignore `receiver`; instance members
/// require one.
pub fn invoke_member(
    member: &MemberDescriptor,
    receiver: Option<&HostObject>,
    args: &[HostValue],
) -> BridgeResult<HostValue> {
    let callable = match member.body() {
        MemberBody::Callable(callable) => callable,
        MemberBody::Getter(_) => {
            return Err(failure(
                member,
                HostError::ArgumentError("fields cannot be called".to_string()),
            ))
        }
    };
    let receiver = effective_receiver(member, receiver)?;
    tracing::trace!(member = %member, argc = args.len(), "invoking");
    guarded(member, || callable(receiver, args))
}

/// Read a field of `receiver`
pub fn read_field(member: &MemberDescriptor, receiver: Option<&HostObject>) -> BridgeResult<HostValue> {
    let getter = match member.body() {
        MemberBody::Getter(getter) => getter,
        MemberBody::Callable(_) => {
            return Err(failure(
                member,
                HostError::ArgumentError("not a field".to_string()),
            ))
        }
    };
    let receiver = effective_receiver(member, receiver)?;
    guarded(member, || getter(receiver))
}

fn effective_receiver<'a>(
    member: &MemberDescriptor,
    receiver: Option<&'a HostObject>,
) -> BridgeResult<Option<&'a HostObject>> {
    if member.is_static() {
        return Ok(None);
    }
    match receiver {
        Some(obj) => Ok(Some(obj)),
        None => Err(failure(
            member,
            HostError::ArgumentError("instance member needs a receiver".to_string()),
        )),
    }
}

fn guarded(
    member: &MemberDescriptor,
    call: impl FnOnce() -> Result<HostValue, HostError>,
) -> BridgeResult<HostValue> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(failure(member, err)),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::debug!(member = %member, %message, "member panicked");
            Err(failure(member, HostError::Panic(message)))
        }
    }
}

fn failure(member: &MemberDescriptor, source: HostError) -> BridgeError {
    BridgeError::InvocationFailure {
        member: member.to_string(),
        source,
    }
}
