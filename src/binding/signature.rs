//! Signature validation and handle synthesis.
//!
//! # Responsibilities
//! - Decide whether a tag applies to a method
//! - Verify the method's declared parameters against the binder's expectation
//! - Synthesize the invocation handle once validation passed
//!
//! # Design Decisions
//! - An absent tag is the common case and yields `Ok(false)`, never an error
//! - A present tag on an incompatible method is a configuration error, never skipped
//! - Validation runs at configuration time only; handles are not re-checked per call

use crate::metadata::{get_tag, MethodDescriptor, ParamType, Tag, TagKind};

use super::error::BindError;
use super::handle::{Instance, InvocationHandle};

/// Whether `method`'s declared parameter list can receive `expected`.
pub fn signature_matches(method: &MethodDescriptor, expected: &[ParamType]) -> bool {
    let declared = method.params();
    declared.len() == expected.len()
        && expected
            .iter()
            .zip(declared)
            .all(|(expected, declared)| expected.is_assignable_from(declared))
}

/// The tag of `kind` on `method`, provided the method can be invoked with
/// `expected`. A tagged but incompatible method is an error.
pub fn compatible_tag<'m>(
    method: &'m MethodDescriptor,
    kind: TagKind,
    expected: &[ParamType],
) -> Result<Option<&'m Tag>, BindError> {
    let Some(tag) = get_tag(method, kind) else {
        return Ok(None);
    };

    if signature_matches(method, expected) {
        Ok(Some(tag))
    } else {
        Err(BindError::IncompatibleSignature {
            type_name: method.declaring_type(),
            method: method.name(),
            tag: kind,
            expected: describe(expected),
            actual: describe(method.params()),
        })
    }
}

pub fn is_compatible(
    method: &MethodDescriptor,
    kind: TagKind,
    expected: &[ParamType],
) -> Result<bool, BindError> {
    compatible_tag(method, kind, expected).map(|tag| tag.is_some())
}

/// Bind `method` to `instance`. `None` if the signature does not match.
pub fn method_handle(
    instance: &Instance,
    method: &MethodDescriptor,
    expected: &[ParamType],
) -> Option<InvocationHandle> {
    signature_matches(method, expected).then(|| InvocationHandle::new(instance, method))
}

fn describe(params: &[ParamType]) -> String {
    params
        .iter()
        .map(ParamType::name)
        .collect::<Vec<_>>()
        .join(", ")
}
