//! Tag lookup.
//!
//! # Responsibilities
//! - Return the tag of a given kind attached to a method or a type
//! - Hide tags on methods that can never be bound
//!
//! # Design Decisions
//! - Private and associated methods report no tags, even if tagged
//! - Type-level lookup is gated on type visibility only
//! - Pure functions, no side effects

use super::descriptor::{MethodDescriptor, TypeInfo};
use super::tag::{Tag, TagKind};

/// Tag of `kind` on `method`, if the method is public and takes `&self`.
pub fn get_tag(method: &MethodDescriptor, kind: TagKind) -> Option<&Tag> {
    if method.is_static() || !method.is_public() {
        return None;
    }
    method.tags().iter().find(|tag| tag.kind() == kind)
}

/// Tag of `kind` attached to the type itself, if the type is public.
pub fn get_type_tag(ty: &TypeInfo, kind: TagKind) -> Option<&Tag> {
    if !ty.is_public() {
        return None;
    }
    ty.tags().iter().find(|tag| tag.kind() == kind)
}
