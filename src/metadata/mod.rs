//! Method metadata subsystem.
//!
//! # Data Flow
//! ```text
//! Application type T
//!     → descriptor.rs (TypeDescriptor<T> declared once with a builder)
//!         - public method set, declaration order
//!         - declared parameter types per method
//!         - tags attached to each method
//!     → accessor.rs (tag lookup with visibility/receiver filters)
//!     → consumed by binding::signature and the binders
//! ```
//!
//! # Design Decisions
//! - No runtime reflection: the method set is declared explicitly
//! - Tags are immutable once the descriptor is built
//! - One tag per kind per method; a later tag of the same kind replaces the earlier one
//! - Private and associated (static) methods never expose tags

pub mod accessor;
pub mod descriptor;
pub mod tag;

pub use accessor::{get_tag, get_type_tag};
pub use descriptor::{
    MethodBuilder, MethodDescriptor, MethodOutput, ParamType, ReceiverKind, TypeBuilder,
    TypeDescriptor, TypeInfo, Visibility,
};
pub use tag::{HttpVerb, Tag, TagKind};
