//! Type and method descriptors.
//!
//! # Responsibilities
//! - Declare the public method set of an application type
//! - Record declared parameter types, visibility and receiver kind
//! - Hold a type-erased invoker for each method
//! - Merge inherited methods from a parent descriptor
//!
//! # Design Decisions
//! - Enumeration order is declaration order; inherited methods come first
//! - A child method overrides an inherited method of the same name in place
//! - Invokers downcast receiver and arguments; a mismatch is an `InvokeError`, never a panic

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::binding::error::{BoxError, InvokeError};

use super::tag::Tag;

/// Receiver of an instance method, erased.
pub type Receiver = dyn Any + Send + Sync;

pub(crate) type RawMethod =
    Arc<dyn Fn(&Receiver, &mut [&mut dyn Any]) -> Result<(), InvokeError> + Send + Sync>;

/// Declared type of a method parameter.
#[derive(Clone, Copy)]
pub enum ParamType {
    Exact { id: TypeId, name: &'static str },
    /// Accepts any argument. Checked only when the method is invoked.
    Any,
}

impl ParamType {
    pub fn of<A: Any>() -> Self {
        ParamType::Exact {
            id: TypeId::of::<A>(),
            name: type_name::<A>(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Exact { name, .. } => *name,
            ParamType::Any => "dyn Any",
        }
    }

    /// Whether a parameter declared as `declared` can receive a value of
    /// this (expected) type.
    pub fn is_assignable_from(&self, declared: &ParamType) -> bool {
        match (self, declared) {
            (ParamType::Any, _) | (_, ParamType::Any) => true,
            (ParamType::Exact { id: expected, .. }, ParamType::Exact { id: actual, .. }) => {
                expected == actual
            }
        }
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamType::Any, ParamType::Any) => true,
            (ParamType::Exact { id: a, .. }, ParamType::Exact { id: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParamType {}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Whether a method takes `&self` or is an associated function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    Instance,
    Associated,
}

/// Return types accepted from declared methods.
pub trait MethodOutput {
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl MethodOutput for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> MethodOutput for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// One declared method.
#[derive(Clone)]
pub struct MethodDescriptor {
    name: &'static str,
    declaring_type: &'static str,
    visibility: Visibility,
    receiver: ReceiverKind,
    params: Vec<ParamType>,
    tags: Vec<Tag>,
    raw: RawMethod,
}

impl MethodDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the type that declared the method (the parent for inherited methods).
    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.name)
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn receiver(&self) -> ReceiverKind {
        self.receiver
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_static(&self) -> bool {
        self.receiver == ReceiverKind::Associated
    }

    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// All attached tags, unfiltered. Use `metadata::get_tag` for lookups.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub(crate) fn raw(&self) -> &RawMethod {
        &self.raw
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("visibility", &self.visibility)
            .field("receiver", &self.receiver)
            .field("params", &self.params)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Per-method settings collected by the `configure` closure of `TypeBuilder`.
#[derive(Debug, Default)]
pub struct MethodBuilder {
    visibility: Visibility,
    tags: Vec<Tag>,
}

impl MethodBuilder {
    /// Attach a tag. A tag of the same kind attached earlier is replaced.
    pub fn tag(mut self, tag: Tag) -> Self {
        insert_tag(&mut self.tags, tag);
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }
}

fn insert_tag(tags: &mut Vec<Tag>, tag: Tag) {
    match tags.iter_mut().find(|existing| existing.kind() == tag.kind()) {
        Some(slot) => *slot = tag,
        None => tags.push(tag),
    }
}

fn replace_or_push(methods: &mut Vec<MethodDescriptor>, method: MethodDescriptor) {
    match methods.iter_mut().find(|m| m.name == method.name) {
        Some(slot) => *slot = method,
        None => methods.push(method),
    }
}

/// Type-erased view of a descriptor, handed to binders.
#[derive(Debug)]
pub struct TypeInfo {
    name: &'static str,
    visibility: Visibility,
    tags: Vec<Tag>,
    methods: Vec<MethodDescriptor>,
}

impl TypeInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Every declared method, including private ones.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Methods visible to the dispatcher, in enumeration order.
    pub fn public_methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter().filter(|m| m.is_public())
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Method set of `T`, declared once and shared by every instance.
pub struct TypeDescriptor<T> {
    info: Arc<TypeInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypeDescriptor<T>
where
    T: Send + Sync + 'static,
{
    pub fn builder(name: &'static str) -> TypeBuilder<T> {
        TypeBuilder {
            name,
            visibility: Visibility::Public,
            tags: Vec::new(),
            inherited: Vec::new(),
            own: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<T> TypeDescriptor<T> {
    pub fn info(&self) -> &TypeInfo {
        &self.info
    }
}

impl<T> Clone for TypeDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            info: Arc::clone(&self.info),
            _marker: PhantomData,
        }
    }
}

impl<T> Deref for TypeDescriptor<T> {
    type Target = TypeInfo;

    fn deref(&self) -> &TypeInfo {
        &self.info
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.info.fmt(f)
    }
}

/// Builder for `TypeDescriptor`.
///
/// ```ignore
/// let api = TypeDescriptor::<Api>::builder("Api")
///     .method("list", Api::list, |m| m.tag(Tag::handler()).tag(Tag::get()))
///     .build();
/// ```
pub struct TypeBuilder<T> {
    name: &'static str,
    visibility: Visibility,
    tags: Vec<Tag>,
    inherited: Vec<MethodDescriptor>,
    own: Vec<MethodDescriptor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypeBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Attach a type-level tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        insert_tag(&mut self.tags, tag);
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Inherit every method of `parent`. `upcast` projects the child onto the parent.
    pub fn extends<P>(mut self, parent: &TypeDescriptor<P>, upcast: fn(&T) -> &P) -> Self
    where
        P: Send + Sync + 'static,
    {
        for method in parent.info().methods() {
            let parent_raw = Arc::clone(&method.raw);
            let raw: RawMethod = Arc::new(move |receiver: &Receiver, args: &mut [&mut dyn Any]| {
                let this = downcast_receiver::<T>(receiver)?;
                let parent_receiver: &Receiver = upcast(this);
                parent_raw(parent_receiver, args)
            });
            replace_or_push(
                &mut self.inherited,
                MethodDescriptor {
                    raw,
                    ..method.clone()
                },
            );
        }
        self
    }

    /// Declare a method taking no arguments.
    pub fn method0<F, R>(
        self,
        name: &'static str,
        f: F,
        configure: impl FnOnce(MethodBuilder) -> MethodBuilder,
    ) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: MethodOutput,
    {
        let raw: RawMethod = Arc::new(move |receiver: &Receiver, args: &mut [&mut dyn Any]| {
            if !args.is_empty() {
                return Err(arity(name, 0, args.len()));
            }
            let this = downcast_receiver::<T>(receiver)?;
            f(this).into_outcome().map_err(InvokeError::Handler)
        });
        self.declare(name, ReceiverKind::Instance, Vec::new(), raw, configure)
    }

    /// Declare a method taking one argument of type `A`.
    pub fn method<A, F, R>(
        self,
        name: &'static str,
        f: F,
        configure: impl FnOnce(MethodBuilder) -> MethodBuilder,
    ) -> Self
    where
        A: Any,
        F: Fn(&T, &mut A) -> R + Send + Sync + 'static,
        R: MethodOutput,
    {
        let raw: RawMethod = Arc::new(move |receiver: &Receiver, args: &mut [&mut dyn Any]| {
            let this = downcast_receiver::<T>(receiver)?;
            let count = args.len();
            match args {
                [a] => {
                    let a = downcast_arg::<A>(name, 0, &mut **a)?;
                    f(this, a).into_outcome().map_err(InvokeError::Handler)
                }
                _ => Err(arity(name, 1, count)),
            }
        });
        self.declare(
            name,
            ReceiverKind::Instance,
            vec![ParamType::of::<A>()],
            raw,
            configure,
        )
    }

    /// Declare a method taking two arguments.
    pub fn method2<A, B, F, R>(
        self,
        name: &'static str,
        f: F,
        configure: impl FnOnce(MethodBuilder) -> MethodBuilder,
    ) -> Self
    where
        A: Any,
        B: Any,
        F: Fn(&T, &mut A, &mut B) -> R + Send + Sync + 'static,
        R: MethodOutput,
    {
        let raw: RawMethod = Arc::new(move |receiver: &Receiver, args: &mut [&mut dyn Any]| {
            let this = downcast_receiver::<T>(receiver)?;
            let count = args.len();
            match args {
                [a, b] => {
                    let a = downcast_arg::<A>(name, 0, &mut **a)?;
                    let b = downcast_arg::<B>(name, 1, &mut **b)?;
                    f(this, a, b).into_outcome().map_err(InvokeError::Handler)
                }
                _ => Err(arity(name, 2, count)),
            }
        });
        self.declare(
            name,
            ReceiverKind::Instance,
            vec![ParamType::of::<A>(), ParamType::of::<B>()],
            raw,
            configure,
        )
    }

    /// Declare a method whose single parameter is untyped. It passes every
    /// signature check and downcasts at call time.
    pub fn method_untyped<F, R>(
        self,
        name: &'static str,
        f: F,
        configure: impl FnOnce(MethodBuilder) -> MethodBuilder,
    ) -> Self
    where
        F: Fn(&T, &mut dyn Any) -> R + Send + Sync + 'static,
        R: MethodOutput,
    {
        let raw: RawMethod = Arc::new(move |receiver: &Receiver, args: &mut [&mut dyn Any]| {
            let this = downcast_receiver::<T>(receiver)?;
            let count = args.len();
            match args {
                [a] => f(this, &mut **a)
                    .into_outcome()
                    .map_err(InvokeError::Handler),
                _ => Err(arity(name, 1, count)),
            }
        });
        self.declare(
            name,
            ReceiverKind::Instance,
            vec![ParamType::Any],
            raw,
            configure,
        )
    }

    /// Declare an associated function (no receiver). Its tags are never read.
    pub fn associated<A, F, R>(
        self,
        name: &'static str,
        f: F,
        configure: impl FnOnce(MethodBuilder) -> MethodBuilder,
    ) -> Self
    where
        A: Any,
        F: Fn(&mut A) -> R + Send + Sync + 'static,
        R: MethodOutput,
    {
        let raw: RawMethod = Arc::new(move |_receiver: &Receiver, args: &mut [&mut dyn Any]| {
            let count = args.len();
            match args {
                [a] => {
                    let a = downcast_arg::<A>(name, 0, &mut **a)?;
                    f(a).into_outcome().map_err(InvokeError::Handler)
                }
                _ => Err(arity(name, 1, count)),
            }
        });
        self.declare(
            name,
            ReceiverKind::Associated,
            vec![ParamType::of::<A>()],
            raw,
            configure,
        )
    }

    fn declare(
        mut self,
        name: &'static str,
        receiver: ReceiverKind,
        params: Vec<ParamType>,
        raw: RawMethod,
        configure: impl FnOnce(MethodBuilder) -> MethodBuilder,
    ) -> Self {
        let MethodBuilder { visibility, tags } = configure(MethodBuilder::default());
        let method = MethodDescriptor {
            name,
            declaring_type: self.name,
            visibility,
            receiver,
            params,
            tags,
            raw,
        };
        replace_or_push(&mut self.own, method);
        self
    }

    pub fn build(self) -> TypeDescriptor<T> {
        let mut methods = self.inherited;
        for method in self.own {
            replace_or_push(&mut methods, method);
        }
        TypeDescriptor {
            info: Arc::new(TypeInfo {
                name: self.name,
                visibility: self.visibility,
                tags: self.tags,
                methods,
            }),
            _marker: PhantomData,
        }
    }
}

fn arity(method: &'static str, expected: usize, actual: usize) -> InvokeError {
    InvokeError::Arity {
        method,
        expected,
        actual,
    }
}

fn downcast_receiver<T: Any>(receiver: &Receiver) -> Result<&T, InvokeError> {
    receiver.downcast_ref::<T>().ok_or(InvokeError::Receiver {
        expected: type_name::<T>(),
    })
}

fn downcast_arg<'a, A: Any>(
    method: &'static str,
    index: usize,
    arg: &'a mut dyn Any,
) -> Result<&'a mut A, InvokeError> {
    arg.downcast_mut::<A>().ok_or(InvokeError::ArgumentType {
        method,
        index,
        expected: type_name::<A>(),
    })
}
