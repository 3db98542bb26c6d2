//! Middleware composition around a terminal [`Dispatch`].
//!
//! A [`Pipeline`] runs its middleware in insertion order. Each stage receives a [`Next`] that only
//! reaches the stages after it, so a stage that re-dispatches through `next` never re-enters
//! itself.

// self
use crate::{
	_prelude::*,
	http::{ApiRequest, Dispatch, DispatchFuture},
};

/// A stage in a request pipeline.
///
/// Middleware share the continuation's signature, so a stage can wrap, observe, or replace the
/// dispatch of any request.
pub trait Middleware
where
	Self: Send + Sync,
{
	/// Handles `request`, usually by forwarding it through `next`.
	fn handle<'a>(&'a self, request: ApiRequest, next: Next<'a>) -> DispatchFuture<'a>;
}

/// Handle to the remainder of a pipeline.
#[derive(Clone, Copy)]
pub struct Next<'a> {
	middleware: &'a [Arc<dyn Middleware>],
	dispatcher: &'a dyn Dispatch,
}
impl<'a> Next<'a> {
	/// Creates a handle over the provided stages and terminal dispatcher.
	pub fn new(middleware: &'a [Arc<dyn Middleware>], dispatcher: &'a dyn Dispatch) -> Self {
		Self { middleware, dispatcher }
	}

	/// Sends `request` through the remaining stages.
	pub fn run(self, request: ApiRequest) -> DispatchFuture<'a> {
		match self.middleware.split_first() {
			Some((stage, rest)) =>
				stage.handle(request, Next { middleware: rest, dispatcher: self.dispatcher }),
			None => self.dispatcher.dispatch(request),
		}
	}
}
impl Debug for Next<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Next").field("remaining", &self.middleware.len()).finish()
	}
}

/// Ordered middleware stack in front of a terminal dispatcher.
#[derive(Clone)]
pub struct Pipeline {
	middleware: Vec<Arc<dyn Middleware>>,
	dispatcher: Arc<dyn Dispatch>,
}
impl Pipeline {
	/// Creates a pipeline with no middleware.
	pub fn new(dispatcher: Arc<dyn Dispatch>) -> Self {
		Self { middleware: Vec::new(), dispatcher }
	}

	/// Appends a stage; stages run in the order they were added.
	pub fn with(mut self, middleware: impl 'static + Middleware) -> Self {
		self.middleware.push(Arc::new(middleware));

		self
	}

	/// Appends a shared stage.
	pub fn with_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middleware.push(middleware);

		self
	}

	/// Number of middleware stages.
	pub fn len(&self) -> usize {
		self.middleware.len()
	}

	/// Returns `true` when the pipeline dispatches directly.
	pub fn is_empty(&self) -> bool {
		self.middleware.is_empty()
	}
}
impl Dispatch for Pipeline {
	fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_> {
		Next::new(&self.middleware, self.dispatcher.as_ref()).run(request)
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline").field("stages", &self.middleware.len()).finish()
	}
}
