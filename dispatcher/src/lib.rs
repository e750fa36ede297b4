//! # Dispatcher
//!
//! - [`ModelRegistry`]: user id → model handle (`Arc<dyn LlmClient>`), backed by a credential store
//! - [`Dispatcher`]: appends the user's text to conversation memory, calls the model with the whole
//!   window and records the answer

mod dispatcher;
mod registry;

pub use dispatcher::Dispatcher;
pub use registry::ModelRegistry;
