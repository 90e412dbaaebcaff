// Chat widget: resume-grounded Q&A streamed from the generation API.
// All model calls go through llm_client, with no direct HTTP here.

pub mod handlers;
pub mod registry;
pub mod session;
pub mod turn;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;
