//! Browser client core for the finance tracker.
//!
//! This crate is the logic layer behind the dashboard, analytics and budget
//! pages: the REST client talking to the backend, the pure aggregation
//! engine that turns the raw transaction list into category, budget and
//! headline summaries, the draft/applied filter controller, and the Yew
//! hooks that hold the per-page state. Page markup, styling and chart
//! rendering live with the components that consume these hooks.

pub mod hooks;
pub mod services;
pub mod state;
