//! Planner SDK - backend client and session runner.
//!
//! Connects the pure [`planner_core::RouteSession`] to a routing backend.

pub mod backend;
pub mod client;
pub mod runner;
pub mod wire;

pub use backend::RouterBackend;
pub use client::RouterClient;
pub use planner_core::SessionView;
pub use runner::{spawn_session, Intent, SessionError, SessionHandle, SessionRunner};
