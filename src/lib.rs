//! coachsync - workout-session composition and synchronization core
//!
//! The interesting part of a training-client app is not its CRUD screens but
//! how a session's exercises compose and how the client cache stays honest:
//!
//! - [`grouping`]: pure display-numbering and group-boundary logic for
//!   supersets and circuits
//! - [`store`]: the in-memory cache plus the sync service that orders every
//!   mutation as remote call -> store update -> refresh event
//! - [`gateway`]: the typed CRUD boundary to the backend
//! - [`events`]: the broadcast bus that tells views to re-fetch
//! - [`report`]: page-break placement for the exported session list

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod grouping;
pub mod model;
pub mod report;
pub mod store;
