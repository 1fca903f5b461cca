//! Use cases: the negotiation run, recommendation synthesis, and the
//! session service surface.

pub mod recommend;
pub mod room_service;
pub mod run_negotiation;
