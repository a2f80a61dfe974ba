//! Simulated students
//!
//! Students chime in with questions at random intervals and react when the
//! presenter asks the class something. Trigger rules are pure functions in
//! `triggers`; `simulator` turns decisions into messages.

pub mod triggers;
pub mod simulator;

pub use triggers::{evaluate_trigger, is_question, random_interval_elapsed, TriggerContext, TriggerDecision};
pub use simulator::{MessageKind, StudentMessage, StudentSimulator};
