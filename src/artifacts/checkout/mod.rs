//! Working tree checkout
//!
//! Brings the working directory and the index in line with a target tree:
//!
//! - `decision`: the per-path three-way table
//! - `prescan`: classification of every path into conflicts, removals and
//!   updates, without side effects
//! - `engine`: cleanup and materialization driven by the prescan
//! - `conflict` / `error`: how conflicts are reported to the caller
//!
//! Every conflict is found before anything is written, so a checkout that
//! fails on conflicts leaves the working directory and the index untouched.

pub mod conflict;
pub mod decision;
pub mod engine;
pub mod error;
pub mod prescan;
