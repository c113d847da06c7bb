//! muxpick library crate.
//!
//! A keyboard-driven fuzzy picker over two kinds of candidates:
//! - tmux sessions
//! - git worktrees of the current repository
//!
//! The picker state machine lives in [`app`]; the tmux and git adapters sit
//! behind [`source::CandidateSource`].

pub mod app;
pub mod candidate;
pub mod config;
pub mod event_loop;
pub mod input;
pub mod logging;
pub mod search;
pub mod source;
pub mod ui;
