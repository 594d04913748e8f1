//! `FitTrack` store library
//!
//! Core functionality for `FitTrack`:
//! - `SQLite` storage for users, tokens, and workouts with their entries
//! - Password hashing and opaque bearer tokens
//! - The authentication gate and register/login flows
//! - Subcommands driving all of the above from the `fittrack` binary

pub mod auth;
pub mod cmd;
pub mod storage;
