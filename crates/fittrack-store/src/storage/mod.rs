//! SQLite storage for `FitTrack`.
//!
//! Provides persistence for users, tokens, and workouts with their entries.

mod db;
mod models;
mod queries;
mod queries_workouts;


pub use db::{DatabaseError, FitDatabase, WorkFuture};
pub use models::*;
