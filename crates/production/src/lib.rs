//! Proativa production library.
//!
//! Tracks production orders, the batches produced against each order item,
//! and the quality certificates issued per batch. Batches move across a
//! three-column Kanban board (`todo`, `in_progress`, `done`); only `done`
//! batches count towards an item's completion.
//!
//! This crate provides the service as a library, allowing it to be tested
//! and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
