//! corrlinker web server.
//!
//! Browser sign-in through an OpenID Connect provider with server-side
//! sessions, and a profile page guarded by the session.

#![allow(non_snake_case)]

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;
