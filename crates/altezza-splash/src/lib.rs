#![forbid(unsafe_code)]

//! Altezza Pictures "coming soon" splash.
//!
//! A full-screen terminal rendition of the brand's holding page: an ambient
//! background, a floating logo with a long-press easter egg, and a scripted
//! assistant that narrates a few messages and links to the social profile.
//!
//! The binary lives in `main.rs`; everything here is exposed so the
//! integration tests can drive [`app::SplashModel`] through the runtime's
//! simulator.

pub mod app;
pub mod cli;
pub mod layout;
pub mod theme;
pub mod view;
