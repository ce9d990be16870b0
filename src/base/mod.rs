//! Core components, types, and utilities for the helpdesk-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The keyword and response template catalog.
//! - Common types, errors and result handling.

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;
