//! Utility modules: settings and string helpers.

pub mod config;
pub mod string_utils;
