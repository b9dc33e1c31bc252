//! # UI Module
//!
//! This module contains all UI components for the Guitar Tab Generator.

pub mod main_display;
pub mod notes_display;
pub mod tab_display;
