//! Widgets built with the composite builder.
//!
//! - [`container`] - a plain grouping element
//! - [`button`] - executes an action on click, Enter or Space
//! - [`tab_button`] - one tab, representing its value
//! - [`tabbar`] - a group of tab buttons with one selected
//! - [`dropdown`] - a button with a lazily coupled popup filled by an async fetch
//!
//! Each widget exposes `definition()` (its [`CompositeDef`](crate::composite::CompositeDef))
//! and `build(system, spec)`.

pub mod button;
pub mod container;
pub mod dropdown;
pub mod tab_button;
pub mod tabbar;
