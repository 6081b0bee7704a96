// smartcart/src/state/mod.rs

//! Observable state containers shared between repositories and their subscribers.

pub mod cell;
pub mod view_state;

pub use cell::StateCell;
pub use view_state::{Loadable, ViewState};
