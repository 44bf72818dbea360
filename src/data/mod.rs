//! Tabular intermediate data shared between modules through files

pub mod frame;
pub mod saver;

pub use frame::{Column, Frame, DATE_COLUMN};
