//! Built-in rules.
//!
//! Every rule except [`Required`] and [`Custom`] passes blank values, so a
//! field is only reported as missing once, by `Required`.

mod array;
mod custom;
mod date;
mod format;
mod length;
mod presence;
mod range;
mod unique;

pub use array::ArrayRule;
pub use custom::Custom;
pub use date::DateRule;
pub use format::{Email, Pattern, Url};
pub use length::{Length, MaxLength, MinLength};
pub use presence::Required;
pub use range::Range;
pub use unique::Unique;
