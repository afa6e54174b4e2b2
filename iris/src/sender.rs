mod common;
mod publisher;

pub use common::ArrayElement;
pub use publisher::{ArraySender, DoubleArraySender, IntegerArraySender};
