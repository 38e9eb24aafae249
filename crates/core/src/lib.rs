#![forbid(unsafe_code)]

pub mod cloud;
pub mod error;
pub mod point;
pub mod result;

pub use cloud::{Colors, PointCloud};
pub use error::{CloudError, Result};
pub use point::{is_finite_position, Point};
pub use result::FilterResult;
