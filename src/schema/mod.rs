pub mod annotation;
pub mod rolemap;
