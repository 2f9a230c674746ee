//! Raw output of the extraction pass.

pub mod point_cloud;

pub use point_cloud::PointCloud;
