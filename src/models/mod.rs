pub mod boundary_point;
pub mod outage;
pub mod provider;
