pub mod model;
pub mod reqwest_based;
pub mod stubs;
