//! Post-routing algorithms: isochrone synthesis, population sums and the
//! access walk from an off-network origin

mod access;
mod isochrone;
mod population;

pub use access::{AccessLeg, access_leg, access_minutes};
pub use isochrone::{intersect, repair, synthesize};
pub use population::population_sum;
