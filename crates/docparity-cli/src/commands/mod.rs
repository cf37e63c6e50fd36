pub mod extract;
pub mod reconcile;
pub mod round;
