pub mod signing;
pub mod time;
