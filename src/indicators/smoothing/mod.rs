pub mod wilder;

pub use wilder::WilderSmoother;
