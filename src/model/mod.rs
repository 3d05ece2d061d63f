pub mod common;
pub mod copyright;
pub mod device;
pub mod entity;
pub mod scientist;

pub use common::*;
pub use copyright::*;
pub use device::*;
pub use entity::*;
pub use scientist::*;
