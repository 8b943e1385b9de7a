pub mod cache;
pub mod constraint;
pub mod entity;
pub mod group;
pub mod handle;
pub mod request;

pub use cache::*;
pub use constraint::*;
pub use entity::*;
pub use group::*;
pub use handle::*;
pub use request::*;
