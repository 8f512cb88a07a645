mod api;
mod backend;
mod profile;

pub use self::api::*;
pub use self::backend::*;
pub use self::profile::*;
