mod as_value;
mod cache;
mod config;
mod ddl;
mod descriptor;
mod error;
mod executor;
mod key;
mod reflect;
mod row;
mod session;
mod util;
mod value;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use cache::*;
pub use config::*;
pub use ddl::*;
pub use descriptor::*;
pub use error::*;
pub use executor::*;
pub use key::*;
pub use reflect::*;
pub use row::*;
pub use session::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
