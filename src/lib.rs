mod batch;
mod codec;
mod config;
mod convert;
mod converter;
mod error;
mod layout;
mod record;
mod transform;

pub use batch::*;
pub use codec::*;
pub use config::*;
pub use convert::*;
pub use converter::*;
pub use error::*;
pub use layout::*;
pub use record::*;
pub use transform::*;
