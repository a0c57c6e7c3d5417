pub mod board;
pub mod error;
pub mod id;
pub mod parse;
pub mod server;

pub mod prelude {
    pub use crate::board::Board;
    pub use crate::error::BoardError;
    pub use crate::id::PlayerId;
    pub use crate::parse::{parse_from_file, parse_from_str, ParseError};
    pub use crate::server::{ServerOptions, TextProtocolServer};

    pub use anyhow::{anyhow, Context, Error};
    pub type Result<T> = anyhow::Result<T, Error>;
}
