// Service exports
pub mod roster;

pub use roster::{
    resolve_service_token, RosterClient, RosterResponse, UpstreamError, DEFAULT_TOKEN_FILE,
    TOKEN_FILE_ENV,
};
