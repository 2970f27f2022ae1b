// folio-common: shared types for the Folio server and client

pub mod protocol;
pub mod roles;
pub mod types;
