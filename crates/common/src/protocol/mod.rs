pub mod envelope;
pub mod requests;
pub mod rpc_methods;
