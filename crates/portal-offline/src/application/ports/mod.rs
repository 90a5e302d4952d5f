pub mod connectivity;
pub mod form_gateway;
pub mod offline_store;
