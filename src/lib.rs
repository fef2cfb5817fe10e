// Library for tests to access modules

pub mod aggregate;
pub mod client;
pub mod collector;
pub mod config;
pub mod fetch;
pub mod models;
pub mod registry;
pub mod routes;
pub mod worker;
