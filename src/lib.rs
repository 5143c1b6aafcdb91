pub mod canon;
pub mod config;
pub mod fetch;
pub mod regimes;
pub mod select;
pub mod store;
pub mod trajectory;
