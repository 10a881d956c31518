pub mod banking_api;
pub mod util;

pub use banking_api::BankingApiGateway;
