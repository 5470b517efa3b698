pub mod finnhub;
pub mod ibkr;
pub mod mock;

pub use finnhub::FinnhubAdapter;
pub use ibkr::IbkrGatewayAdapter;
pub use mock::MockAdapter;
