pub mod app_config;
pub mod booking_store;
pub mod checkout;
pub mod file_repo;
pub mod memory;
pub mod redis_repo;

pub use booking_store::{BookingStore, StoreError, StorePolicy, StoreResult};
pub use checkout::{Checkout, CheckoutError, PaymentOutcome};
pub use file_repo::FileStorage;
pub use memory::{MemoryStorage, UnavailableStorage};
pub use redis_repo::RedisStorage;
