pub mod agent;
pub mod intent;
pub mod payload;
pub mod session;
