pub mod booking_store;
pub mod clock;
pub mod handoff;
pub mod ids;
pub mod shell;
pub mod storage;
pub mod validation;
