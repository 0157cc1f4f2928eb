pub mod booking;
pub mod service;
pub mod shell;
pub mod theme;

pub use booking::{Booking, BookingFilter, BookingStatus, NewBooking};
pub use service::{default_services, NewService, Service};
pub use shell::{CacheKey, Destination, RequestMode, ResponseKind, ShellRequest, ShellResponse};
pub use theme::{Palette, Theme};
