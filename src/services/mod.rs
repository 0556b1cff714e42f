pub mod booking_service;
pub mod notification_service;
pub mod token_service;
