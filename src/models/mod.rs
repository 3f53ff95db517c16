pub mod alert;
pub mod authority;
pub mod emergency;
pub mod gamification;
pub mod hazard;
pub mod sensor;
pub mod trip;
pub mod user;
