// Citizen reports and their photos
pub mod photos;
pub mod reports;

// Alerts and the notification feed
pub mod notifications;

// Read-only reference data
pub mod resources;

// External Services
pub mod weather;

// Accounts
pub mod users;
