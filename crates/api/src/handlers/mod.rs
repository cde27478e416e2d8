pub mod activities;
pub mod geocode;
pub mod integrations;
pub mod timeline;
