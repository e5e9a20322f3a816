// Practice session accounting

pub mod tracker;

pub use tracker::SessionTracker;
