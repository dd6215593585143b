pub mod diff;
pub mod jurisdictions;
pub mod report;
pub mod token;
