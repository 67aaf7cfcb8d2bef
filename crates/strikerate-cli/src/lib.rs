// Console front end shared by the strikerate binaries.

pub mod charts;
pub mod logging;
pub mod prompt;
pub mod report;
