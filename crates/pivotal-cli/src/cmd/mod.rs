pub mod poker;
pub mod project;
pub mod report;
pub mod story;
