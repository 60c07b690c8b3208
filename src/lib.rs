pub mod constants;
pub mod merge;
pub mod runner;
pub mod scanner;
pub mod xml;
