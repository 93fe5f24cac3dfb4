pub mod app;
pub mod logging;
pub mod mission;
pub mod robot;
pub mod sim;
pub mod terminal;
pub mod ui;
