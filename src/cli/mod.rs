pub mod cross;
pub mod rates;
pub mod refresh;
pub mod setup;
pub mod shell;
pub mod ui;
