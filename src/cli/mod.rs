pub mod convert;
pub mod history;
pub mod live;
pub mod rate;
pub mod setup;
pub mod ui;
