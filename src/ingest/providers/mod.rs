pub mod indeed_alert;
pub mod remoteok;
pub mod wwr_rss;
