use chrono::{DateTime, Local, NaiveDate};
#[cfg(test)]
use mockall::automock;

/// Represents an entity responsible for providing dates across application. Nothing below the CLI
/// and HTTP layers asks for the current date; they ask a clock once and pass the date down, so
/// a long running server never works on a stale "today".
#[cfg_attr(test, automock)]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;
}

impl dyn Clock {
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
