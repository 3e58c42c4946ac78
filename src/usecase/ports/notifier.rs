use tracing::error;

pub const LOAD_FAILED_MESSAGE: &str = "Unable to load data. Please try again later.";

pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        error!(target: "initiatives::notify", "{message}");
    }
}
