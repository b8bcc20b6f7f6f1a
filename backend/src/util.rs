use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::client::SendMsg;

#[derive(Error, Debug)]
#[error("Retry failed")]
pub struct RetryFailed;

pub fn retry<T, E, F>(mut times: u32, f: F) -> Result<T, RetryFailed>
where
    F: Fn() -> Result<T, E>,
    E: std::error::Error + std::fmt::Display,
{
    loop {
        match f() {
            Ok(value) => return Ok(value),
            Err(err) if times == 0 => {
                warn!("No more retry attempts. Error: {}", err);
                return Err(RetryFailed);
            }
            Err(err) => {
                warn!("Retry triggered. Error: {}", err);
                times -= 1;
            }
        }
    }
}

// Serialize and send a message to a client, retrying once
pub fn send_message<M: Serialize>(client: &impl SendMsg, message: &M) {
    let msg = match serde_json::to_string(message) {
        Ok(msg) => msg,
        Err(err) => {
            error!("Failed to serialize outgoing message: {}", err);
            return;
        }
    };
    // If the message fails to send even after retries, there's not much we can do but proceed
    let _ = retry(1, || client.send(&msg));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SendError;
    use std::cell::Cell;

    struct FlakySender {
        failures_left: Cell<u32>,
        sent: Cell<u32>,
    }

    impl SendMsg for FlakySender {
        fn send(&self, _msg: &str) -> Result<(), SendError> {
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(SendError);
            }
            self.sent.set(self.sent.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_retry_recovers() {
        let sender = FlakySender {
            failures_left: Cell::new(1),
            sent: Cell::new(0),
        };
        assert!(retry(1, || sender.send("hi")).is_ok());
        assert_eq!(sender.sent.get(), 1);
    }

    #[test]
    fn test_retry_gives_up() {
        let sender = FlakySender {
            failures_left: Cell::new(3),
            sent: Cell::new(0),
        };
        assert!(retry(1, || sender.send("hi")).is_err());
        assert_eq!(sender.sent.get(), 0);
        assert_eq!(sender.failures_left.get(), 1);
    }
}
