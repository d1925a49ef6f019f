pub mod discord;
pub mod email;
pub mod health;

use async_trait::async_trait;

use crate::models::{
    payload::NotificationPayload,
    status::{ChannelError, DeliveryReceipt},
};

/// An outbound destination for publish notifications. Implementations make a
/// single best-effort attempt and report failure as a value.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, payload: &NotificationPayload) -> Result<DeliveryReceipt, ChannelError>;
}
