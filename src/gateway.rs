pub mod ddb;
pub mod events;
pub mod factory;
pub mod logs;
pub mod sns;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GatewayPublisherVia {
    Sns,
    LocalDynamoDB,
    Logs,
}
