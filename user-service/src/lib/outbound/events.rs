pub mod messages;
pub mod notifier;
pub mod producer;

pub use notifier::AuthEventNotifier;
pub use notifier::NotifierSettings;
pub use producer::KafkaEventProducer;
