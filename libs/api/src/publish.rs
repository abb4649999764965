use crate::{ClusterCollection, PublishError};

/// Публикация сообщений в канал.
///
/// Канал привязывается к реализации при создании, а не передаётся в каждом
/// вызове. Сообщение передаётся по значению: после `publish` им владеет sink.
///
/// Реализации: pipeline sinks (production), MemorySink (тесты).
pub trait ClusterPublisher: Send {
    fn publish(&mut self, collection: ClusterCollection) -> Result<(), PublishError>;
}

impl<P: ClusterPublisher + ?Sized> ClusterPublisher for &mut P {
    fn publish(&mut self, collection: ClusterCollection) -> Result<(), PublishError> {
        (**self).publish(collection)
    }
}

impl<P: ClusterPublisher + ?Sized> ClusterPublisher for Box<P> {
    fn publish(&mut self, collection: ClusterCollection) -> Result<(), PublishError> {
        (**self).publish(collection)
    }
}
