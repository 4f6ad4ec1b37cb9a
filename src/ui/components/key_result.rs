/// What a component did with a key, reported back to its view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, nothing for the view to do
  Handled,
  /// Key was consumed and produced an event for the view
  Event(T),
  /// Key was not consumed, view should try its next handler
  NotHandled,
}
