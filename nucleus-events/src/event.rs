//! Event type discriminators.

use serde::Serialize;
use std::borrow::Cow;

/// A value that can be published on an event stream.
///
/// The discriminator defaults to the unqualified type name
/// (`my_crate::events::OrderPlaced` becomes `OrderPlaced`). Enums carrying
/// several logical events override [`Event::event_type`] to report the
/// variant instead.
pub trait Event: Serialize + Send + Sync + 'static {
    fn event_type(&self) -> Cow<'static, str> {
        Cow::Borrowed(short_type_name::<Self>())
    }
}

/// The type name of `T` without its module path or generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
