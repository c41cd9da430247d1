use anyhow::Result;
use tracing::{debug, trace};

/// One named way of producing a field value.
pub struct Strategy<'s, T> {
    pub name: &'static str,
    pub run: Box<dyn Fn() -> Result<Option<T>> + 's>,
}

impl<'s, T> Strategy<'s, T> {
    pub fn new(name: &'static str, run: impl Fn() -> Result<Option<T>> + 's) -> Self {
        Self {
            name,
            run: Box::new(run),
        }
    }
}

/// Runs strategies in order and returns the first present value. A failing
/// strategy does not stop the ones after it; its error is only returned when
/// no strategy produced anything.
pub fn first_present<T>(field: &'static str, strategies: Vec<Strategy<'_, T>>) -> Result<Option<T>> {
    let mut first_error = None;
    for strategy in strategies {
        match (strategy.run)() {
            Ok(Some(value)) => {
                trace!(field, strategy = strategy.name, "strategy matched");
                return Ok(Some(value));
            }
            Ok(None) => {}
            Err(err) => {
                debug!(field, strategy = strategy.name, error = %err, "strategy failed");
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(None),
    }
}
