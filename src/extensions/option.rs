pub trait OptionExt<T> {
    fn when<F>(cond: bool, fa: F) -> Option<T>
    where
        F: FnOnce() -> T;

    fn to_result<E, F>(self, on_empty: F) -> Result<T, E>
    where
        F: FnOnce() -> E;

    /// Runs `on_empty` for its side effect when there is no value.
    fn inspect_none<F>(self, on_empty: F) -> Option<T>
    where
        F: FnOnce();
}

impl<T> OptionExt<T> for Option<T> {
    fn when<F>(cond: bool, fa: F) -> Option<T>
    where
        F: FnOnce() -> T,
    {
        if cond {
            Some(fa())
        } else {
            None
        }
    }

    fn to_result<E, F>(self, on_empty: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        match self {
            Some(v) => Ok(v),
            None => Err(on_empty()),
        }
    }

    fn inspect_none<F>(self, on_empty: F) -> Option<T>
    where
        F: FnOnce(),
    {
        if self.is_none() {
            on_empty();
        }
        self
    }
}
