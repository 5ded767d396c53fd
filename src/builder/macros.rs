//! Macros for declaring state types.

/// Implement [`State`](crate::core::State) with its default methods for
/// one or more types.
///
/// # Example
///
/// ```
/// use frostbox::state_impl;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Session {
///     user: Option<String>,
/// }
///
/// #[derive(Clone, PartialEq, Debug)]
/// enum Theme {
///     Light,
///     Dark,
/// }
///
/// state_impl!(Session, Theme);
/// ```
#[macro_export]
macro_rules! state_impl {
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::core::State for $ty {})+
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;

    #[derive(Clone, PartialEq, Debug)]
    struct Profile {
        name: String,
    }

    #[derive(Clone, PartialEq, Debug)]
    enum Mode {
        Edit,
        View,
    }

    state_impl!(Profile, Mode,);

    #[test]
    fn state_impl_macro_generates_trait() {
        let profile = Profile {
            name: "ada".to_string(),
        };
        assert_eq!(profile.deep_copy(), profile);
        assert_eq!(Mode::Edit.deep_copy(), Mode::Edit);
        assert_ne!(Mode::View.deep_copy(), Mode::Edit);
    }
}
