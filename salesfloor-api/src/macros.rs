//! Handler-facing projections of [`AppState`](crate::state::AppState).

/// Let handlers take single `AppState` fields as `State<T>`.
///
/// Every `field => Type` pair expands to a `FromRef<AppState>` impl that
/// clones that field out of the shared state.
macro_rules! project_state {
    ($($field:ident => $ty:ty),+ $(,)?) => {
        $(
            impl axum::extract::FromRef<$crate::state::AppState> for $ty {
                fn from_ref(app: &$crate::state::AppState) -> Self {
                    app.$field.clone()
                }
            }
        )+
    };
}

pub(crate) use project_state;
