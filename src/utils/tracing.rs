macro_rules! instrument {
    ($name:expr) => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                ::paste::paste! {
                    let [<_ $name _entered>] = ::tracing::trace_span!($name).entered();
                }
            }
        }
    };
}
pub(crate) use instrument;

macro_rules! trace {
    ($($arg:tt)+) => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                ::tracing::trace!($($arg)+);
            }
        }
    };
}
pub(crate) use trace;
