/// Macro to format an error message
#[macro_export]
macro_rules! format_error {
    ($($arg:tt)*) => {
        format!("[Error] {}", format!($($arg)*))
    }
}

/// Macro to format an information message
#[macro_export]
macro_rules! format_msg {
    ($($arg:tt)*) => {
        format!("-> {}", format!($($arg)*))
    }
}

/// Declares a `mod` and uses it
#[macro_export]
macro_rules! using {
    ($($v:vis $p:ident),* $(,)?) => {
        $(
            mod $p;
            $v use self::$p::*;
        )*
    }
}

using! {
    pub markdown,
    pub string,
}
