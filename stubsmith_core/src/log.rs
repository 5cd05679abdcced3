/// Internal macro for common logging logic
#[macro_export]
#[doc(hidden)]
macro_rules! __internal_log_impl {
    // Standard variant - uses STUBSMITH_LOG_DIR env var, falling back to ./stubsmith/logs
    ($content:expr, $filename:expr, $append:expr, standard) => {{
        let logs_dir = std::env::var("STUBSMITH_LOG_DIR")
            .unwrap_or_else(|_| String::from("stubsmith/logs"));

        $crate::__internal_log_impl!($content, logs_dir, $filename, $append, impl);
    }};

    // Core implementation
    ($content:expr, $logs_dir:expr, $filename:expr, $append:expr, impl) => {{
        use std::io::Write;

        let _ = std::fs::create_dir_all(&$logs_dir);

        let path_str = &format!("{}/{}", $logs_dir, $filename);
        let path = std::path::Path::new(path_str);

        let mut options = std::fs::OpenOptions::new();
        options.create(true);
        if $append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        if let Ok(mut file_handle) = options.open(path) {
            let expr_str = stringify!($content);
            let formatted = if expr_str.starts_with("format!")
                || expr_str.starts_with("&format!")
                || expr_str.starts_with("\"")
                || expr_str.starts_with("String::")
            {
                format!("{}\n", $content)
            } else {
                let value_str = format!("{:#?}", &$content);

                if value_str.contains('\n') || value_str.len() > 80 {
                    format!(
                        "[{}:{}] {} = \n{}\n",
                        file!(),
                        line!(),
                        stringify!($content),
                        value_str
                    )
                } else {
                    format!(
                        "[{}:{}] {} = {}\n",
                        file!(),
                        line!(),
                        stringify!($content),
                        value_str
                    )
                }
            };
            let _ = file_handle.write_all(formatted.as_bytes());
        }
    }};
}

/// Debug logging macro for the stubsmith crates.
///
/// Only writes anything when the `dev-mode` feature is enabled; otherwise the
/// content expression is type-checked and discarded.
///
/// # Examples
///
/// Log to a timestamp-based file (e.g., "2024_01_12_14_30_52.log"):
/// ```no_run
/// # use stubsmith_core::stubsmith_log;
/// stubsmith_log!("Walk started");
/// ```
///
/// Log to a specific file (overwrites existing content):
/// ```no_run
/// # use stubsmith_core::stubsmith_log;
/// stubsmith_log!("Root module walked", "walk.log");
/// ```
///
/// Log to a specific file with append mode:
/// ```no_run
/// # use stubsmith_core::stubsmith_log;
/// stubsmith_log!("Skipped overload", "skipped.log", true);
/// ```
#[macro_export]
macro_rules! stubsmith_log {
    ($content:expr) => {{
        $crate::stubsmith_log!(
            $content,
            format!("{}.log", $crate::__chrono::Local::now().format("%Y_%m_%d_%H_%M_%S")),
            false
        );
    }};
    ($content:expr, $filename:expr) => {{
        $crate::stubsmith_log!($content, $filename, false);
    }};
    ($content:expr, $filename:expr, $append:expr) => {{
        if cfg!(feature = "dev-mode") {
            $crate::__internal_log_impl!($content, $filename, $append, standard);
        } else {
            let _ = (&$content, &$filename, $append);
        }
    }};
}
