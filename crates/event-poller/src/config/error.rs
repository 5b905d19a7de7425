use alloc::string::String;

use flex_error::{define_error, TraceError};

define_error! {
    Error {
        Io
            [ TraceError<std::io::Error> ]
            |_| { "config I/O error" },

        Decode
            [ TraceError<toml::de::Error> ]
            |_| { "invalid configuration" },

        Encode
            [ TraceError<toml::ser::Error> ]
            |_| { "invalid configuration" },

        InvalidPollConfig
            { reason: String }
            |e| { format!("invalid poller configuration: {}", e.reason) },

        InvalidCompatMode
            { compat_mode: String, valid_modes: &'static str }
            |e| {
                format!("invalid compatibility mode: '{}' (supported: {})",
                    e.compat_mode, e.valid_modes)
            },
    }
}
