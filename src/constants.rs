//! Global constants for the Weft engine

pub mod timing {
    /// How long a pending multi-key sequence waits for its continuation
    pub const KEY_TIMEOUT_MILLIS: u32 = 500;
}

pub mod limits {
    /// Default number of undo groups retained
    pub const DEFAULT_UNDO_LIMIT: usize = 40;

    /// Default visual width of a tab stop
    pub const DEFAULT_TAB_SIZE: usize = 4;

    /// Upper bound accepted for `tab_size`
    pub const MAX_TAB_SIZE: usize = 16;

    /// Upper bound accepted for `key_timeout_ms`
    pub const MAX_KEY_TIMEOUT_MILLIS: usize = 10_000;

    /// Upper bound accepted for `undo_limit`
    pub const MAX_UNDO_LIMIT: usize = 10_000;

    /// Number of memoized text measurements kept before the cache is reset
    pub const WIDTH_CACHE_CAPACITY: usize = 4096;

    /// Lines a page motion moves before the host reports a viewport
    pub const DEFAULT_PAGE_ROWS: usize = 20;

    /// Line comment marker used by `toggle_comment`
    pub const DEFAULT_COMMENT_TOKEN: &str = "//";
}

pub mod errors {
    // Error Codes
    pub const GENERIC_ERROR: &str = "GENERIC_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const LINE_OUT_OF_RANGE: &str = "LINE_OUT_OF_RANGE";
    pub const MALFORMED_MESSAGE: &str = "MALFORMED_MESSAGE";
    pub const UNKNOWN_METHOD: &str = "UNKNOWN_METHOD";
    pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
    pub const UNKNOWN_SETTING: &str = "UNKNOWN_SETTING";
    pub const SETTING_PARSE_ERROR: &str = "SETTING_PARSE_ERROR";
    pub const SETTING_VALIDATION_ERROR: &str = "SETTING_VALIDATION_ERROR";
    pub const CONFIG_LOAD_FAILED: &str = "CONFIG_LOAD_FAILED";
    pub const INVALID_ACTION: &str = "INVALID_ACTION";
    pub const INVALID_KEY: &str = "INVALID_KEY";
    pub const MALFORMED_RESPONSE: &str = "MALFORMED_RESPONSE";
}

/// Method names of notifications the engine sends to the host
pub mod notifications {
    pub const MODE_CHANGE: &str = "mode_change";
    pub const PARSE_STATE: &str = "parse_state";
    pub const CONTENT_SIZE: &str = "content_size";
    pub const SCROLL_TO: &str = "scroll_to";
    pub const SET_PASTEBOARD: &str = "set_pasteboard";
    pub const ERROR: &str = "error";
}

/// Names of actions the default keymap hands to the host
pub mod actions {
    pub const UNDO: &str = "undo";
    pub const REDO: &str = "redo";
    pub const SAVE: &str = "save";
    pub const PASTE: &str = "paste";
    pub const WRITE_QUIT: &str = "write_quit";
    pub const QUIT: &str = "quit";
}
