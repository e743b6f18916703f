pub const MISSING_FIELD: &str = "missing_field";
pub const INVALID_INPUT: &str = "invalid_input";
pub const TEMPLATE_DIR_NOT_FOUND: &str = "template_dir_not_found";
pub const FILESYSTEM_ERROR: &str = "filesystem_error";
pub const ENGINE_ERROR: &str = "engine_error";
