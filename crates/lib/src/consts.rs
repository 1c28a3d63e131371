/// Name of the chunk (and value of `_NAME`) every snippet runs under.
pub const MAIN_CHUNK_NAME: &str = "__main__";

/// Environment variable holding the interpreter memory limit, in bytes.
pub const MEMORY_LIMIT_ENV: &str = "LUASHIM_MEMORY_LIMIT";

/// Environment variable toggling the undefined-name error in snippet namespaces.
pub const STRICT_NAMES_ENV: &str = "LUASHIM_STRICT_NAMES";
